use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode, Screen};
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize => app.scroll_chat_to_bottom(),
        AppEvent::Tick => {
            app.tick_animation();
            app.poll_tasks().await;
        }
    }
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    // The error popup blocks until dismissed
    if app.error_popup.is_some() {
        app.error_popup = None;
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Screen switching
        KeyCode::Tab => app.screen = app.screen.next(),
        KeyCode::Char('1') => app.screen = Screen::Memory,
        KeyCode::Char('2') => app.screen = Screen::Compare,
        KeyCode::Char('3') => app.screen = Screen::Chat,

        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,

        KeyCode::Char('j') | KeyCode::Down => app.scroll_down(),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_up(),

        // Memory context applies to both chat and comparison
        KeyCode::Char('m') => app.toggle_memory_context(),

        _ => match app.screen {
            Screen::Memory => handle_memory_normal(app, key),
            Screen::Compare => {}
            Screen::Chat => handle_chat_normal(app, key),
        },
    }
}

fn handle_memory_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('s') => app.load_sample(),
        KeyCode::Char('e') => app.extract_memory(),
        _ => {}
    }
}

fn handle_chat_normal(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('p') => app.cycle_personality(true),
        KeyCode::Char('P') => app.cycle_personality(false),
        KeyCode::Char('G') => app.scroll_chat_to_bottom(),
        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.input_mode = InputMode::Normal,
        KeyCode::Tab => {
            app.screen = app.screen.next();
        }
        KeyCode::Enter => match app.screen {
            // The memory box holds multi-line JSON
            Screen::Memory => app.memory_input.insert('\n'),
            Screen::Compare => app.compare(),
            Screen::Chat => app.send_chat(),
        },
        KeyCode::Char('e')
            if app.screen == Screen::Memory && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.extract_memory();
        }
        KeyCode::Char('p')
            if app.screen == Screen::Chat && key.modifiers.contains(KeyModifiers::CONTROL) =>
        {
            app.cycle_personality(true);
        }
        KeyCode::Backspace => app.active_input().backspace(),
        KeyCode::Delete => app.active_input().delete(),
        KeyCode::Left => app.active_input().left(),
        KeyCode::Right => app.active_input().right(),
        KeyCode::Home => app.active_input().home(),
        KeyCode::End => app.active_input().end(),
        KeyCode::Char(c) => app.active_input().insert(c),
        _ => {}
    }
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(),
        MouseEventKind::ScrollUp => app.scroll_up(),
        _ => {}
    }
}
