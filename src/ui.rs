use ratatui::{
    layout::{Constraint, Layout, Position, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use companion_core::memory::format_memory;
use companion_core::Sender;

use crate::app::{App, InputMode, Screen, TextInput};

/// Turn `**bold**` runs into bold spans; anything unmatched stays literal
fn parse_markdown_line(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        match after_open.find("**") {
            Some(close) if close > 0 => {
                if open > 0 {
                    spans.push(Span::raw(rest[..open].to_string()));
                }
                spans.push(Span::styled(
                    after_open[..close].to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ));
                rest = &after_open[close + 2..];
            }
            _ => break,
        }
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}

fn dots(frame: u8) -> String {
    ".".repeat(frame as usize + 1)
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area);

    match app.screen {
        Screen::Memory => render_memory_screen(app, frame, body_area),
        Screen::Compare => render_compare_screen(app, frame, body_area),
        Screen::Chat => render_chat_screen(app, frame, body_area),
    }

    render_footer(app, frame, footer_area);

    // Popups, highest priority last
    if app.is_loading() {
        render_loading(app, frame, area);
    }
    if let Some(message) = &app.error_popup {
        render_error(message, frame, area);
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let mut spans = vec![Span::styled(" AI Companion ", Style::default().fg(Color::Cyan).bold())];

    for screen in Screen::all() {
        let style = if screen == app.screen {
            Style::default().fg(Color::Black).bg(Color::Cyan).bold()
        } else {
            Style::default().fg(Color::Gray)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", screen.title()), style));
    }

    let memory_indicator = match (app.session.context(), app.attach_memory) {
        (Some(_), true) => " [memory on]",
        (None, true) => " [memory on, none extracted]",
        _ => "",
    };
    spans.push(Span::styled(memory_indicator, Style::default().fg(Color::Magenta)));
    spans.push(Span::styled(
        format!("  {}", app.client.base_url()),
        Style::default().fg(Color::DarkGray),
    ));

    let header = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let mode_style = match app.input_mode {
        InputMode::Normal => Style::default().bg(Color::Blue).fg(Color::White),
        InputMode::Editing => Style::default().bg(Color::Yellow).fg(Color::Black),
    };
    let mode_text = match app.input_mode {
        InputMode::Normal => " NORMAL ",
        InputMode::Editing => " EDIT ",
    };

    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::White);

    let hints: Vec<(&str, &str)> = match (app.screen, app.input_mode) {
        (Screen::Memory, InputMode::Normal) => vec![
            ("s", "sample"),
            ("e", "extract"),
            ("i", "edit"),
            ("j/k", "scroll"),
            ("Tab", "screen"),
            ("q", "quit"),
        ],
        (Screen::Memory, InputMode::Editing) => vec![
            ("Enter", "newline"),
            ("^E", "extract"),
            ("Esc", "done"),
        ],
        (Screen::Compare, InputMode::Normal) => vec![
            ("i", "edit"),
            ("j/k", "scroll"),
            ("m", "memory"),
            ("Tab", "screen"),
            ("q", "quit"),
        ],
        (Screen::Compare, InputMode::Editing) => vec![("Enter", "compare"), ("Esc", "done")],
        (Screen::Chat, InputMode::Normal) => vec![
            ("i", "type"),
            ("p/P", "personality"),
            ("m", "memory"),
            ("j/k", "scroll"),
            ("Tab", "screen"),
            ("q", "quit"),
        ],
        (Screen::Chat, InputMode::Editing) => vec![
            ("Enter", "send"),
            ("^P", "personality"),
            ("Esc", "done"),
        ],
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::raw(" ")];
    for (key, label) in hints {
        spans.push(Span::styled(format!(" {} ", key), key_style));
        spans.push(Span::styled(format!(" {} ", label), label_style));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Bordered input box; shows the terminal cursor while editing
fn render_input(
    frame: &mut Frame,
    area: Rect,
    input: &TextInput,
    title: String,
    editing: bool,
    placeholder: &str,
) {
    let border_color = if editing { Color::Yellow } else { Color::DarkGray };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let text = if input.text.is_empty() && !editing {
        Text::from(Span::styled(placeholder.to_string(), Style::default().fg(Color::DarkGray)))
    } else {
        Text::from(input.text.as_str())
    };

    let inner_height = area.height.saturating_sub(2);
    let before = input.before_cursor();
    let cursor_row = before.matches('\n').count() as u16;
    let scroll = cursor_row.saturating_sub(inner_height.saturating_sub(1));

    frame.render_widget(Paragraph::new(text).block(block).scroll((scroll, 0)), area);

    if editing {
        let col = before.rsplit('\n').next().unwrap_or("").chars().count() as u16;
        let x = (area.x + 1 + col).min(area.right().saturating_sub(2));
        let y = area.y + 1 + cursor_row - scroll;
        frame.set_cursor_position(Position::new(x, y));
    }
}

fn render_memory_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, result_area] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(area);

    render_input(
        frame,
        input_area,
        &app.memory_input,
        " Conversation JSON ".to_string(),
        app.input_mode == InputMode::Editing,
        "Press 's' to load the sample conversation, or 'i' to paste a JSON list of messages",
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Extracted Memory ");

    let text = match &app.memory {
        None => Text::from(Span::styled(
            "Press 'e' to extract memory from the conversation",
            Style::default().fg(Color::DarkGray),
        )),
        Some(memory) => {
            let mut lines: Vec<Line> = Vec::new();
            for (label, items) in format_memory(memory) {
                lines.push(Line::from(Span::styled(
                    format!("{}:", label),
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                )));
                if items.is_empty() {
                    lines.push(Line::from(Span::styled("  (none)", Style::default().fg(Color::DarkGray))));
                }
                for item in items {
                    lines.push(Line::from(format!("  • {}", item)));
                }
                lines.push(Line::default());
            }
            Text::from(lines)
        }
    };

    let result = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.memory_scroll, 0));
    frame.render_widget(result, result_area);
}

fn render_compare_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [input_area, result_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);

    render_input(
        frame,
        input_area,
        &app.compare_input,
        " Message ".to_string(),
        app.input_mode == InputMode::Editing,
        "Type a message to hear every personality answer it",
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Personality Responses ");

    let text = match &app.comparison {
        None => Text::from(Span::styled("No comparison yet", Style::default().fg(Color::DarkGray))),
        Some(responses) => {
            let mut lines: Vec<Line> = Vec::new();
            for (name, response) in responses {
                lines.push(Line::from(Span::styled(
                    name.clone(),
                    Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
                )));
                for line in response.lines() {
                    lines.push(parse_markdown_line(line));
                }
                lines.push(Line::default());
            }
            Text::from(lines)
        }
    };

    let result = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: true })
        .scroll((app.compare_scroll, 0));
    frame.render_widget(result, result_area);
}

fn render_chat_screen(app: &mut App, frame: &mut Frame, area: Rect) {
    let [chat_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    // Store chat area dimensions for scroll calculations (inner size minus borders)
    app.chat_height = chat_area.height.saturating_sub(2);
    app.chat_width = chat_area.width.saturating_sub(2);

    let personality_title = app
        .selected_personality_info()
        .map(|info| info.name.clone())
        .unwrap_or_else(|| app.selected_personality().to_string());
    let chat_block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" Chat with {} ", personality_title));

    let transcript = app.session.transcript();
    let chat_text = if transcript.is_empty() && !app.chat_pane.typing {
        let hint = app
            .selected_personality_info()
            .map(|info| info.description.clone())
            .unwrap_or_default();
        Text::from(vec![
            Line::from(Span::styled(
                "Start a conversation...",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray).italic())),
        ])
    } else {
        let mut lines: Vec<Line> = Vec::new();

        for turn in transcript.turns() {
            match turn.sender {
                Sender::User => {
                    lines.push(Line::from(Span::styled(
                        "You:",
                        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                    )));
                    lines.push(Line::from(turn.content.as_str()));
                }
                Sender::Ai => {
                    let name = turn
                        .personality
                        .as_deref()
                        .map(|id| app.catalog.display_name(id))
                        .unwrap_or("AI");
                    lines.push(Line::from(Span::styled(
                        format!("{}:", name),
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                    for line in turn.content.lines() {
                        lines.push(parse_markdown_line(line));
                    }
                }
            }
            lines.push(Line::default());
        }

        if app.chat_pane.typing {
            lines.push(Line::from(Span::styled(
                format!("{}:", personality_title),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(Span::styled(
                format!("Thinking{}", dots(app.animation_frame)),
                Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            )));
        }

        Text::from(lines)
    };

    let chat = Paragraph::new(chat_text)
        .block(chat_block)
        .wrap(Wrap { trim: true })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(chat, chat_area);

    render_input(
        frame,
        input_area,
        &app.chat_input,
        format!(" Message ({}) ", app.selected_personality()),
        app.input_mode == InputMode::Editing,
        "Press 'i' to type",
    );
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

fn render_loading(app: &App, frame: &mut Frame, area: Rect) {
    let popup_area = centered(area, 24, 3);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let text = Paragraph::new(format!(" Working{}", dots(app.animation_frame))).block(block);
    frame.render_widget(text, popup_area);
}

fn render_error(message: &str, frame: &mut Frame, area: Rect) {
    let popup_area = centered(area, 60, 7);
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Error (press any key) ");
    let text = Paragraph::new(message.to_string())
        .block(block)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::White));
    frame.render_widget(text, popup_area);
}
