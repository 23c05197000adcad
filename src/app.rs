use std::collections::BTreeMap;

use companion_core::models::{PersonalityInfo, TransformResponse};
use companion_core::{
    memory, Catalog, ChatSession, ChatTurn, ChatView, CompanionClient, CompanionError,
    CompanionService, Config, TurnStart, UserMemory,
};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Memory,
    Compare,
    Chat,
}

impl Screen {
    pub fn all() -> [Screen; 3] {
        [Screen::Memory, Screen::Compare, Screen::Chat]
    }

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Memory => "Memory",
            Screen::Compare => "Compare",
            Screen::Chat => "Chat",
        }
    }

    pub fn next(&self) -> Screen {
        match self {
            Screen::Memory => Screen::Compare,
            Screen::Compare => Screen::Chat,
            Screen::Chat => Screen::Memory,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Editable text with a cursor counted in characters
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    pub text: String,
    pub cursor: usize,
}

impl TextInput {
    pub fn set(&mut self, text: String) {
        self.cursor = text.chars().count();
        self.text = text;
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Empty the buffer and return what it held
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }

    /// Text before the cursor, used to place the terminal cursor
    pub fn before_cursor(&self) -> &str {
        &self.text[..char_to_byte_index(&self.text, self.cursor)]
    }
}

/// Chat transcript view state; the session draws through it
#[derive(Debug, Default)]
pub struct ChatPane {
    pub typing: bool,
    pub follow: bool,
    pub notice: Option<String>,
}

impl ChatView for ChatPane {
    fn render_turn(&mut self, _turn: &ChatTurn) {
        self.follow = true;
    }

    fn show_typing(&mut self) {
        self.typing = true;
        self.follow = true;
    }

    fn hide_typing(&mut self) {
        self.typing = false;
    }

    fn notify_error(&mut self, error: &CompanionError) {
        self.notice = Some(format!("Error: {}", error));
    }
}

/// Work running on a background task behind the loading overlay
pub enum Background {
    Sample(companion_core::Result<String>),
    Memory(companion_core::Result<UserMemory>),
    Compare(companion_core::Result<BTreeMap<String, String>>),
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub screen: Screen,
    pub input_mode: InputMode,
    pub error_popup: Option<String>,

    // Memory screen
    pub memory_input: TextInput,
    pub memory: Option<UserMemory>,
    pub memory_scroll: u16,

    // Compare screen
    pub compare_input: TextInput,
    pub comparison: Option<BTreeMap<String, String>>,
    pub compare_scroll: u16,

    // Chat screen
    pub chat_input: TextInput,
    pub session: ChatSession,
    pub chat_pane: ChatPane,
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations
    pub chat_task: Option<JoinHandle<companion_core::Result<TransformResponse>>>,
    pub attach_memory: bool,

    // Personality picker
    pub catalog: Catalog,
    pub personality_idx: usize,
    pub catalog_task: Option<JoinHandle<companion_core::Result<BTreeMap<String, PersonalityInfo>>>>,

    // Loading overlay
    pub task: Option<JoinHandle<Background>>,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    pub client: CompanionClient,
}

impl App {
    pub fn new(client: CompanionClient, config: &Config, personality: Option<&str>) -> Self {
        let catalog = Catalog::builtin();
        let wanted = personality.or(config.default_personality.as_deref());
        let personality_idx = match wanted.map(|id| (id, catalog.position(id))) {
            Some((_, Some(idx))) => idx,
            Some((id, None)) => {
                let known: Vec<&str> = catalog.ids().collect();
                warn!(personality = id, ?known, "unknown personality, using the first one");
                0
            }
            None => 0,
        };

        Self {
            should_quit: false,
            screen: Screen::Chat,
            input_mode: InputMode::Editing,
            error_popup: None,

            memory_input: TextInput::default(),
            memory: None,
            memory_scroll: 0,

            compare_input: TextInput::default(),
            comparison: None,
            compare_scroll: 0,

            chat_input: TextInput::default(),
            session: ChatSession::new(),
            chat_pane: ChatPane::default(),
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            chat_task: None,
            attach_memory: config.attach_memory,

            catalog,
            personality_idx,
            catalog_task: None,

            task: None,

            animation_frame: 0,

            client,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.task.is_some()
    }

    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error_popup = Some(message.into());
    }

    pub fn selected_personality(&self) -> &str {
        self.catalog
            .get(self.personality_idx)
            .map(|(id, _)| id)
            .unwrap_or("calm_mentor")
    }

    pub fn selected_personality_info(&self) -> Option<&PersonalityInfo> {
        self.catalog.get(self.personality_idx).map(|(_, info)| info)
    }

    pub fn cycle_personality(&mut self, forward: bool) {
        let len = self.catalog.len();
        if len == 0 {
            return;
        }
        self.personality_idx = if forward {
            (self.personality_idx + 1) % len
        } else {
            (self.personality_idx + len - 1) % len
        };
        // Save to config
        if let Err(e) = Config::save_default_personality(self.selected_personality()) {
            warn!(error = %e, "could not save default personality");
        }
    }

    pub fn toggle_memory_context(&mut self) {
        self.attach_memory = !self.attach_memory;
        self.sync_context();
    }

    fn sync_context(&mut self) {
        let context = if self.attach_memory { self.memory.clone() } else { None };
        self.session.set_context(context);
    }

    pub fn refresh_catalog(&mut self) {
        let client = self.client.clone();
        self.catalog_task = Some(tokio::spawn(async move { client.personalities().await }));
    }

    pub fn load_sample(&mut self) {
        if self.is_loading() {
            return;
        }
        let client = self.client.clone();
        self.task = Some(tokio::spawn(async move {
            Background::Sample(memory::load_sample(&client).await)
        }));
    }

    /// Parse the memory input here so bad JSON never shows the overlay
    pub fn extract_memory(&mut self) {
        if self.is_loading() {
            return;
        }
        let messages = match memory::parse_messages(&self.memory_input.text) {
            Ok(messages) => messages,
            Err(e) => {
                self.show_error(format!("Error: {}", e));
                return;
            }
        };
        let client = self.client.clone();
        self.task = Some(tokio::spawn(async move {
            Background::Memory(client.extract_memory(&messages).await)
        }));
    }

    pub fn compare(&mut self) {
        if self.is_loading() {
            return;
        }
        let message = self.compare_input.text.trim().to_string();
        if message.is_empty() {
            self.show_error(format!("Error: {}", CompanionError::Validation { field: "message" }));
            return;
        }
        let client = self.client.clone();
        let context = if self.attach_memory { self.memory.clone() } else { None };
        self.task = Some(tokio::spawn(async move {
            let result =
                companion_core::compare_personalities(&client, &message, context.as_ref()).await;
            Background::Compare(result)
        }));
    }

    /// Start a chat turn from the input box; the reply arrives via `poll_tasks`
    pub fn send_chat(&mut self) {
        let personality = self.selected_personality().to_string();
        let message = self.chat_input.text.clone();

        match self.session.begin_turn(&message, &personality, &mut self.chat_pane) {
            TurnStart::Ignored => {}
            TurnStart::Busy => debug!("chat input kept, reply still pending"),
            TurnStart::Started(request) => {
                self.chat_input.take();
                let client = self.client.clone();
                self.chat_task = Some(tokio::spawn(async move { client.transform(&request).await }));
            }
        }
        self.follow_chat();
    }

    /// Collect finished background work (called on every tick)
    pub async fn poll_tasks(&mut self) {
        if self.chat_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(handle) = self.chat_task.take() {
                let result = handle
                    .await
                    .unwrap_or_else(|_| Err(CompanionError::Interrupted { operation: "Chat" }));
                // Errors reach the user through the pane's notice
                let _ = self.session.complete_turn(result, &mut self.chat_pane);
                if let Some(notice) = self.chat_pane.notice.take() {
                    self.show_error(notice);
                }
                self.follow_chat();
            }
        }

        if self.task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(handle) = self.task.take() {
                match handle.await {
                    Ok(done) => self.apply_background(done),
                    Err(e) => self.show_error(format!("Error: background task failed: {}", e)),
                }
            }
        }

        if self.catalog_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(handle) = self.catalog_task.take() {
                match handle.await {
                    Ok(Ok(map)) => self.replace_catalog(Catalog::from_service(map)),
                    Ok(Err(e)) => warn!(error = %e, "using built-in personalities"),
                    Err(e) => warn!(error = %e, "personality task failed"),
                }
            }
        }
    }

    fn apply_background(&mut self, done: Background) {
        match done {
            Background::Sample(Ok(sample)) => self.memory_input.set(sample),
            Background::Sample(Err(e)) => {
                warn!(error = %e, "sample messages unavailable");
                self.show_error("Error: Failed to load sample messages");
            }
            Background::Memory(Ok(memory)) => {
                self.memory = Some(memory);
                self.memory_scroll = 0;
                self.sync_context();
            }
            Background::Compare(Ok(responses)) => {
                self.comparison = Some(responses);
                self.compare_scroll = 0;
            }
            Background::Memory(Err(e)) | Background::Compare(Err(e)) => {
                self.show_error(format!("Error: {}", e));
            }
        }
    }

    /// Keep the same personality selected when the catalogue changes
    fn replace_catalog(&mut self, catalog: Catalog) {
        let current = self.selected_personality().to_string();
        self.personality_idx = catalog.position(&current).unwrap_or(0);
        self.catalog = catalog;
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.chat_pane.typing || self.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn follow_chat(&mut self) {
        if std::mem::take(&mut self.chat_pane.follow) {
            self.scroll_chat_to_bottom();
        }
    }

    /// Scroll chat to bottom so the newest turn or "Thinking..." is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: usize = 0;

        for turn in self.session.transcript().turns() {
            total_lines += 1; // Sender line
            for line in turn.content.lines() {
                let char_count = line.chars().count();
                if char_count == 0 {
                    total_lines += 1;
                } else {
                    total_lines += (char_count / wrap_width) + 1;
                }
            }
            total_lines += 1; // Blank line after message
        }

        if self.chat_pane.typing {
            total_lines += 2;
        }

        let visible_height = if self.chat_height > 0 {
            self.chat_height as usize
        } else {
            20
        };

        // Paragraph scroll offsets are u16
        let bottom = total_lines.saturating_sub(visible_height);
        self.chat_scroll = u16::try_from(bottom).unwrap_or(u16::MAX);
    }

    pub fn scroll_down(&mut self) {
        let scroll = match self.screen {
            Screen::Memory => &mut self.memory_scroll,
            Screen::Compare => &mut self.compare_scroll,
            Screen::Chat => &mut self.chat_scroll,
        };
        *scroll = scroll.saturating_add(1);
    }

    pub fn scroll_up(&mut self) {
        let scroll = match self.screen {
            Screen::Memory => &mut self.memory_scroll,
            Screen::Compare => &mut self.compare_scroll,
            Screen::Chat => &mut self.chat_scroll,
        };
        *scroll = scroll.saturating_sub(1);
    }

    pub fn active_input(&mut self) -> &mut TextInput {
        match self.screen {
            Screen::Memory => &mut self.memory_input,
            Screen::Compare => &mut self.compare_input,
            Screen::Chat => &mut self.chat_input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_input_edits_multibyte_text() {
        let mut input = TextInput::default();
        for c in "héllo".chars() {
            input.insert(c);
        }
        input.left();
        input.left();
        input.backspace();
        assert_eq!(input.text, "hélo");
        assert_eq!(input.before_cursor(), "hé");

        input.home();
        input.delete();
        assert_eq!(input.text, "élo");

        input.end();
        input.insert('!');
        assert_eq!(input.take(), "élo!");
        assert_eq!(input.cursor, 0);
        assert!(input.text.is_empty());
    }

    #[test]
    fn screens_cycle_in_tab_order() {
        assert_eq!(Screen::Memory.next(), Screen::Compare);
        assert_eq!(Screen::Compare.next(), Screen::Chat);
        assert_eq!(Screen::Chat.next(), Screen::Memory);
    }

    #[test]
    fn chat_pane_turns_errors_into_alert_text() {
        let mut pane = ChatPane::default();
        pane.show_typing();
        assert!(pane.typing && pane.follow);
        pane.hide_typing();
        pane.notify_error(&CompanionError::Validation { field: "message" });
        assert_eq!(pane.notice.as_deref(), Some("Error: Please enter a message"));
    }

    #[tokio::test]
    async fn new_app_starts_on_configured_personality() {
        let config = Config {
            default_personality: Some("therapist".to_string()),
            ..Config::default()
        };
        let app = App::new(CompanionClient::new("http://127.0.0.1:9"), &config, None);
        assert_eq!(app.selected_personality(), "therapist");

        let app = App::new(
            CompanionClient::new("http://127.0.0.1:9"),
            &config,
            Some("witty_friend"),
        );
        assert_eq!(app.selected_personality(), "witty_friend");

        let app = App::new(CompanionClient::new("http://127.0.0.1:9"), &config, Some("pirate"));
        assert_eq!(app.selected_personality(), "calm_mentor");
    }

    #[tokio::test]
    async fn blank_chat_input_spawns_nothing() {
        let mut app = App::new(CompanionClient::new("http://127.0.0.1:9"), &Config::default(), None);
        app.chat_input.set("   ".to_string());
        app.send_chat();
        assert!(app.chat_task.is_none());
        assert!(app.session.transcript().is_empty());
    }

    #[tokio::test]
    async fn bad_memory_json_pops_an_error_without_loading() {
        let mut app = App::new(CompanionClient::new("http://127.0.0.1:9"), &Config::default(), None);
        app.memory_input.set("[{".to_string());
        app.extract_memory();
        assert!(!app.is_loading());
        assert!(app.error_popup.as_deref().unwrap().starts_with("Error: Invalid JSON input"));
    }

    fn offline_app() -> App {
        App::new(CompanionClient::new("http://127.0.0.1:9"), &Config::default(), None)
    }

    fn reply(text: String) -> TransformResponse {
        TransformResponse {
            original_response: String::new(),
            transformed_response: text,
            personality_used: "calm_mentor".to_string(),
        }
    }

    async fn settle_chat(app: &mut App) {
        while !app.chat_task.as_ref().is_some_and(|t| t.is_finished()) {
            tokio::task::yield_now().await;
        }
        app.poll_tasks().await;
    }

    #[tokio::test]
    async fn long_transcripts_pin_scroll_to_the_last_offset() {
        let mut app = offline_app();
        app.chat_width = 10;
        app.chat_height = 20;
        let long_reply = "x".repeat(10_000);

        for i in 0..70 {
            let started = app.session.begin_turn(&format!("msg {}", i), "calm_mentor", &mut app.chat_pane);
            assert!(matches!(started, TurnStart::Started(_)));
            app.session
                .complete_turn(Ok(reply(long_reply.clone())), &mut app.chat_pane)
                .unwrap();
        }
        app.scroll_chat_to_bottom();

        assert_eq!(app.session.transcript().len(), 140);
        assert_eq!(app.chat_scroll, u16::MAX);
    }

    #[tokio::test]
    async fn finished_chat_reply_lands_in_the_transcript() {
        let mut app = offline_app();
        let started = app.session.begin_turn("hi", "calm_mentor", &mut app.chat_pane);
        assert!(matches!(started, TurnStart::Started(_)));
        app.chat_task = Some(tokio::spawn(async { Ok(reply("Hello there".to_string())) }));

        settle_chat(&mut app).await;

        assert!(app.chat_task.is_none());
        assert!(!app.session.is_in_flight());
        assert!(!app.chat_pane.typing);
        assert!(app.error_popup.is_none());
        let last = app.session.transcript().last().unwrap();
        assert_eq!(last.content, "Hello there");
        assert_eq!(app.session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn failed_chat_reply_pops_an_error_and_keeps_the_user_turn() {
        let mut app = offline_app();
        app.session.begin_turn("hi", "calm_mentor", &mut app.chat_pane);
        app.chat_task = Some(tokio::spawn(async {
            Err(CompanionError::Interrupted { operation: "Chat" })
        }));

        settle_chat(&mut app).await;

        assert!(!app.session.is_in_flight());
        assert!(!app.chat_pane.typing);
        assert!(app.error_popup.as_deref().unwrap().starts_with("Error: "));
        assert_eq!(app.session.transcript().len(), 1);
        assert_eq!(app.session.transcript().last().unwrap().content, "hi");
    }

    #[tokio::test]
    async fn memory_context_follows_the_toggle() {
        let mut app = offline_app();
        app.apply_background(Background::Memory(Ok(UserMemory::default())));
        assert!(app.session.context().is_none());

        app.toggle_memory_context();
        assert_eq!(app.session.context(), Some(&UserMemory::default()));

        app.toggle_memory_context();
        assert!(app.session.context().is_none());
    }

    #[tokio::test]
    async fn empty_comparison_pops_validation_error() {
        let mut app = App::new(CompanionClient::new("http://127.0.0.1:9"), &Config::default(), None);
        app.compare();
        assert!(!app.is_loading());
        assert_eq!(app.error_popup.as_deref(), Some("Error: Please enter a message"));
    }
}
