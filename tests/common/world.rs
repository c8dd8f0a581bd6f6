use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use cucumber::World;
use httui::config::{HttpConfig, Theme};
use httui::repl::events::{map_event, message_queue, Message};
use httui::repl::io::{MockEventStream, MockRenderStream};
use httui::repl::models::{ListEntry, Request};
use httui::repl::services::{HttpExecutor, RequestDispatcher};
use httui::repl::utils::{parse_dir, parse_with, LoadError, ParseError, ParserOptions};
use httui::repl::view_models::ViewState;
use httui::repl::views::TerminalRenderer;
use httui::AppController;
use std::collections::BTreeMap;
use tempfile::TempDir;
use wiremock::MockServer;

/// Placeholder in scenario text replaced by the mock server's base URL
pub const SERVER_PLACEHOLDER: &str = "$SERVER";

#[derive(World)]
#[world(init = Self::new)]
pub struct HttpWorld {
    pub options: ParserOptions,
    pub parsed: Option<Result<Vec<Request>, ParseError>>,
    pub dir: Option<TempDir>,
    pub loaded: Option<Result<BTreeMap<String, Vec<Request>>, LoadError>>,
    pub state: Option<ViewState>,
    pub terminal_size: (u16, u16),
    /// Requests handed out by accepted sends, in order
    pub dispatched: Vec<Request>,
    /// Dispatch results delivered to the view state
    pub results: Vec<Message>,
    pub server: Option<MockServer>,
    pub screen: Option<MockRenderStream>,
    pub run_error: Option<String>,
}

impl std::fmt::Debug for HttpWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpWorld")
            .field("options", &self.options)
            .field("parsed", &self.parsed)
            .field("state", &self.state)
            .field("dispatched", &self.dispatched.len())
            .field("results", &self.results)
            .field("server", &self.server.as_ref().map(|s| s.uri()))
            .finish()
    }
}

impl HttpWorld {
    pub fn new() -> Self {
        Self {
            options: ParserOptions::default(),
            parsed: None,
            dir: None,
            loaded: None,
            state: None,
            terminal_size: (80, 24),
            dispatched: Vec::new(),
            results: Vec::new(),
            server: None,
            screen: None,
            run_error: None,
        }
    }

    /// Substitute the server placeholder and normalise docstring text
    pub fn prepare_source(&self, text: &str) -> String {
        let mut source = text.trim_start_matches('\n').to_string();
        if let Some(server) = &self.server {
            source = source.replace(SERVER_PLACEHOLDER, &server.uri());
        }
        if !source.ends_with('\n') {
            source.push('\n');
        }
        source
    }

    pub fn parse(&mut self, text: &str) {
        let source = self.prepare_source(text);
        self.parsed = Some(parse_with(&source, self.options));
    }

    pub fn requests(&self) -> &[Request] {
        match &self.parsed {
            Some(Ok(requests)) => requests,
            Some(Err(e)) => panic!("expected a successful parse, got: {e}"),
            None => panic!("nothing has been parsed yet"),
        }
    }

    pub fn parse_error(&self) -> &ParseError {
        match &self.parsed {
            Some(Err(e)) => e,
            Some(Ok(requests)) => panic!("expected a parse error, got {} requests", requests.len()),
            None => panic!("nothing has been parsed yet"),
        }
    }

    pub fn load_directory(&mut self) {
        let dir = self.dir.as_ref().expect("no directory was created");
        self.loaded = Some(parse_dir(dir.path(), self.options));
    }

    pub fn open_browser(&mut self) {
        let entries = ListEntry::from_requests(self.requests().to_vec());
        self.state = Some(ViewState::new(entries, self.terminal_size));
    }

    pub fn state(&self) -> &ViewState {
        self.state.as_ref().expect("the browser has not been opened")
    }

    pub fn state_mut(&mut self) -> &mut ViewState {
        self.state.as_mut().expect("the browser has not been opened")
    }

    /// Feed one message to the view state, recording any accepted send
    pub fn apply(&mut self, message: Message) {
        if let Some(request) = self.state_mut().apply(message) {
            self.dispatched.push(request);
        }
    }

    pub fn press(&mut self, key: &str) {
        let event = key_event(key);
        if let Some(message) = map_event(&event) {
            self.apply(message);
        }
    }

    /// Dispatch every request handed out so far and deliver the results
    pub async fn complete_dispatches(&mut self) {
        let (tx, mut rx) = message_queue();
        let executor = HttpExecutor::new(&HttpConfig::default()).expect("client");
        let dispatcher = RequestDispatcher::new(executor, tx);

        for request in std::mem::take(&mut self.dispatched) {
            dispatcher
                .dispatch(request)
                .await
                .expect("dispatch task panicked");
        }

        while let Ok(message) = rx.try_recv() {
            self.results.push(message.clone());
            self.state_mut().apply(message);
        }
    }

    /// Run the whole application against mock terminal devices
    pub async fn run_application(&mut self, keys: &[&str]) {
        let entries = ListEntry::from_requests(self.requests().to_vec());
        let screen = MockRenderStream::with_size(self.terminal_size);
        let renderer = TerminalRenderer::new(screen.clone(), Theme::default());
        let executor = HttpExecutor::new(&HttpConfig::default()).expect("client");

        let mut events: Vec<Event> = keys.iter().map(|key| key_event(key)).collect();
        events.push(key_event("Ctrl+Q"));

        let mut app = AppController::new(entries, renderer, executor).expect("controller");
        if let Err(e) = app.run(MockEventStream::new(events)).await {
            self.run_error = Some(format!("{e:#}"));
        }
        self.screen = Some(screen);
    }
}

impl Default for HttpWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a key press from names like `j`, `Down`, `Tab`, `Space` or `Ctrl+Q`
pub fn key_event(key: &str) -> Event {
    if let Some(rest) = key.strip_prefix("Ctrl+") {
        let c = rest
            .to_ascii_lowercase()
            .chars()
            .next()
            .expect("Ctrl+ needs a key");
        return Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));
    }

    let code = match key {
        "Up" => KeyCode::Up,
        "Down" => KeyCode::Down,
        "Left" => KeyCode::Left,
        "Right" => KeyCode::Right,
        "Tab" => KeyCode::Tab,
        "BackTab" => KeyCode::BackTab,
        "Enter" => KeyCode::Enter,
        "Space" => KeyCode::Char(' '),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => panic!("unknown key name '{other}'"),
            }
        }
    };
    Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
}
