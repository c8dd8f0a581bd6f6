//! # Application Controller
//!
//! Owns the view state and runs the update loop. Every iteration does exactly
//! one of the following, in this order:
//!
//! 1. adopt a changed terminal size,
//! 2. apply one queued message,
//! 3. advance the busy spinner and sleep, or just sleep when idle.
//!
//! After each iteration the dirty regions are repainted. The controller is the
//! only consumer of the message queue and the only writer of the view state.

use crate::repl::controllers::input_loop::{InputLoop, DEFAULT_POLL_TIMEOUT};
use crate::repl::events::{message_queue, Message, MessageReceiver, MessageSender};
use crate::repl::io::EventStream;
use crate::repl::models::ListEntry;
use crate::repl::services::{RequestDispatcher, RequestExecutor};
use crate::repl::view_models::ViewState;
use crate::repl::views::ViewRenderer;
use anyhow::{anyhow, Context, Result};
use std::time::Duration;
use tokio::sync::mpsc::error::TryRecvError;

/// Sleep lengths for iterations with nothing to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopTiming {
    /// Used while a request is in flight; one spinner frame per tick
    pub busy_tick: Duration,
    pub idle_tick: Duration,
}

impl Default for LoopTiming {
    fn default() -> Self {
        Self {
            busy_tick: Duration::from_millis(200),
            idle_tick: Duration::from_millis(100),
        }
    }
}

/// What a single iteration of the update loop did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Resized,
    Handled,
    Ticked,
    Idle,
    Quit,
}

pub struct AppController<R: ViewRenderer, E: RequestExecutor> {
    state: ViewState,
    renderer: R,
    dispatcher: RequestDispatcher<E>,
    sender: MessageSender,
    receiver: MessageReceiver,
    timing: LoopTiming,
}

impl<R: ViewRenderer, E: RequestExecutor> AppController<R, E> {
    pub fn new(entries: Vec<ListEntry>, renderer: R, executor: E) -> Result<Self> {
        let size = renderer
            .terminal_size()
            .context("failed to read terminal size")?;
        let (sender, receiver) = message_queue();

        tracing::info!(requests = entries.len(), ?size, "creating application controller");
        Ok(Self {
            state: ViewState::new(entries, size),
            renderer,
            dispatcher: RequestDispatcher::new(executor, sender.clone()),
            sender,
            receiver,
            timing: LoopTiming::default(),
        })
    }

    pub fn with_timing(mut self, timing: LoopTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Producer handle onto the update loop's queue
    pub fn sender(&self) -> MessageSender {
        self.sender.clone()
    }

    /// Take over the terminal, read input from `events` and run until quit.
    ///
    /// The terminal is restored on every exit path. An error from the loop
    /// wins over an error from restoring.
    pub async fn run<ES>(&mut self, events: ES) -> Result<()>
    where
        ES: EventStream + 'static,
    {
        let outcome = self.run_until_quit(events).await;
        let restored = self.renderer.cleanup();

        match outcome {
            Ok(()) => restored.context("failed to restore terminal"),
            Err(e) => {
                if let Err(restore_error) = restored {
                    tracing::error!("Failed to restore terminal: {restore_error:#}");
                }
                Err(e)
            }
        }
    }

    async fn run_until_quit<ES>(&mut self, events: ES) -> Result<()>
    where
        ES: EventStream + 'static,
    {
        self.renderer.initialize()?;
        let input = InputLoop::spawn(events, self.sender(), DEFAULT_POLL_TIMEOUT)?;

        self.render()?;
        let outcome = loop {
            match self.step().await {
                Ok(Step::Quit) => break Ok(()),
                Ok(_) => {}
                Err(e) => break Err(e),
            }
        };

        input.shutdown();
        tracing::info!("update loop finished");
        outcome
    }

    /// Run one iteration of the update loop and repaint what changed
    pub async fn step(&mut self) -> Result<Step> {
        let size = self
            .renderer
            .terminal_size()
            .context("failed to read terminal size")?;

        let mut nap = None;
        let step = if self.state.resize(size) {
            Step::Resized
        } else {
            match self.receiver.try_recv() {
                Ok(message) => self.handle(message)?,
                Err(TryRecvError::Empty) if self.state.tick() => {
                    nap = Some(self.timing.busy_tick);
                    Step::Ticked
                }
                Err(TryRecvError::Empty) => {
                    nap = Some(self.timing.idle_tick);
                    Step::Idle
                }
                // The controller holds a sender, so this means shutdown
                Err(TryRecvError::Disconnected) => Step::Quit,
            }
        };

        if step != Step::Quit {
            self.render()?;
        }
        if let Some(nap) = nap {
            tokio::time::sleep(nap).await;
        }
        Ok(step)
    }

    fn handle(&mut self, message: Message) -> Result<Step> {
        tracing::debug!(?message, "handling message");
        match message {
            Message::Quit => Ok(Step::Quit),
            Message::BackendFailed(reason) => Err(anyhow!("input backend failed: {reason}")),
            message => {
                if let Some(request) = self.state.apply(message) {
                    tracing::info!(request = %request.title(), "dispatching request");
                    self.dispatcher.dispatch(request);
                }
                Ok(Step::Handled)
            }
        }
    }

    fn render(&mut self) -> Result<()> {
        let regions = self.state.take_redraw();
        self.renderer
            .render(&self.state, regions)
            .context("failed to draw the screen")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::repl::io::{MockEventStream, MockRenderStream};
    use crate::repl::models::{Request, Response, ResponseStatus};
    use crate::repl::services::DispatchError;
    use crate::repl::utils::parse;
    use crate::repl::views::TerminalRenderer;
    use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Default)]
    struct CountingExecutor {
        calls: Arc<AtomicUsize>,
    }

    impl RequestExecutor for CountingExecutor {
        fn execute(
            &self,
            request: Request,
        ) -> impl Future<Output = Result<Response, DispatchError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                let mut response = Response::new(ResponseStatus::new(200, "OK"), request.target);
                response.duration_ms = Some(5);
                Ok(response)
            }
        }
    }

    type TestController = AppController<TerminalRenderer<MockRenderStream>, CountingExecutor>;

    const FAST: LoopTiming = LoopTiming {
        busy_tick: Duration::from_millis(1),
        idle_tick: Duration::from_millis(1),
    };

    fn entries() -> Vec<ListEntry> {
        let requests = parse(
            "&First\nGET http://a.test/one\n\n&Second\nGET http://a.test/two\n\n&Third\nGET http://a.test/three\n",
        )
        .unwrap();
        ListEntry::from_requests(requests)
    }

    fn controller(executor: CountingExecutor) -> (TestController, MockRenderStream) {
        let stream = MockRenderStream::with_size((80, 24));
        let renderer = TerminalRenderer::new(stream.clone(), Theme::default());
        let app = AppController::new(entries(), renderer, executor)
            .unwrap()
            .with_timing(FAST);
        (app, stream)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    async fn settle(app: &mut TestController) {
        for _ in 0..500 {
            if !app.state().is_awaiting() {
                return;
            }
            app.step().await.unwrap();
        }
        panic!("request never completed");
    }

    #[tokio::test]
    async fn resize_should_win_over_queued_messages() {
        let (mut app, stream) = controller(CountingExecutor::default());
        app.sender().send(Message::MoveDown).unwrap();
        stream.set_size((100, 30));

        assert_eq!(app.step().await.unwrap(), Step::Resized);
        assert_eq!(app.state().terminal_size(), (100, 30));
        assert_eq!(app.state().selected_index(), 0);

        assert_eq!(app.step().await.unwrap(), Step::Handled);
        assert_eq!(app.state().selected_index(), 1);
    }

    #[tokio::test]
    async fn empty_queue_should_idle_and_quit_should_stop() {
        let (mut app, _stream) = controller(CountingExecutor::default());
        assert_eq!(app.step().await.unwrap(), Step::Idle);

        app.sender().send(Message::Quit).unwrap();
        assert_eq!(app.step().await.unwrap(), Step::Quit);
    }

    #[tokio::test]
    async fn backend_failure_should_be_fatal() {
        let (mut app, _stream) = controller(CountingExecutor::default());
        app.sender()
            .send(Message::BackendFailed("tty closed".to_string()))
            .unwrap();

        let err = app.step().await.unwrap_err();
        assert!(err.to_string().contains("tty closed"));
    }

    #[tokio::test]
    async fn accepted_await_should_dispatch_once_and_show_response() {
        let executor = CountingExecutor::default();
        let (mut app, stream) = controller(executor.clone());

        app.sender().send(Message::MoveDown).unwrap();
        app.sender().send(Message::AwaitRequest).unwrap();
        app.sender().send(Message::AwaitRequest).unwrap();
        for _ in 0..3 {
            assert_eq!(app.step().await.unwrap(), Step::Handled);
        }
        assert!(app.state().is_awaiting());

        settle(&mut app).await;
        assert_eq!(executor.calls.load(Ordering::SeqCst), 1);

        let response = app.state().last_response().unwrap();
        assert_eq!(response.body, "http://a.test/two");
        assert!(stream.screen_contains("200 OK 5 ms"));

        // No stray second result arrives later
        assert_eq!(app.step().await.unwrap(), Step::Idle);
        assert!(app.state().last_error().is_none());
    }

    #[tokio::test]
    async fn spinner_should_tick_while_awaiting() {
        let (mut app, _stream) = controller(CountingExecutor::default());
        app.sender().send(Message::AwaitRequest).unwrap();
        assert_eq!(app.step().await.unwrap(), Step::Handled);

        let first = app.state().spinner();
        assert_eq!(app.step().await.unwrap(), Step::Ticked);
        assert_ne!(app.state().spinner(), first);

        settle(&mut app).await;
    }

    #[tokio::test]
    async fn run_should_restore_terminal_after_quit() {
        let (mut app, stream) = controller(CountingExecutor::default());
        let events = MockEventStream::new(vec![
            key(KeyCode::Char('j')),
            key(KeyCode::Char('j')),
            Event::Key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)),
        ]);

        app.run(events).await.unwrap();

        assert_eq!(app.state().selected_index(), 2);
        assert!(!app.renderer().is_initialized());
        assert!(!stream.is_raw_mode());
        assert!(!stream.is_alternate_screen());
        assert!(stream.is_cursor_visible());
    }

    #[tokio::test]
    async fn input_failure_should_end_run_with_error_and_restore_terminal() {
        let (mut app, stream) = controller(CountingExecutor::default());
        let events = MockEventStream::empty();
        events.fail_reads();

        let err = app.run(events).await.unwrap_err();
        assert!(err.to_string().contains("input backend failed"));
        assert!(!stream.is_raw_mode());
        assert!(!stream.is_alternate_screen());
        assert!(stream.is_cursor_visible());
    }

    #[tokio::test]
    async fn drawing_failure_should_end_run_with_error_and_restore_terminal() {
        let (mut app, stream) = controller(CountingExecutor::default());
        stream.fail_drawing();

        let result = app.run(MockEventStream::empty()).await;
        assert!(result.is_err());
        assert!(!stream.is_raw_mode());
        assert!(!stream.is_alternate_screen());
        assert!(stream.is_cursor_visible());
    }
}
