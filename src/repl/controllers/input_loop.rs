//! Input loop: a dedicated thread that reads keys and enqueues messages.
//!
//! The thread owns the event stream and never touches the view state. Keys
//! are mapped once through the keymap; resize events are left to the update
//! loop, which polls the terminal size itself.

use crate::repl::events::{map_event, Message, MessageSender};
use crate::repl::io::EventStream;
use anyhow::{Context, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long a poll waits before the shutdown flag is checked again
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

pub struct InputLoop {
    handle: Option<JoinHandle<()>>,
    shutdown: Arc<AtomicBool>,
}

impl InputLoop {
    pub fn spawn<ES>(stream: ES, sender: MessageSender, poll_timeout: Duration) -> Result<Self>
    where
        ES: EventStream + 'static,
    {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_flag = Arc::clone(&shutdown);

        let handle = thread::Builder::new()
            .name("httui-input".to_string())
            .spawn(move || Self::run_loop(stream, sender, shutdown_flag, poll_timeout))
            .context("failed to spawn input thread")?;

        Ok(Self {
            handle: Some(handle),
            shutdown,
        })
    }

    /// Ask the thread to stop after its current poll
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(true)
    }

    pub fn join(mut self) {
        self.shutdown();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("input thread panicked");
            }
        }
    }

    fn run_loop<ES: EventStream>(
        mut stream: ES,
        sender: MessageSender,
        shutdown: Arc<AtomicBool>,
        poll_timeout: Duration,
    ) {
        tracing::debug!("input loop started");
        while !shutdown.load(Ordering::Relaxed) {
            let event = match stream.poll(poll_timeout) {
                Ok(false) => continue,
                Ok(true) => stream.read(),
                Err(e) => Err(e),
            };

            let event = match event {
                Ok(event) => event,
                Err(e) => {
                    tracing::error!("input device failed: {e:#}");
                    let _ = sender.send(Message::BackendFailed(format!("{e:#}")));
                    break;
                }
            };

            let Some(message) = map_event(&event) else {
                continue;
            };
            tracing::debug!(?message, "key mapped");

            let quit = message == Message::Quit;
            if sender.send(message).is_err() || quit {
                break;
            }
        }
        tracing::debug!("input loop stopped");
    }
}

impl Drop for InputLoop {
    fn drop(&mut self) {
        self.shutdown();
    }
}
