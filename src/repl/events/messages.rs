//! # Messages
//!
//! The closed set of messages consumed by the update loop, and the queue that
//! carries them. Producers are the input loop and request dispatch tasks; the
//! update loop is the only consumer.

use crate::repl::models::Response;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    /// Toggle full-screen display of the active pane
    Expand,
    /// Send the selected request
    AwaitRequest,
    ResponseReceived(Box<Response>),
    ResponseErrored(String),
    Quit,
    /// The input device failed; the application must shut down
    BackendFailed(String),
}

impl Message {
    /// True for the two messages a dispatch task may produce
    pub fn is_dispatch_result(&self) -> bool {
        matches!(
            self,
            Message::ResponseReceived(_) | Message::ResponseErrored(_)
        )
    }
}

pub type MessageSender = mpsc::UnboundedSender<Message>;
pub type MessageReceiver = mpsc::UnboundedReceiver<Message>;

/// Create the queue shared by all producers and the update loop
pub fn message_queue() -> (MessageSender, MessageReceiver) {
    mpsc::unbounded_channel()
}
