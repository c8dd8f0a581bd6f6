//! # Request Dispatch
//!
//! Runs a request on a background task and reports the outcome as a single
//! message on the update loop's queue. Tasks never see the view state.

use crate::repl::events::{Message, MessageSender};
use crate::repl::models::Request;
use crate::repl::services::http::RequestExecutor;
use std::sync::Arc;
use tokio::task::JoinHandle;

pub struct RequestDispatcher<E: RequestExecutor> {
    executor: Arc<E>,
    sender: MessageSender,
}

impl<E: RequestExecutor> RequestDispatcher<E> {
    pub fn new(executor: E, sender: MessageSender) -> Self {
        Self {
            executor: Arc::new(executor),
            sender,
        }
    }

    /// Spawn a task for `request`.
    ///
    /// The task enqueues exactly one `ResponseReceived` or `ResponseErrored`,
    /// also when the executor panics. It is never cancelled; if the queue is
    /// gone the result is dropped.
    pub fn dispatch(&self, request: Request) -> JoinHandle<()> {
        let executor = Arc::clone(&self.executor);
        let sender = self.sender.clone();
        let title = request.title();

        tokio::spawn(async move {
            let execution = tokio::spawn(async move { executor.execute(request).await });

            let message = match execution.await {
                Ok(Ok(response)) => {
                    tracing::debug!(request = %title, status = response.status.code, "dispatch finished");
                    Message::ResponseReceived(Box::new(response))
                }
                Ok(Err(e)) => {
                    tracing::error!(request = %title, error = %e, "dispatch failed");
                    Message::ResponseErrored(e.to_string())
                }
                Err(e) => {
                    tracing::error!(request = %title, error = %e, "dispatch task died");
                    Message::ResponseErrored(format!("request task failed: {e}"))
                }
            };

            if sender.send(message).is_err() {
                tracing::warn!(request = %title, "update loop is gone, dropping result");
            }
        })
    }
}
