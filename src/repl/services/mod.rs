//! # Services Layer
//!
//! Network side of the application: sending requests, decoding replies and
//! running both off the update loop.

pub mod decoder;
pub mod dispatch;
pub mod http;

pub use dispatch::RequestDispatcher;
pub use http::{DispatchError, HttpExecutor, RequestExecutor};
