//! # Models
//!
//! Plain data: parsed request definitions and received responses.

pub mod request_model;
pub mod response_model;

pub use request_model::{
    boundary_of, Body, BodyKind, HttpHeaders, ListEntry, Method, Request, DEFAULT_HTTP_VERSION,
};
pub use response_model::{Response, ResponseStatus};
