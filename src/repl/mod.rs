//! # Interactive Browser
//!
//! The terminal application: parsed requests on the left, the selected
//! request and its response on the right.

pub mod controllers;
pub mod events;
pub mod geometry;
pub mod io;
pub mod models;
pub mod services;
pub mod utils;
pub mod view_models;
pub mod views;

pub use controllers::AppController;
pub use models::{ListEntry, Request, Response};
pub use view_models::ViewState;
