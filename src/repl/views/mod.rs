//! # Views Module
//!
//! Rendering of the view state onto the terminal backend.

pub mod terminal_renderer;

pub use terminal_renderer::{TerminalRenderer, ViewRenderer, APP_TITLE};
