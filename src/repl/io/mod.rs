//! # Terminal Backend
//!
//! Trait abstractions for the terminal the application runs against, so the
//! update loop and renderer never talk to crossterm directly.
//!
//! ```text
//! Production:  InputLoop     ──▶ TerminalEventStream  ──▶ crossterm::event::read()
//!              AppController ──▶ TerminalRenderStream ──▶ crossterm::execute!()
//!
//! Testing:     InputLoop     ──▶ MockEventStream      ──▶ VecDeque<Event>
//!              AppController ──▶ MockRenderStream     ──▶ Vec<RenderCommand> + screen grid
//! ```

use crate::config::ColorSpec;
use anyhow::Result;
use crossterm::event::Event;
use std::io::Write;
use std::time::Duration;

pub mod mock;
pub mod terminal;

pub use mock::{MockEventStream, MockRenderStream, RenderCommand};
pub use terminal::{TerminalEventStream, TerminalRenderStream};

/// Type alias for terminal size (columns, rows)
pub type TerminalSize = (u16, u16);

/// Input event source
pub trait EventStream: Send {
    /// Wait up to `timeout` for an event to become readable
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Read the next event. Only call after `poll` returned true.
    fn read(&mut self) -> Result<Event>;
}

/// Drawing operations the renderer needs from the terminal
pub trait RenderStream: Write + Send {
    fn clear_screen(&mut self) -> Result<()>;

    /// Clear from the cursor to the end of the current line
    fn clear_line_from_cursor(&mut self) -> Result<()>;

    /// Move cursor to (column, row)
    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()>;

    fn set_foreground(&mut self, color: ColorSpec) -> Result<()>;

    fn reset_style(&mut self) -> Result<()>;

    fn hide_cursor(&mut self) -> Result<()>;

    fn show_cursor(&mut self) -> Result<()>;

    /// Get terminal size as (columns, rows)
    fn get_size(&self) -> Result<TerminalSize>;

    fn enter_alternate_screen(&mut self) -> Result<()>;

    fn leave_alternate_screen(&mut self) -> Result<()>;

    fn enable_raw_mode(&mut self) -> Result<()>;

    fn disable_raw_mode(&mut self) -> Result<()>;
}
