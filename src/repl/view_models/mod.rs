//! # ViewModel Module
//!
//! UI state and the arithmetic behind it: scroll offsets, soft wrapping and
//! the [`ViewState`] the update loop mutates.

pub mod scrolling;
pub mod view_state;
pub mod wrap;

pub use scrolling::{max_offset, ScrollResult, ScrollState};
pub use view_state::{ExpandedPane, PendingRequest, Redraw, Section, ViewState, SPINNER_FRAMES};
pub use wrap::{wrap_line, wrap_text, CONTINUATION_INDENT};
