//! # Geometry Types
//!
//! Screen rectangles and the pane layout derived from the terminal size.
//!
//! ```text
//! row 0        ┌ title bar ─────────────────────────────────┐
//!              │ list (cols/4) │ request (top half)         │
//!              │               ├────────────────────────────┤
//!              │               │ response (bottom half)     │
//! row rows-1   └ status bar ────────────────────────────────┘
//! ```
//!
//! Nothing here is cached; the layout is recomputed from the size on demand.

use crate::repl::io::TerminalSize;

/// Rows taken by the title bar and the status bar
pub const CHROME_ROWS: u16 = 2;

/// A rectangle of terminal cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Area inside a one-cell border
    pub fn inner(&self) -> Rect {
        Rect {
            x: self.x.saturating_add(1),
            y: self.y.saturating_add(1),
            width: self.width.saturating_sub(2),
            height: self.height.saturating_sub(2),
        }
    }

    pub fn right(&self) -> u16 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u16 {
        self.y.saturating_add(self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Number of content lines visible inside the border
    pub fn viewport_height(&self) -> usize {
        self.inner().height as usize
    }

    /// Number of content columns visible inside the border
    pub fn viewport_width(&self) -> usize {
        self.inner().width as usize
    }
}

/// Every region of the screen for one terminal size
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub title: Rect,
    pub status: Rect,
    pub list: Rect,
    pub request: Rect,
    pub response: Rect,
    /// Region used by an expanded pane: the whole interior
    pub expanded: Rect,
}

impl Layout {
    pub fn compute((cols, rows): TerminalSize) -> Self {
        let interior_height = rows.saturating_sub(CHROME_ROWS);
        let list_width = cols / 4;
        let pane_width = cols - list_width;
        let request_height = interior_height / 2;

        Self {
            title: Rect::new(0, 0, cols, rows.min(1)),
            status: Rect::new(0, rows.saturating_sub(1), cols, rows.min(1)),
            list: Rect::new(0, 1, list_width, interior_height),
            request: Rect::new(list_width, 1, pane_width, request_height),
            response: Rect::new(
                list_width,
                1 + request_height,
                pane_width,
                interior_height - request_height,
            ),
            expanded: Rect::new(0, 1, cols, interior_height),
        }
    }
}
