//! Scroll offset arithmetic shared by the list and the two content panes.
//!
//! One rule everywhere: an offset lives in `[0, max(0, len - viewport))`,
//! stepping down is allowed only while below that bound and stepping up only
//! while above zero. A viewport smaller than one line is treated as one line.

/// Result of a scroll operation, used to decide whether a redraw is needed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollResult {
    pub old_offset: usize,
    pub new_offset: usize,
}

impl ScrollResult {
    pub fn changed(&self) -> bool {
        self.old_offset != self.new_offset
    }
}

/// Largest valid offset for `content_len` lines shown through `viewport` lines
pub fn max_offset(content_len: usize, viewport: usize) -> usize {
    content_len.saturating_sub(viewport.max(1))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollState {
    offset: usize,
}

impl ScrollState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn reset(&mut self) {
        self.offset = 0;
    }

    pub fn scroll_down(&mut self, content_len: usize, viewport: usize) -> ScrollResult {
        let old_offset = self.offset;
        if self.offset < max_offset(content_len, viewport) {
            self.offset += 1;
        }
        ScrollResult {
            old_offset,
            new_offset: self.offset,
        }
    }

    pub fn scroll_up(&mut self) -> ScrollResult {
        let old_offset = self.offset;
        self.offset = self.offset.saturating_sub(1);
        ScrollResult {
            old_offset,
            new_offset: self.offset,
        }
    }

    /// Pull the offset back into range after the content or viewport changed
    pub fn clamp(&mut self, content_len: usize, viewport: usize) {
        self.offset = self.offset.min(max_offset(content_len, viewport));
    }

    /// Move the window just enough for line `index` to be visible
    pub fn follow(&mut self, index: usize, content_len: usize, viewport: usize) -> ScrollResult {
        let old_offset = self.offset;
        let viewport = viewport.max(1);
        if index < self.offset {
            self.offset = index;
        } else if index >= self.offset + viewport {
            self.offset = index + 1 - viewport;
        }
        self.clamp(content_len, viewport);
        ScrollResult {
            old_offset,
            new_offset: self.offset,
        }
    }

    /// The slice of `lines` visible through a viewport of `viewport` lines
    pub fn window<'a, T>(&self, lines: &'a [T], viewport: usize) -> &'a [T] {
        let start = self.offset.min(lines.len());
        let end = start.saturating_add(viewport).min(lines.len());
        &lines[start..end]
    }
}
