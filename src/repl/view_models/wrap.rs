//! Soft wrapping of pane content.
//!
//! Widths are measured in terminal cells with `unicode-width`. A line wider
//! than the pane becomes a full-width first segment followed by continuation
//! segments that start with [`CONTINUATION_INDENT`] and are shortened by its
//! width.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const CONTINUATION_INDENT: &str = "  ";

const TAB_STOP: &str = "    ";

/// Make a line safe to print: tabs become spaces, other control characters go
fn sanitize(line: &str) -> String {
    let mut clean = String::with_capacity(line.len());
    for ch in line.chars() {
        match ch {
            '\t' => clean.push_str(TAB_STOP),
            c if c.is_control() => {}
            c => clean.push(c),
        }
    }
    clean
}

/// Wrap a single logical line to `width` cells
pub fn wrap_line(line: &str, width: usize) -> Vec<String> {
    let line = sanitize(line);
    if width == 0 || line.width() <= width {
        return vec![line];
    }

    let indent_width = CONTINUATION_INDENT.width();
    let (indent, continuation_width) = if width > indent_width {
        (CONTINUATION_INDENT, width - indent_width)
    } else {
        ("", width)
    };

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    let mut limit = width;

    for ch in line.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if current_width + ch_width > limit && !current.is_empty() {
            segments.push(std::mem::take(&mut current));
            current.push_str(indent);
            current_width = 0;
            limit = continuation_width;
            if indent.is_empty() {
                current.clear();
            }
        }
        current.push(ch);
        current_width += ch_width;
    }

    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Wrap multi-line text to `width` cells
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    text.lines().flat_map(|line| wrap_line(line, width)).collect()
}
