//! # Terminal Renderer
//!
//! Draws a [`ViewState`] through a [`RenderStream`]. The renderer keeps no
//! UI state of its own; it only knows whether it has taken over the terminal,
//! so that the terminal is handed back exactly once on every exit path.

use crate::config::{ColorSpec, Theme};
use crate::repl::events::KEY_HELP;
use crate::repl::geometry::Rect;
use crate::repl::io::{RenderStream, TerminalSize};
use crate::repl::view_models::{ExpandedPane, Redraw, Section, ViewState};
use anyhow::{Context, Result};
use unicode_width::UnicodeWidthChar;

/// Application name shown at the left of the title bar
pub const APP_TITLE: &str = "HTTP/TUI";

const LIST_TITLE: &str = "Requests";
const REQUEST_TITLE: &str = "Request";
const RESPONSE_TITLE: &str = "Response";
const SELECTED_MARKER: &str = "▸ ";
const UNSELECTED_MARKER: &str = "  ";

/// Trait for rendering views
pub trait ViewRenderer {
    /// Take over the terminal: raw mode, alternate screen, hidden cursor
    fn initialize(&mut self) -> Result<()>;

    /// Repaint the regions in `regions`
    fn render(&mut self, state: &ViewState, regions: Redraw) -> Result<()>;

    /// Current size of the output surface
    fn terminal_size(&self) -> Result<TerminalSize>;

    /// Give the terminal back. Safe to call more than once.
    fn cleanup(&mut self) -> Result<()>;
}

/// Cut `text` down to at most `width` cells; returns the text and its width
fn truncate(text: &str, width: usize) -> (String, usize) {
    let mut truncated = String::with_capacity(width);
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width > width {
            break;
        }
        truncated.push(ch);
        used += ch_width;
    }
    (truncated, used)
}

/// Truncate `text` to `width` cells and pad it with spaces to exactly `width`
fn fit(text: &str, width: usize) -> String {
    let (mut fitted, used) = truncate(text, width);
    fitted.extend(std::iter::repeat(' ').take(width - used));
    fitted
}

pub struct TerminalRenderer<RS: RenderStream> {
    stream: RS,
    theme: Theme,
    subtitle: Option<String>,
    initialized: bool,
}

impl<RS: RenderStream> TerminalRenderer<RS> {
    pub fn new(stream: RS, theme: Theme) -> Self {
        Self {
            stream,
            theme,
            subtitle: None,
            initialized: false,
        }
    }

    /// Text shown after the application name, usually the loaded path
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    fn print(&mut self, text: &str) -> Result<()> {
        self.stream
            .write_all(text.as_bytes())
            .context("failed to write to terminal")
    }

    fn print_at(&mut self, x: u16, y: u16, text: &str) -> Result<()> {
        self.stream.move_cursor(x, y)?;
        self.print(text)
    }

    fn print_colored(&mut self, x: u16, y: u16, color: ColorSpec, text: &str) -> Result<()> {
        self.stream.move_cursor(x, y)?;
        self.stream.set_foreground(color)?;
        self.print(text)?;
        self.stream.reset_style()
    }

    fn render_title(&mut self, state: &ViewState) -> Result<()> {
        let (cols, rows) = state.terminal_size();
        if rows == 0 {
            return Ok(());
        }

        let title = match &self.subtitle {
            Some(subtitle) => format!(" {APP_TITLE}  {subtitle}"),
            None => format!(" {APP_TITLE}"),
        };
        let color = self.theme.title;
        self.print_colored(0, 0, color, &fit(&title, cols as usize))
    }

    /// Draw a one-cell border around `rect` with `title` in the top edge
    fn render_frame(&mut self, rect: Rect, title: &str, active: bool) -> Result<()> {
        if rect.width < 2 || rect.height < 2 {
            return Ok(());
        }

        let color = if active {
            self.theme.active_border
        } else {
            self.theme.border
        };
        let inner_width = (rect.width - 2) as usize;
        let (label, label_width) = truncate(&format!(" {title} "), inner_width);

        let top = format!("┌{label}{}┐", "─".repeat(inner_width - label_width));
        let bottom = format!("└{}┘", "─".repeat(inner_width));

        self.stream.set_foreground(color)?;
        self.print_at(rect.x, rect.y, &top)?;
        for row in rect.y + 1..rect.bottom() - 1 {
            self.print_at(rect.x, row, "│")?;
            self.print_at(rect.right() - 1, row, "│")?;
        }
        self.print_at(rect.x, rect.bottom() - 1, &bottom)?;
        self.stream.reset_style()
    }

    /// Fill the inside of `rect` with `lines`, blanking rows past the end
    fn render_lines(&mut self, rect: Rect, lines: &[String], color: Option<ColorSpec>) -> Result<()> {
        let inner = rect.inner();
        if inner.is_empty() {
            return Ok(());
        }

        if let Some(color) = color {
            self.stream.set_foreground(color)?;
        }
        for row in 0..inner.height {
            let text = lines.get(row as usize).map(String::as_str).unwrap_or("");
            self.print_at(inner.x, inner.y + row, &fit(text, inner.width as usize))?;
        }
        self.stream.reset_style()
    }

    fn render_list(&mut self, state: &ViewState) -> Result<()> {
        let rect = state.list_rect();
        self.render_frame(rect, LIST_TITLE, state.active_section() == Section::List)?;

        let inner = rect.inner();
        if inner.is_empty() {
            return Ok(());
        }

        let selected = state.selected_index();
        let rows: Vec<(bool, String)> = state
            .visible_entries()
            .map(|(index, entry)| {
                let marker = if index == selected {
                    SELECTED_MARKER
                } else {
                    UNSELECTED_MARKER
                };
                (index == selected, format!("{marker}{}", entry.label))
            })
            .collect();

        for row in 0..inner.height {
            let y = inner.y + row;
            match rows.get(row as usize) {
                Some((true, text)) => {
                    let color = self.theme.selected;
                    self.print_colored(inner.x, y, color, &fit(text, inner.width as usize))?;
                }
                Some((false, text)) => {
                    self.print_at(inner.x, y, &fit(text, inner.width as usize))?;
                }
                None => self.print_at(inner.x, y, &fit("", inner.width as usize))?,
            }
        }
        Ok(())
    }

    fn render_request(&mut self, state: &ViewState) -> Result<()> {
        let rect = state.request_rect();
        let active = state.active_section() == Section::RequestPane;
        self.render_frame(rect, REQUEST_TITLE, active)?;
        self.render_lines(rect, state.visible_request_lines(), None)
    }

    fn render_response(&mut self, state: &ViewState) -> Result<()> {
        let rect = state.response_rect();
        let active = state.active_section() == Section::ResponsePane;
        self.render_frame(rect, RESPONSE_TITLE, active)?;

        let color = state.last_error().map(|_| self.theme.error);
        self.render_lines(rect, state.visible_response_lines(), color)
    }

    fn render_status_bar(&mut self, state: &ViewState) -> Result<()> {
        let (cols, rows) = state.terminal_size();
        if rows < 2 {
            return Ok(());
        }

        let (summary, summary_color) = if let Some(spinner) = state.spinner() {
            (format!("{spinner} sending "), self.theme.status)
        } else if let Some(response) = state.last_response() {
            let elapsed = response
                .duration_ms
                .map(|ms| format!(" {ms} ms"))
                .unwrap_or_default();
            let color = if response.status.is_success() {
                self.theme.status
            } else {
                self.theme.error
            };
            (format!("{}{elapsed} ", response.status.as_string()), color)
        } else if state.last_error().is_some() {
            ("request failed ".to_string(), self.theme.error)
        } else {
            (String::new(), self.theme.status)
        };

        let cols = cols as usize;
        let (summary, summary_width) = truncate(&summary, cols);
        let help = fit(&format!(" {KEY_HELP}"), cols - summary_width);

        let y = rows - 1;
        let status_color = self.theme.status;
        self.print_colored(0, y, status_color, &help)?;
        self.print_colored(
            (cols - summary_width) as u16,
            y,
            summary_color,
            &summary,
        )
    }
}

impl<RS: RenderStream> ViewRenderer for TerminalRenderer<RS> {
    fn initialize(&mut self) -> Result<()> {
        self.stream
            .enable_raw_mode()
            .context("failed to enable raw mode")?;
        self.initialized = true;
        self.stream.enter_alternate_screen()?;
        self.stream.hide_cursor()?;
        self.stream.clear_screen()?;
        tracing::info!("Terminal initialised");
        Ok(())
    }

    fn render(&mut self, state: &ViewState, regions: Redraw) -> Result<()> {
        if regions.is_empty() {
            return Ok(());
        }

        let regions = if regions.contains(Redraw::FULL) {
            self.stream.clear_screen()?;
            regions | Redraw::ALL
        } else {
            regions
        };

        if regions.contains(Redraw::TITLE) {
            self.render_title(state)?;
        }

        match state.expanded_pane() {
            ExpandedPane::None => {
                if regions.contains(Redraw::LIST) {
                    self.render_list(state)?;
                }
                if regions.contains(Redraw::REQUEST) {
                    self.render_request(state)?;
                }
                if regions.contains(Redraw::RESPONSE) {
                    self.render_response(state)?;
                }
            }
            ExpandedPane::Request => {
                if regions.intersects(Redraw::PANES) {
                    self.render_request(state)?;
                }
            }
            ExpandedPane::Response => {
                if regions.intersects(Redraw::PANES) {
                    self.render_response(state)?;
                }
            }
        }

        if regions.contains(Redraw::STATUS) {
            self.render_status_bar(state)?;
        }

        self.stream.flush().context("failed to flush terminal")
    }

    fn terminal_size(&self) -> Result<TerminalSize> {
        self.stream.get_size()
    }

    fn cleanup(&mut self) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        self.initialized = false;

        // Every step runs even if an earlier one fails
        let reset = self.stream.reset_style();
        let cursor = self.stream.show_cursor();
        let screen = self.stream.leave_alternate_screen();
        let raw = self.stream.disable_raw_mode();
        tracing::info!("Terminal restored");

        reset.and(cursor).and(screen).and(raw)
    }
}

impl<RS: RenderStream> Drop for TerminalRenderer<RS> {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            tracing::error!("Failed to restore terminal: {e:#}");
        }
    }
}
