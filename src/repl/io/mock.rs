//! # Mock I/O Implementations for Testing
//!
//! Backends that need no terminal. Both are cheap clonable handles onto shared
//! state, so a test can keep one handle while the controller or input loop
//! owns the other.

use super::{EventStream, RenderStream, TerminalSize};
use crate::config::ColorSpec;
use anyhow::{anyhow, bail, Result};
use crossterm::event::Event;
use std::collections::VecDeque;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use unicode_width::UnicodeWidthChar;

/// Upper bound on how long an empty mock stream sleeps inside `poll`
const EMPTY_POLL_SLEEP: Duration = Duration::from_millis(5);

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Default)]
struct EventQueue {
    events: VecDeque<Event>,
    fail_reads: bool,
}

/// Mock event stream fed with pre-programmed events
#[derive(Debug, Clone, Default)]
pub struct MockEventStream {
    queue: Arc<Mutex<EventQueue>>,
}

impl MockEventStream {
    pub fn new(events: Vec<Event>) -> Self {
        let stream = Self::default();
        lock(&stream.queue).events.extend(events);
        stream
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn push_event(&self, event: Event) {
        lock(&self.queue).events.push_back(event);
    }

    pub fn pending(&self) -> usize {
        lock(&self.queue).events.len()
    }

    /// Make every subsequent `poll` and `read` fail
    pub fn fail_reads(&self) {
        lock(&self.queue).fail_reads = true;
    }
}

impl EventStream for MockEventStream {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        {
            let queue = lock(&self.queue);
            if queue.fail_reads {
                bail!("mock input device failed");
            }
            if !queue.events.is_empty() {
                return Ok(true);
            }
        }

        std::thread::sleep(timeout.min(EMPTY_POLL_SLEEP));
        Ok(!lock(&self.queue).events.is_empty())
    }

    fn read(&mut self) -> Result<Event> {
        let mut queue = lock(&self.queue);
        if queue.fail_reads {
            bail!("mock input device failed");
        }
        queue
            .events
            .pop_front()
            .ok_or_else(|| anyhow!("No events available"))
    }
}

/// Recorded render command for verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    ClearScreen,
    ClearLineFromCursor,
    MoveCursor(u16, u16),
    SetForeground(ColorSpec),
    ResetStyle,
    HideCursor,
    ShowCursor,
    EnterAlternateScreen,
    LeaveAlternateScreen,
    EnableRawMode,
    DisableRawMode,
    Write(String),
    Flush,
}

#[derive(Debug)]
struct MockTerminal {
    size: TerminalSize,
    commands: Vec<RenderCommand>,
    grid: Vec<Vec<char>>,
    cursor: (u16, u16),
    cursor_visible: bool,
    raw_mode: bool,
    alternate_screen: bool,
    fail_drawing: bool,
}

/// Placeholder for the second cell of a double-width character
const WIDE_TAIL: char = '\0';

impl MockTerminal {
    fn new(size: TerminalSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
            grid: blank_grid(size),
            cursor: (0, 0),
            cursor_visible: true,
            raw_mode: false,
            alternate_screen: false,
            fail_drawing: false,
        }
    }

    fn put_text(&mut self, text: &str) {
        let (cols, rows) = self.size;
        for ch in text.chars() {
            let (x, y) = self.cursor;
            let width = ch.width().unwrap_or(0) as u16;
            if width == 0 {
                continue;
            }
            if y < rows && x + width <= cols {
                let row = &mut self.grid[y as usize];
                row[x as usize] = ch;
                if width == 2 {
                    row[x as usize + 1] = WIDE_TAIL;
                }
            }
            self.cursor.0 = x.saturating_add(width);
        }
    }

    fn clear_line_from_cursor(&mut self) {
        let (x, y) = self.cursor;
        if let Some(row) = self.grid.get_mut(y as usize) {
            for cell in row.iter_mut().skip(x as usize) {
                *cell = ' ';
            }
        }
    }
}

fn blank_grid((cols, rows): TerminalSize) -> Vec<Vec<char>> {
    vec![vec![' '; cols as usize]; rows as usize]
}

/// Mock render stream.
///
/// Records every command and keeps a character grid of what would be on
/// screen, so tests can assert on both the call sequence and the result.
#[derive(Debug, Clone)]
pub struct MockRenderStream {
    terminal: Arc<Mutex<MockTerminal>>,
}

impl MockRenderStream {
    pub fn new() -> Self {
        Self::with_size((80, 24))
    }

    pub fn with_size(size: TerminalSize) -> Self {
        Self {
            terminal: Arc::new(Mutex::new(MockTerminal::new(size))),
        }
    }

    /// Change the reported size; the screen grid is cleared
    pub fn set_size(&self, size: TerminalSize) {
        let mut terminal = lock(&self.terminal);
        terminal.size = size;
        terminal.grid = blank_grid(size);
    }

    /// Make drawing operations fail, as a broken terminal would.
    /// Restore operations keep working.
    pub fn fail_drawing(&self) {
        lock(&self.terminal).fail_drawing = true;
    }

    pub fn get_commands(&self) -> Vec<RenderCommand> {
        lock(&self.terminal).commands.clone()
    }

    pub fn clear_commands(&self) {
        lock(&self.terminal).commands.clear();
    }

    pub fn has_command(&self, command: &RenderCommand) -> bool {
        lock(&self.terminal).commands.contains(command)
    }

    pub fn count_command(&self, command: &RenderCommand) -> usize {
        lock(&self.terminal)
            .commands
            .iter()
            .filter(|c| *c == command)
            .count()
    }

    /// Text on screen row `row`, trailing blanks removed
    pub fn screen_line(&self, row: u16) -> String {
        let terminal = lock(&self.terminal);
        terminal
            .grid
            .get(row as usize)
            .map(|cells| {
                cells
                    .iter()
                    .filter(|c| **c != WIDE_TAIL)
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .unwrap_or_default()
    }

    /// The whole screen, one line per row
    pub fn screen_text(&self) -> String {
        let rows = lock(&self.terminal).size.1;
        (0..rows)
            .map(|row| self.screen_line(row))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn screen_contains(&self, text: &str) -> bool {
        self.screen_text().contains(text)
    }

    pub fn is_cursor_visible(&self) -> bool {
        lock(&self.terminal).cursor_visible
    }

    pub fn is_raw_mode(&self) -> bool {
        lock(&self.terminal).raw_mode
    }

    pub fn is_alternate_screen(&self) -> bool {
        lock(&self.terminal).alternate_screen
    }

    fn record(&self, command: RenderCommand) {
        lock(&self.terminal).commands.push(command);
    }

    fn draw(&self, command: RenderCommand) -> Result<MutexGuard<'_, MockTerminal>> {
        let mut terminal = lock(&self.terminal);
        if terminal.fail_drawing {
            bail!("mock terminal write failed");
        }
        terminal.commands.push(command);
        Ok(terminal)
    }
}

impl Default for MockRenderStream {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for MockRenderStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let text = String::from_utf8_lossy(buf).into_owned();
        let mut terminal = self
            .draw(RenderCommand::Write(text.clone()))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::BrokenPipe, e.to_string()))?;
        terminal.put_text(&text);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.record(RenderCommand::Flush);
        Ok(())
    }
}

impl RenderStream for MockRenderStream {
    fn clear_screen(&mut self) -> Result<()> {
        let mut terminal = self.draw(RenderCommand::ClearScreen)?;
        terminal.grid = blank_grid(terminal.size);
        Ok(())
    }

    fn clear_line_from_cursor(&mut self) -> Result<()> {
        self.draw(RenderCommand::ClearLineFromCursor)?
            .clear_line_from_cursor();
        Ok(())
    }

    fn move_cursor(&mut self, x: u16, y: u16) -> Result<()> {
        let mut terminal = self.draw(RenderCommand::MoveCursor(x, y))?;
        terminal.cursor = (x, y);
        Ok(())
    }

    fn set_foreground(&mut self, color: ColorSpec) -> Result<()> {
        self.draw(RenderCommand::SetForeground(color))?;
        Ok(())
    }

    fn reset_style(&mut self) -> Result<()> {
        self.record(RenderCommand::ResetStyle);
        Ok(())
    }

    fn hide_cursor(&mut self) -> Result<()> {
        self.record(RenderCommand::HideCursor);
        lock(&self.terminal).cursor_visible = false;
        Ok(())
    }

    fn show_cursor(&mut self) -> Result<()> {
        self.record(RenderCommand::ShowCursor);
        lock(&self.terminal).cursor_visible = true;
        Ok(())
    }

    fn get_size(&self) -> Result<TerminalSize> {
        Ok(lock(&self.terminal).size)
    }

    fn enter_alternate_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::EnterAlternateScreen);
        lock(&self.terminal).alternate_screen = true;
        Ok(())
    }

    fn leave_alternate_screen(&mut self) -> Result<()> {
        self.record(RenderCommand::LeaveAlternateScreen);
        lock(&self.terminal).alternate_screen = false;
        Ok(())
    }

    fn enable_raw_mode(&mut self) -> Result<()> {
        self.record(RenderCommand::EnableRawMode);
        lock(&self.terminal).raw_mode = true;
        Ok(())
    }

    fn disable_raw_mode(&mut self) -> Result<()> {
        self.record(RenderCommand::DisableRawMode);
        lock(&self.terminal).raw_mode = false;
        Ok(())
    }
}
