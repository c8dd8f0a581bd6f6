//! # View State
//!
//! All mutable UI state, owned by the update loop and changed only through
//! [`ViewState::apply`]. Content shown in the request and response panes is
//! cached here already wrapped to the current pane width; the caches are
//! rebuilt whenever the selection, the response or the geometry changes, and
//! every scroll offset is clamped against them afterwards.

use crate::repl::events::Message;
use crate::repl::geometry::{Layout, Rect};
use crate::repl::io::TerminalSize;
use crate::repl::models::{ListEntry, Request, Response};
use bitflags::bitflags;

use super::scrolling::ScrollState;
use super::wrap::wrap_text;

/// Busy animation shown in the status bar while a request is in flight
pub const SPINNER_FRAMES: [char; 8] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧'];

/// Which region receives navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    List,
    RequestPane,
    ResponsePane,
}

impl Section {
    pub fn next(self) -> Self {
        match self {
            Section::List => Section::RequestPane,
            Section::RequestPane => Section::ResponsePane,
            Section::ResponsePane => Section::List,
        }
    }

    pub fn previous(self) -> Self {
        match self {
            Section::List => Section::ResponsePane,
            Section::RequestPane => Section::List,
            Section::ResponsePane => Section::RequestPane,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExpandedPane {
    #[default]
    None,
    Request,
    Response,
}

/// Dispatch progress. `index` is the list entry the request was sent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PendingRequest {
    #[default]
    Idle,
    Awaiting { frame: usize, index: usize },
}

bitflags! {
    /// Screen regions that need repainting
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Redraw: u8 {
        const TITLE = 1 << 0;
        const LIST = 1 << 1;
        const REQUEST = 1 << 2;
        const RESPONSE = 1 << 3;
        const STATUS = 1 << 4;
        /// Clear the screen before repainting everything
        const FULL = 1 << 7;

        const PANES = Self::LIST.bits() | Self::REQUEST.bits() | Self::RESPONSE.bits();
        const ALL = Self::TITLE.bits() | Self::PANES.bits() | Self::STATUS.bits();
    }
}

#[derive(Debug)]
pub struct ViewState {
    entries: Vec<ListEntry>,
    selected: usize,
    active: Section,
    expanded: ExpandedPane,
    list_scroll: ScrollState,
    request_scroll: ScrollState,
    response_scroll: ScrollState,
    size: TerminalSize,
    pending: PendingRequest,
    last_response: Option<Response>,
    last_error: Option<String>,
    request_lines: Vec<String>,
    response_lines: Vec<String>,
    dirty: Redraw,
}

impl ViewState {
    pub fn new(entries: Vec<ListEntry>, size: TerminalSize) -> Self {
        let mut state = Self {
            entries,
            selected: 0,
            active: Section::List,
            expanded: ExpandedPane::None,
            list_scroll: ScrollState::new(),
            request_scroll: ScrollState::new(),
            response_scroll: ScrollState::new(),
            size,
            pending: PendingRequest::Idle,
            last_response: None,
            last_error: None,
            request_lines: Vec::new(),
            response_lines: Vec::new(),
            dirty: Redraw::FULL | Redraw::ALL,
        };
        state.refresh_request_lines();
        state.refresh_response_lines();
        state
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn selected_request(&self) -> Option<&Request> {
        self.entries.get(self.selected).map(|entry| &entry.request)
    }

    pub fn active_section(&self) -> Section {
        self.active
    }

    pub fn expanded_pane(&self) -> ExpandedPane {
        self.expanded
    }

    pub fn terminal_size(&self) -> TerminalSize {
        self.size
    }

    pub fn pending(&self) -> PendingRequest {
        self.pending
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self.pending, PendingRequest::Awaiting { .. })
    }

    /// Current spinner glyph, if a request is in flight
    pub fn spinner(&self) -> Option<char> {
        match self.pending {
            PendingRequest::Awaiting { frame, .. } => {
                Some(SPINNER_FRAMES[frame % SPINNER_FRAMES.len()])
            }
            PendingRequest::Idle => None,
        }
    }

    pub fn last_response(&self) -> Option<&Response> {
        self.last_response.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn list_offset(&self) -> usize {
        self.list_scroll.offset()
    }

    pub fn request_offset(&self) -> usize {
        self.request_scroll.offset()
    }

    pub fn response_offset(&self) -> usize {
        self.response_scroll.offset()
    }

    pub fn request_lines(&self) -> &[String] {
        &self.request_lines
    }

    pub fn response_lines(&self) -> &[String] {
        &self.response_lines
    }

    pub fn layout(&self) -> Layout {
        Layout::compute(self.size)
    }

    pub fn list_rect(&self) -> Rect {
        self.layout().list
    }

    /// Request pane frame, full interior while expanded
    pub fn request_rect(&self) -> Rect {
        let layout = self.layout();
        match self.expanded {
            ExpandedPane::Request => layout.expanded,
            _ => layout.request,
        }
    }

    /// Response pane frame, full interior while expanded
    pub fn response_rect(&self) -> Rect {
        let layout = self.layout();
        match self.expanded {
            ExpandedPane::Response => layout.expanded,
            _ => layout.response,
        }
    }

    /// Labels currently inside the list viewport, with their indices
    pub fn visible_entries(&self) -> impl Iterator<Item = (usize, &ListEntry)> {
        let height = self.list_rect().viewport_height();
        let offset = self.list_scroll.offset();
        self.list_scroll
            .window(&self.entries, height)
            .iter()
            .enumerate()
            .map(move |(i, entry)| (offset + i, entry))
    }

    pub fn visible_request_lines(&self) -> &[String] {
        self.request_scroll
            .window(&self.request_lines, self.request_rect().viewport_height())
    }

    pub fn visible_response_lines(&self) -> &[String] {
        self.response_scroll
            .window(&self.response_lines, self.response_rect().viewport_height())
    }

    /// Regions changed since the last call
    pub fn take_redraw(&mut self) -> Redraw {
        std::mem::replace(&mut self.dirty, Redraw::empty())
    }

    pub fn needs_redraw(&self) -> bool {
        !self.dirty.is_empty()
    }

    /// Adopt a new terminal size. Returns false if nothing changed.
    pub fn resize(&mut self, size: TerminalSize) -> bool {
        if size == self.size {
            return false;
        }

        tracing::debug!("Terminal resized from {:?} to {:?}", self.size, size);
        self.size = size;
        self.list_scroll.reset();
        self.request_scroll.reset();
        self.response_scroll.reset();
        self.refresh_request_lines();
        self.refresh_response_lines();
        self.follow_selection();
        self.dirty |= Redraw::FULL | Redraw::ALL;
        true
    }

    /// Apply one message. Returns the request to dispatch when an
    /// `AwaitRequest` is accepted.
    pub fn apply(&mut self, message: Message) -> Option<Request> {
        match message {
            Message::MoveUp => self.move_vertically(false),
            Message::MoveDown => self.move_vertically(true),
            Message::MoveLeft => self.cycle_section(false),
            Message::MoveRight => self.cycle_section(true),
            Message::Expand => self.toggle_expand(),
            Message::AwaitRequest => return self.begin_request(),
            Message::ResponseReceived(response) => self.finish_request(Ok(*response)),
            Message::ResponseErrored(error) => self.finish_request(Err(error)),
            Message::Quit | Message::BackendFailed(_) => {
                tracing::debug!("Lifecycle message reached the view state, ignoring");
            }
        }
        None
    }

    /// Advance the busy animation. Returns false when idle.
    pub fn tick(&mut self) -> bool {
        match &mut self.pending {
            PendingRequest::Awaiting { frame, .. } => {
                *frame = (*frame + 1) % SPINNER_FRAMES.len();
                self.dirty |= Redraw::STATUS;
                true
            }
            PendingRequest::Idle => false,
        }
    }

    fn move_vertically(&mut self, down: bool) {
        match self.active {
            Section::List => self.move_selection(down),
            Section::RequestPane => {
                let len = self.request_lines.len();
                let viewport = self.request_rect().viewport_height();
                let result = if down {
                    self.request_scroll.scroll_down(len, viewport)
                } else {
                    self.request_scroll.scroll_up()
                };
                if result.changed() {
                    self.dirty |= Redraw::REQUEST;
                }
            }
            Section::ResponsePane => {
                let len = self.response_lines.len();
                let viewport = self.response_rect().viewport_height();
                let result = if down {
                    self.response_scroll.scroll_down(len, viewport)
                } else {
                    self.response_scroll.scroll_up()
                };
                if result.changed() {
                    self.dirty |= Redraw::RESPONSE;
                }
            }
        }
    }

    fn move_selection(&mut self, down: bool) {
        if self.entries.is_empty() {
            return;
        }

        let target = if down {
            (self.selected + 1).min(self.entries.len() - 1)
        } else {
            self.selected.saturating_sub(1)
        };
        if target == self.selected {
            return;
        }

        self.selected = target;
        self.last_response = None;
        self.last_error = None;
        self.request_scroll.reset();
        self.response_scroll.reset();
        self.refresh_request_lines();
        self.refresh_response_lines();
        self.follow_selection();
        self.dirty |= Redraw::PANES | Redraw::STATUS;
    }

    fn follow_selection(&mut self) {
        let viewport = self.list_rect().viewport_height();
        self.list_scroll
            .follow(self.selected, self.entries.len(), viewport);
    }

    fn cycle_section(&mut self, forward: bool) {
        if self.expanded != ExpandedPane::None {
            return;
        }
        self.active = if forward {
            self.active.next()
        } else {
            self.active.previous()
        };
        self.dirty |= Redraw::PANES;
    }

    fn toggle_expand(&mut self) {
        let target = match (self.expanded, self.active) {
            (ExpandedPane::None, Section::RequestPane) => ExpandedPane::Request,
            (ExpandedPane::None, Section::ResponsePane) => ExpandedPane::Response,
            (ExpandedPane::None, Section::List) => return,
            _ => ExpandedPane::None,
        };

        self.expanded = target;
        self.request_scroll.reset();
        self.response_scroll.reset();
        self.refresh_request_lines();
        self.refresh_response_lines();
        self.dirty |= Redraw::FULL | Redraw::ALL;
    }

    fn begin_request(&mut self) -> Option<Request> {
        if self.expanded != ExpandedPane::None {
            tracing::debug!("Ignoring send while a pane is expanded");
            return None;
        }
        if self.is_awaiting() {
            tracing::warn!("Ignoring send while a request is already in flight");
            return None;
        }

        let request = self.selected_request()?.clone();
        self.last_response = None;
        self.last_error = None;
        self.pending = PendingRequest::Awaiting {
            frame: 0,
            index: self.selected,
        };
        self.response_scroll.reset();
        self.refresh_response_lines();
        self.dirty |= Redraw::RESPONSE | Redraw::STATUS;
        Some(request)
    }

    fn finish_request(&mut self, outcome: Result<Response, String>) {
        let PendingRequest::Awaiting { index, .. } = self.pending else {
            tracing::warn!("Dropping dispatch result that arrived while idle");
            return;
        };

        self.pending = PendingRequest::Idle;
        self.dirty |= Redraw::STATUS;

        if index != self.selected {
            tracing::debug!("Selection moved from {index} while awaiting, discarding result");
            return;
        }

        match outcome {
            Ok(response) => self.last_response = Some(response),
            Err(error) => self.last_error = Some(error),
        }
        self.response_scroll.reset();
        self.refresh_response_lines();
        self.dirty |= Redraw::RESPONSE;
    }

    fn refresh_request_lines(&mut self) {
        let width = self.request_rect().viewport_width();
        self.request_lines = self
            .selected_request()
            .map(|request| wrap_text(&request.to_http_text(), width))
            .unwrap_or_default();
        let viewport = self.request_rect().viewport_height();
        self.request_scroll
            .clamp(self.request_lines.len(), viewport);
    }

    fn refresh_response_lines(&mut self) {
        let width = self.response_rect().viewport_width();
        self.response_lines = match (&self.last_response, &self.last_error) {
            (Some(response), _) => wrap_text(&response.to_display_text(), width),
            (None, Some(error)) => wrap_text(error, width),
            (None, None) => Vec::new(),
        };
        let viewport = self.response_rect().viewport_height();
        self.response_scroll
            .clamp(self.response_lines.len(), viewport);
    }
}
