//! Step definitions, grouped by feature domain:
//! - `parser` - `.http` parsing and directory loading
//! - `navigation` - list selection, sections, scrolling and expand
//! - `dispatch` - sending requests and showing responses

pub mod dispatch;
pub mod navigation;
pub mod parser;
