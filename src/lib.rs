//! # httui - Terminal Browser for `.http` Files
//!
//! Lists the requests defined in `.http` files, sends the selected one with a
//! single key and shows the response next to it.
//!
//! ```text
//! ┌─────────────┐   Message    ┌──────────────┐   apply()    ┌───────────┐
//! │ Input loop  │─────────────▶│ Update loop  │─────────────▶│ ViewState │
//! │  (thread)   │              │ (controller) │              └───────────┘
//! └─────────────┘              └──────────────┘                    │
//!                                 ▲        │ spawn                 ▼ render
//!                     Response /  │        ▼                ┌──────────────┐
//!                     error       │  ┌──────────┐           │   Renderer   │
//!                                 └──│ Dispatch │           └──────────────┘
//!                                    └──────────┘
//! ```

pub mod cmd_args;
pub mod config;
pub mod logging;
pub mod repl;

pub use repl::*;
