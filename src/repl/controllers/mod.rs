//! # Controllers Module
//!
//! The update loop and the input thread feeding it.

pub mod app_controller;
pub mod input_loop;

pub use app_controller::{AppController, LoopTiming, Step};
pub use input_loop::InputLoop;
