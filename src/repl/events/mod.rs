//! # Events Module
//!
//! Messages driving the update loop and the key bindings that produce them.

pub mod keymap;
pub mod messages;

pub use keymap::{map_event, map_key, KEY_HELP};
pub use messages::{message_queue, Message, MessageReceiver, MessageSender};
