//! Network module.
//!
//! Drives one server connection: framing, the select loop over server
//! lines, user input and the lag timer, and flushing queued lines.

mod event_loop;

pub use event_loop::drive;
