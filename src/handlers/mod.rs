//! IRC command handlers.
//!
//! This module contains the command registry and the handlers it points to:
//! `outbound` turns user commands into protocol lines, `inbound` applies
//! server lines to the client state.
//!
//! ## Zero-Copy Architecture
//!
//! Inbound handlers receive `MessageRef<'_>` which borrows directly from the
//! line read off the transport, avoiding allocations in the hot loop. Use
//! `msg.arg(n)` to access arguments as `&str` slices.

pub mod context;
pub mod inbound;
pub mod outbound;
pub mod registry;

pub use context::Context;
pub use registry::{
    CommandSpec, Handlers, InboundFn, JoinedFn, OutboundFn, SplitFn, COMMANDS, lookup,
    matching_prefix,
};
