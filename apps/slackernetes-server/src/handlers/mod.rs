//! Envelope-type handlers for Socket Mode events.
//!
//! Each submodule handles a specific envelope type:
//! - [`events`]: Events API message events, routed to the command table

pub mod events;
