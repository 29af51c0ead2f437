//! The cooperative single-threaded event loop shared by every mDNS actor.
//!
//! This crate owns nothing socket-related — the concrete transport is a boundary adapter driven
//! by the embedding application. What lives here is the timer-driven scheduler itself: a thin
//! wrapper around [`stakker::Stakker`], a colorized `log` sink, and a monotonic-to-wall-clock
//! helper.

mod rt;
pub mod logger;
pub mod time;

pub use rt::*;
