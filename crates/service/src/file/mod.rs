//! File-backed handlers.

pub mod properties_handler;
