//! Shared helpers for the easy-config binaries.

pub mod utils;
