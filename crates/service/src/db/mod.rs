//! Database-backed handlers.

pub mod relational_handler;
