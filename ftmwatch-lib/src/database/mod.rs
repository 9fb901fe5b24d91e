//! Database abstraction layer; see [`handler`] for the table handlers.

pub mod handler;
pub mod schema;
