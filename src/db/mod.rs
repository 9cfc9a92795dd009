//! SQLite persistence for completed attempts.

mod connection;
mod helpers;
mod migrations;
mod repositories;

pub use connection::Database;
