#![allow(missing_docs)]

pub(crate) mod fakes;
pub(crate) mod http;

use rusqlite::Connection;

use crate::db::initialize;

pub(crate) use fakes::{InMemoryRecurrenceStore, InMemoryTransactionStore};
pub(crate) use http::get_test_server;

/// Open an in-memory database with all tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    initialize(&connection).expect("Could not initialize database");
    connection
}
