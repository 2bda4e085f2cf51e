use axum_test::TestServer;
use rusqlite::Connection;

use crate::{AppState, build_router};

/// A test server for the full router, backed by an in-memory database in UTC.
///
/// The returned [AppState] shares the server's database connection so tests
/// can set up and inspect rows directly.
pub(crate) fn get_test_server() -> (TestServer, AppState) {
    let connection = Connection::open_in_memory().expect("Could not open in-memory database");
    let state = AppState::new(connection, "UTC").expect("Could not create app state");

    let server = TestServer::new(build_router(state.clone()));

    (server, state)
}
