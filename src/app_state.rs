//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use rusqlite::Connection;

use crate::{
    Error,
    db::initialize,
    recurring::{RecurringMaterializationJob, SQLiteMaterializationJob},
    stores::{SQLiteRecurrenceStore, SQLiteTransactionStore},
    timezone::LocalTimezone,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The local timezone as a canonical timezone name, e.g. "Europe/Paris".
    pub local_timezone: String,

    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The recurring expense job, shared by the scheduler and the manual trigger.
    pub job: Arc<SQLiteMaterializationJob>,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Europe/Paris".
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or `local_timezone`
    /// is not a known timezone.
    pub fn new(db_connection: Connection, local_timezone: &str) -> Result<Self, Error> {
        initialize(&db_connection)?;
        let timezone = LocalTimezone::from_name(local_timezone)?;

        let connection = Arc::new(Mutex::new(db_connection));
        let job = RecurringMaterializationJob::new(
            SQLiteRecurrenceStore::new(connection.clone()),
            SQLiteTransactionStore::new(connection.clone()),
            timezone,
        );

        Ok(Self {
            local_timezone: local_timezone.to_owned(),
            db_connection: connection,
            job: Arc::new(job),
        })
    }
}
