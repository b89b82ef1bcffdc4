use rusqlite::Connection;
use std::cell::RefCell;

use crate::errors::StateError;

pub const SCHEMA: &str = include_str!("../../sql/schema.sql");

// Thread-local connection slot, keyed by path so handles to different
// files on one thread don't trade connections.
thread_local! {
    static DB_CONN: RefCell<Option<(String, Connection)>> = const { RefCell::new(None) };
}

#[derive(Clone)]
pub struct Database {
    path: String,
}

impl Database {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Provides a mutable connection to the closure, opening (or
    /// reopening, if this thread last touched a different file) lazily.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, StateError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StateError>,
    {
        DB_CONN
            .try_with(|cell| {
                let mut slot = cell.borrow_mut();
                let reopen = match slot.as_ref() {
                    Some((path, _)) => path != &self.path,
                    None => true,
                };
                if reopen {
                    let conn = Connection::open(&self.path)
                        .map_err(|e| StateError::Db(format!("Open DB failed: {e}")))?;
                    *slot = Some((self.path.clone(), conn));
                }
                let (_, conn) = slot.as_mut().expect("connection slot just filled");
                f(conn)
            })
            .map_err(|e| StateError::Db(format!("Connection slot unavailable: {e}")))?
    }
}

/// Apply the embedded schema. Idempotent; call once at startup.
pub fn init_db(db: &Database) -> Result<(), StateError> {
    db.with_conn(|conn| {
        conn.execute_batch(SCHEMA)
            .map_err(|e| StateError::Db(format!("Failed to apply schema: {e}")))?;
        Ok(())
    })
}
