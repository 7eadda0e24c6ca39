use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{debug, info, warn};

use crate::error::{Result, SeedError};

/// Opens a SQLite connection with foreign-key enforcement switched on.
pub fn open_connection(path: impl AsRef<Path>) -> Result<Connection> {
    let path = path.as_ref();
    let conn = Connection::open(path).map_err(|source| SeedError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    enable_foreign_keys(&conn)?;
    debug!(path = %path.display(), "opened sqlite connection");
    Ok(conn)
}

fn enable_foreign_keys(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    Ok(())
}

/// Owns a connection for the length of a unit of work.
///
/// Pending work is committed by [`ConnectionScope::commit`] (or by
/// [`ConnectionScope::run`] when its closure succeeds) and rolled back on
/// failure. If the scope is dropped without being closed, for instance while
/// a panic unwinds, any open transaction is rolled back and the handle is
/// released.
pub struct ConnectionScope {
    conn: Option<Connection>,
    path: PathBuf,
}

impl ConnectionScope {
    /// Open a scope over the database file at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = open_connection(&path)?;
        Ok(Self {
            conn: Some(conn),
            path,
        })
    }

    /// Open a scope over a private in-memory database
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| SeedError::Open {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        enable_foreign_keys(&conn)?;
        Ok(Self {
            conn: Some(conn),
            path: PathBuf::from(":memory:"),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn connection(&self) -> &Connection {
        // Only `close` and `drop` take the handle and both consume the scope.
        self.conn.as_ref().expect("connection scope used after close")
    }

    /// Commit the open transaction, if any. Autocommitted statements are
    /// already durable, so this is a no-op outside an explicit transaction.
    pub fn commit(&self) -> Result<()> {
        let conn = self.connection();
        if !conn.is_autocommit() {
            conn.execute_batch("COMMIT")?;
            debug!("committed pending work");
        }
        Ok(())
    }

    /// Roll back the open transaction, if any.
    pub fn rollback(&self) -> Result<()> {
        let conn = self.connection();
        if !conn.is_autocommit() {
            conn.execute_batch("ROLLBACK")?;
            debug!("rolled back pending work");
        }
        Ok(())
    }

    /// Close the underlying handle.
    pub fn close(mut self) -> Result<()> {
        match self.conn.take() {
            Some(conn) => {
                conn.close().map_err(|(_, e)| SeedError::Close(e))?;
                info!("Connection closed.");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Run `work` against the connection, then commit on `Ok` or roll back on
    /// `Err`, and close the handle in both cases.
    ///
    /// An error from `work` wins over a rollback or close failure; on success a
    /// commit failure is reported after the close has been attempted.
    pub fn run<T, F>(self, work: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let outcome = work(self.connection());
        match outcome {
            Ok(value) => {
                let committed = self.commit();
                let closed = self.close();
                committed?;
                closed?;
                Ok(value)
            }
            Err(err) => {
                warn!(error = %err, "unit of work failed, rolling back");
                if let Err(rollback_err) = self.rollback() {
                    warn!(error = %rollback_err, "rollback failed");
                }
                if let Err(close_err) = self.close() {
                    warn!(error = %close_err, "close after rollback failed");
                }
                Err(err)
            }
        }
    }
}

impl Drop for ConnectionScope {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            if !conn.is_autocommit() {
                if let Err(e) = conn.execute_batch("ROLLBACK") {
                    warn!(error = %e, "rollback on drop failed");
                }
            }
            drop(conn);
            info!("Connection closed.");
        }
    }
}

/// Opens a [`ConnectionScope`] on `path` and runs `work` inside it.
pub fn with_connection<T, F>(path: impl AsRef<Path>, work: F) -> Result<T>
where
    F: FnOnce(&Connection) -> Result<T>,
{
    ConnectionScope::open(path)?.run(work)
}
