//! Shared, lazily opened store handle.
//!
//! # Responsibility
//! - Open the configured store on first use and hand the same connection to
//!   every later caller.
//! - Close and reopen when a caller asks for a different location.
//!
//! # Invariants
//! - At most one open runs at a time; racing callers wait on the slot lock
//!   and then observe the already opened handle.
//! - Rows are never touched here; callers lock the connection per statement.

use super::{open_location, DbError, DbResult};
use crate::config::StoreLocation;
use log::info;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

pub type SharedConnection = Arc<Mutex<Connection>>;

struct OpenStore {
    location: StoreLocation,
    conn: SharedConnection,
}

/// Process-wide store handle, created once at bootstrap and shared by `Arc`.
#[derive(Default)]
pub struct SharedStore {
    slot: Mutex<Option<OpenStore>>,
}

impl SharedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the connection for `location`, opening it if needed.
    pub fn acquire(&self, location: &StoreLocation) -> DbResult<SharedConnection> {
        let mut slot = self.slot.lock().map_err(|_| DbError::Poisoned)?;

        if let Some(open) = slot.as_ref() {
            if &open.location == location {
                return Ok(Arc::clone(&open.conn));
            }
            info!(
                "event=db_reopen module=db status=start from={} to={}",
                open.location.describe(),
                location.describe()
            );
        }

        // Drop the previous handle before opening the new one.
        *slot = None;
        let conn = Arc::new(Mutex::new(open_location(location)?));
        *slot = Some(OpenStore {
            location: location.clone(),
            conn: Arc::clone(&conn),
        });
        Ok(conn)
    }

    /// Location of the currently open handle, if any.
    pub fn location(&self) -> Option<StoreLocation> {
        self.slot
            .lock()
            .ok()
            .and_then(|slot| slot.as_ref().map(|open| open.location.clone()))
    }

    /// Drops the open handle; the next `acquire` reopens.
    pub fn reset(&self) -> DbResult<()> {
        let mut slot = self.slot.lock().map_err(|_| DbError::Poisoned)?;
        if let Some(open) = slot.take() {
            info!(
                "event=db_close module=db status=ok location={}",
                open.location.describe()
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SharedStore;
    use crate::config::StoreLocation;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn racing_callers_share_one_handle() {
        let store = Arc::new(SharedStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.acquire(&StoreLocation::Memory).unwrap())
            })
            .collect();

        let conns: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        for conn in &conns[1..] {
            assert!(Arc::ptr_eq(&conns[0], conn));
        }
    }

    #[test]
    fn changing_location_reopens() {
        let dir = tempfile::tempdir().unwrap();
        let first = StoreLocation::File(dir.path().join("a.sqlite3"));
        let second = StoreLocation::File(dir.path().join("nested").join("b.sqlite3"));
        let store = SharedStore::new();

        let conn_a = store.acquire(&first).unwrap();
        let conn_b = store.acquire(&second).unwrap();
        assert!(!Arc::ptr_eq(&conn_a, &conn_b));
        assert_eq!(store.location(), Some(second.clone()));
        assert!(dir.path().join("nested").join("b.sqlite3").exists());

        let again = store.acquire(&second).unwrap();
        assert!(Arc::ptr_eq(&conn_b, &again));
    }

    #[test]
    fn reset_forces_reopen() {
        let store = SharedStore::new();
        let before = store.acquire(&StoreLocation::Memory).unwrap();
        store.reset().unwrap();
        assert_eq!(store.location(), None);

        let after = store.acquire(&StoreLocation::Memory).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
    }
}
