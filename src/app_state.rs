//! Shared application state: the database location plus the session
//! registry. Wrapped in `Arc` at startup so every request handler and the
//! auth middleware see the same instance.

use std::path::PathBuf;
use std::sync::{RwLock, RwLockWriteGuard};

use uuid::Uuid;

use crate::auth::session::{Role, SessionRegistry};
use crate::db::{self, DatabaseError};

pub struct AppState {
    /// Path of the service database. Every handler opens its own
    /// connection; SQLite serializes the writers.
    db_path: PathBuf,
    /// Live login sessions. `RwLock` because validation far outnumbers
    /// issuance, but both mutate (expired tokens are dropped on sight), so
    /// all access goes through the write lock helper.
    sessions: RwLock<SessionRegistry>,
}

impl AppState {
    pub fn new(db_path: PathBuf) -> Self {
        Self {
            db_path,
            sessions: RwLock::new(SessionRegistry::new()),
        }
    }

    /// Open a database connection, running any pending migrations.
    pub fn open_db(&self) -> Result<rusqlite::Connection, StateError> {
        db::open_database(&self.db_path).map_err(StateError::Database)
    }

    /// Issue a session token for a logged-in user.
    pub fn issue_session(&self, user_id: Uuid, role: Role) -> Result<String, StateError> {
        Ok(self.write_sessions()?.issue(user_id, role))
    }

    /// Validate a presented bearer token.
    pub fn validate_session(&self, token: &str) -> Result<Option<(Uuid, Role)>, StateError> {
        Ok(self.write_sessions()?.validate(token))
    }

    /// Drop every session belonging to a deleted account.
    pub fn revoke_sessions(&self, user_id: &Uuid) -> Result<(), StateError> {
        self.write_sessions()?.revoke_user(user_id);
        Ok(())
    }

    fn write_sessions(&self) -> Result<RwLockWriteGuard<'_, SessionRegistry>, StateError> {
        self.sessions.write().map_err(|_| StateError::LockPoisoned)
    }
}

/// Errors from AppState operations.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Internal lock error")]
    LockPoisoned,
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
