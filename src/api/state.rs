use std::sync::{Arc, Mutex};

use actix_web::web;
use rusqlite::Connection;

use crate::config::Settings;
use crate::db::schema;
use crate::error::{KithError, KithResult};
use crate::integrations::instagram::InstagramConfig;

/// Shared by every worker. SQLite access is serialized through one
/// connection and always runs on the blocking pool.
#[derive(Clone)]
pub struct AppState {
    db: Arc<Mutex<Connection>>,
    pub gravatar_check: bool,
    pub instagram: Option<InstagramConfig>,
}

impl AppState {
    pub fn new(conn: Connection, settings: &Settings) -> Self {
        Self {
            db: Arc::new(Mutex::new(conn)),
            gravatar_check: settings.gravatar_check,
            instagram: settings.instagram(),
        }
    }

    /// Fresh in-memory database with default settings.
    pub fn in_memory() -> KithResult<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self::new(conn, &Settings::default()))
    }

    pub async fn with_conn<T, F>(&self, f: F) -> KithResult<T>
    where
        F: FnOnce(&Connection) -> KithResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let db = Arc::clone(&self.db);
        web::block(move || {
            let conn = db
                .lock()
                .map_err(|_| KithError::Other("database lock poisoned".into()))?;
            f(&conn)
        })
        .await?
    }

    /// Runs blocking work that does not touch the database, such as outbound HTTP.
    pub async fn blocking<T, F>(&self, f: F) -> KithResult<T>
    where
        F: FnOnce() -> KithResult<T> + Send + 'static,
        T: Send + 'static,
    {
        web::block(f).await?
    }
}
