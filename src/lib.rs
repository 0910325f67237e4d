use crate::openai::{real::maybe_create_chat_client, ChatClientTrait};
use anyhow::Result;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub mod analytics;
pub mod app;
pub mod cli;
pub mod dataset;
pub mod openai;
pub mod prompts;
pub mod summary;

pub mod test_utils;

/// Model used for summarization when none is configured.
pub const DEFAULT_SUMMARY_MODEL: &str = "llama3-8b-8192";

/// Process-wide state shared by the interactive session: the feedback
/// summary store and the chat client used for summarization.
pub struct AppState {
    pub feedback_db: Pool<SqliteConnectionManager>,
    pub chat_client: Option<Arc<dyn ChatClientTrait>>,
    pub summary_model: String,
    // Keeps the temp database alive for test states.
    #[allow(dead_code)]
    temp_feedback_path: Option<tempfile::NamedTempFile>,
}

impl AppState {
    pub fn new_for_testing() -> Self {
        Self::new_for_testing_with_chat_client(None)
    }

    // Create a new AppState for testing backed by a temp-file database
    pub fn new_for_testing_with_chat_client(
        chat_client: Option<Arc<dyn ChatClientTrait>>,
    ) -> Self {
        let temp_feedback_file = tempfile::NamedTempFile::new()
            .expect("Failed to create temporary feedback database file");

        let feedback_path = temp_feedback_file
            .path()
            .to_str()
            .expect("Failed to get feedback temp file path")
            .to_string();

        let feedback_manager = SqliteConnectionManager::file(&feedback_path);
        let feedback_pool =
            Pool::new(feedback_manager).expect("Failed to create feedback pool");

        let mut feedback_conn =
            feedback_pool.get().expect("Failed to get connection");
        init_feedback_db(&mut feedback_conn)
            .expect("Failed to initialize feedback db");

        Self {
            feedback_db: feedback_pool,
            chat_client,
            summary_model: DEFAULT_SUMMARY_MODEL.to_string(),
            // Store the temp file so it's cleaned up when AppState is dropped
            temp_feedback_path: Some(temp_feedback_file),
        }
    }
}

// Configuration used to build the AppState at startup
pub struct AppConfig {
    pub feedback_pool: Pool<SqliteConnectionManager>,
    pub groq_api_key: Option<String>,
    pub groq_api_base: Option<String>,
    pub summary_model: String,
}

pub fn create_app_state(config: AppConfig) -> Arc<AppState> {
    let chat_client = match maybe_create_chat_client(
        config.groq_api_key,
        config.groq_api_base,
    ) {
        Ok(client) => Some(client),
        Err(e) => {
            warn!("Failed to create chat client: {}", e);
            None
        }
    };

    Arc::new(AppState {
        feedback_db: config.feedback_pool,
        chat_client,
        summary_model: config.summary_model,
        temp_feedback_path: None,
    })
}

// Database initialization
#[instrument(skip(conn))]
pub fn init_feedback_db(conn: &mut Connection) -> Result<()> {
    info!("Initializing feedback database");
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS feedback (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            company_name TEXT,
            student_name TEXT,
            viit_mentor_name TEXT,
            feedback_data TEXT
        )",
        [],
    )?;

    Ok(())
}

#[cfg(test)]
mod db_tests {
    use super::init_feedback_db;
    use anyhow::Result;
    use rusqlite::{Connection, OptionalExtension};

    fn has_table(conn: &Connection, name: &str) -> Result<bool> {
        Ok(conn
            .query_row(
                "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [name],
                |_| Ok(()),
            )
            .optional()?
            .is_some())
    }

    #[test]
    fn init_creates_feedback_table() -> Result<()> {
        let mut conn = Connection::open_in_memory()?;

        init_feedback_db(&mut conn)?;

        assert!(has_table(&conn, "feedback")?);
        Ok(())
    }

    #[test]
    fn init_is_idempotent() -> Result<()> {
        let mut conn = Connection::open_in_memory()?;

        init_feedback_db(&mut conn)?;
        init_feedback_db(&mut conn)?;

        assert!(has_table(&conn, "feedback")?);
        Ok(())
    }
}

#[cfg(test)]
mod app_state_tests {
    use super::{create_app_state, AppConfig};
    use r2d2::Pool;
    use r2d2_sqlite::SqliteConnectionManager;
    use tempfile::NamedTempFile;

    fn temp_pool() -> (Pool<SqliteConnectionManager>, NamedTempFile) {
        let temp_file = NamedTempFile::new().expect("temp sqlite file");
        let manager = SqliteConnectionManager::file(
            temp_file.path().to_str().expect("temp path"),
        );
        let pool = Pool::new(manager).expect("pool");
        (pool, temp_file)
    }

    #[test]
    fn create_app_state_without_api_key_has_no_chat_client() {
        let (feedback_pool, _feedback_file) = temp_pool();

        let config = AppConfig {
            feedback_pool,
            groq_api_key: None,
            groq_api_base: None,
            summary_model: "test-model".to_string(),
        };

        let state = create_app_state(config);
        assert!(state.chat_client.is_none());
        assert_eq!(state.summary_model, "test-model");
    }

    #[test]
    fn create_app_state_with_api_key_builds_chat_client() {
        let (feedback_pool, _feedback_file) = temp_pool();

        let config = AppConfig {
            feedback_pool,
            groq_api_key: Some("test-key".to_string()),
            groq_api_base: None,
            summary_model: "test-model".to_string(),
        };

        let state = create_app_state(config);
        assert!(state.chat_client.is_some());
    }
}
