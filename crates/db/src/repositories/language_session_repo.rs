//! Repository for the `language_sessions` table.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::language_session::LanguageSession;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "session_key, language, created_at, updated_at";

/// Stores the selected UI language per browser session.
pub struct LanguageSessionRepo;

impl LanguageSessionRepo {
    /// Start a new session holding `language`. The key is a random UUID.
    pub async fn create(pool: &PgPool, language: &str) -> Result<LanguageSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO language_sessions (session_key, language)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LanguageSession>(&query)
            .bind(Uuid::new_v4().simple().to_string())
            .bind(language)
            .fetch_one(pool)
            .await
    }

    /// Find a session by key.
    pub async fn find(
        pool: &PgPool,
        session_key: &str,
    ) -> Result<Option<LanguageSession>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM language_sessions WHERE session_key = $1");
        sqlx::query_as::<_, LanguageSession>(&query)
            .bind(session_key)
            .fetch_optional(pool)
            .await
    }

    /// Change the language of an existing session.
    ///
    /// Returns `None` if the key is unknown (never issued, or cleaned up).
    pub async fn update_language(
        pool: &PgPool,
        session_key: &str,
        language: &str,
    ) -> Result<Option<LanguageSession>, sqlx::Error> {
        let query = format!(
            "UPDATE language_sessions SET language = $2
             WHERE session_key = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, LanguageSession>(&query)
            .bind(session_key)
            .bind(language)
            .fetch_optional(pool)
            .await
    }

    /// Delete sessions untouched for more than `max_age_days`. Returns the count removed.
    pub async fn cleanup_stale(pool: &PgPool, max_age_days: i32) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM language_sessions
             WHERE updated_at < NOW() - make_interval(days => $1)",
        )
        .bind(max_age_days)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
