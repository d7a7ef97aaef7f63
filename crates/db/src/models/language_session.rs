//! Per-browser language preference.

use cards_core::types::Timestamp;
use sqlx::FromRow;

/// A row from the `language_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct LanguageSession {
    pub session_key: String,
    /// Lower-cased code exactly as selected; validated only at resolution time.
    pub language: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
