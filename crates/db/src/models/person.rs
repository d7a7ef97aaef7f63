//! Person card entity model.

use cards_core::person::display_name;
use cards_core::types::{DbId, Timestamp};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `persons` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Person {
    pub id: DbId,
    pub last_name: String,
    pub first_name: String,
    /// Empty string when not given.
    pub patronymic: String,
    pub birth_date: NaiveDate,
    /// Path relative to the media root, e.g. `persons/3f2a....png`.
    pub photo: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Person {
    pub fn display_name(&self) -> String {
        display_name(&self.last_name, &self.first_name)
    }
}

/// Optional case-insensitive search plus page window for list queries.
#[derive(Debug, Clone, Default)]
pub struct PersonListQuery {
    /// Substring matched against `last_name` OR `first_name`.
    pub search: Option<String>,
    pub limit: i64,
    pub offset: i64,
}
