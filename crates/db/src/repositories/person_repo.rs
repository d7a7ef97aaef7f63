//! Repository for the `persons` table.

use cards_core::person::ValidPerson;
use cards_core::types::DbId;
use sqlx::PgPool;

use crate::models::person::{Person, PersonListQuery};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, last_name, first_name, patronymic, birth_date, photo, created_at, updated_at";

/// Search filter shared by the list and count queries. `$1` is a `LIKE`
/// pattern or `NULL` for no filter.
const SEARCH_FILTER: &str = "($1::text IS NULL OR last_name ILIKE $1 OR first_name ILIKE $1)";

/// Provides CRUD operations for person cards.
pub struct PersonRepo;

impl PersonRepo {
    /// Insert a new person, returning the created row.
    pub async fn create(pool: &PgPool, input: &ValidPerson) -> Result<Person, sqlx::Error> {
        let query = format!(
            "INSERT INTO persons (last_name, first_name, patronymic, birth_date, photo)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Person>(&query)
            .bind(input.last_name())
            .bind(input.first_name())
            .bind(input.patronymic())
            .bind(input.birth_date())
            .bind(input.photo())
            .fetch_one(pool)
            .await
    }

    /// Find a person by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Person>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM persons WHERE id = $1");
        sqlx::query_as::<_, Person>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one page of persons ordered by `(last_name, first_name)`.
    ///
    /// When `search` is set, only rows whose last or first name contains it
    /// (case-insensitively) are returned.
    pub async fn list(pool: &PgPool, params: &PersonListQuery) -> Result<Vec<Person>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM persons
             WHERE {SEARCH_FILTER}
             ORDER BY last_name ASC, first_name ASC, id ASC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Person>(&query)
            .bind(params.search.as_deref().and_then(like_pattern))
            .bind(params.limit)
            .bind(params.offset)
            .fetch_all(pool)
            .await
    }

    /// Count persons matching the same filter as [`PersonRepo::list`].
    pub async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM persons WHERE {SEARCH_FILTER}");
        sqlx::query_scalar::<_, i64>(&query)
            .bind(search.and_then(like_pattern))
            .fetch_one(pool)
            .await
    }

    /// Replace every editable field of a person.
    ///
    /// `updated_at` is refreshed by trigger. Returns `None` if no row with the
    /// given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &ValidPerson,
    ) -> Result<Option<Person>, sqlx::Error> {
        let query = format!(
            "UPDATE persons SET
                last_name = $2,
                first_name = $3,
                patronymic = $4,
                birth_date = $5,
                photo = $6
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Person>(&query)
            .bind(id)
            .bind(input.last_name())
            .bind(input.first_name())
            .bind(input.patronymic())
            .bind(input.birth_date())
            .bind(input.photo())
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a person. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM persons WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Build an `ILIKE` substring pattern from a user search term.
///
/// Returns `None` for a blank term. `%`, `_` and `\` are escaped so they
/// match literally.
pub fn like_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    Some(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_term_is_no_filter() {
        assert_eq!(like_pattern(""), None);
        assert_eq!(like_pattern("   "), None);
    }

    #[test]
    fn term_is_wrapped_and_trimmed() {
        assert_eq!(like_pattern(" Иван "), Some("%Иван%".to_string()));
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(like_pattern("50%_"), Some(r"%50\%\_%".to_string()));
        assert_eq!(like_pattern(r"a\b"), Some(r"%a\\b%".to_string()));
    }
}
