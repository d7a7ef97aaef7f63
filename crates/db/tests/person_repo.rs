//! Integration tests for the person and language-session repositories.
//!
//! Exercises the repository layer against a real database:
//! - Insert, fetch, update and delete
//! - Default ordering and the search filter
//! - Paging window and count
//! - Language session lifecycle

use assert_matches::assert_matches;
use cards_core::person::{PersonInput, ValidPerson};
use cards_db::models::person::PersonListQuery;
use cards_db::repositories::{LanguageSessionRepo, PersonRepo};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn valid(last: &str, first: &str) -> ValidPerson {
    PersonInput::new(last, first, "", "1990-01-01")
        .into_valid()
        .expect("fixture should be valid")
}

fn all(search: Option<&str>) -> PersonListQuery {
    PersonListQuery {
        search: search.map(str::to_string),
        limit: 100,
        offset: 0,
    }
}

fn last_names(people: &[cards_db::models::person::Person]) -> Vec<&str> {
    people.iter().map(|p| p.last_name.as_str()).collect()
}

// ---------------------------------------------------------------------------
// CRUD
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn create_and_find(pool: PgPool) {
    let input = PersonInput::new("Иванов", "Пётр", "Сергеевич", "1990-01-01")
        .into_valid()
        .unwrap()
        .with_photo(Some("persons/a.png".into()));
    let created = PersonRepo::create(&pool, &input).await.unwrap();

    assert!(created.id > 0);
    assert_eq!(created.patronymic, "Сергеевич");
    assert_eq!(created.photo.as_deref(), Some("persons/a.png"));
    assert_eq!(created.created_at, created.updated_at);

    let found = PersonRepo::find_by_id(&pool, created.id).await.unwrap();
    assert_matches!(found, Some(p) if p.last_name == "Иванов" && p.first_name == "Пётр");
}

#[sqlx::test(migrations = "./migrations")]
async fn find_missing_returns_none(pool: PgPool) {
    let found = PersonRepo::find_by_id(&pool, 999_999).await.unwrap();
    assert!(found.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn update_replaces_fields_and_refreshes_updated_at(pool: PgPool) {
    let created = PersonRepo::create(&pool, &valid("Иванов", "Пётр"))
        .await
        .unwrap();

    let updated = PersonRepo::update(&pool, created.id, &valid("Петров", "Иван"))
        .await
        .unwrap()
        .expect("row should exist");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.last_name, "Петров");
    assert_eq!(updated.first_name, "Иван");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at >= created.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_missing_returns_none(pool: PgPool) {
    let updated = PersonRepo::update(&pool, 999_999, &valid("Петров", "Иван"))
        .await
        .unwrap();
    assert!(updated.is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_removes_row(pool: PgPool) {
    let created = PersonRepo::create(&pool, &valid("Иванов", "Пётр"))
        .await
        .unwrap();

    assert!(PersonRepo::delete(&pool, created.id).await.unwrap());
    assert!(PersonRepo::find_by_id(&pool, created.id)
        .await
        .unwrap()
        .is_none());

    // Second delete finds nothing.
    assert!(!PersonRepo::delete(&pool, created.id).await.unwrap());
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn list_orders_by_last_then_first_name(pool: PgPool) {
    for (last, first) in [("Петров", "Иван"), ("Иванов", "Сергей"), ("Иванов", "Пётр")] {
        PersonRepo::create(&pool, &valid(last, first)).await.unwrap();
    }

    let people = PersonRepo::list(&pool, &all(None)).await.unwrap();
    let names: Vec<(&str, &str)> = people
        .iter()
        .map(|p| (p.last_name.as_str(), p.first_name.as_str()))
        .collect();
    assert_eq!(
        names,
        vec![("Иванов", "Пётр"), ("Иванов", "Сергей"), ("Петров", "Иван")]
    );
}

#[sqlx::test(migrations = "./migrations")]
async fn search_matches_last_or_first_name(pool: PgPool) {
    PersonRepo::create(&pool, &valid("Иванов", "Пётр")).await.unwrap();
    PersonRepo::create(&pool, &valid("Петров", "Иван")).await.unwrap();
    PersonRepo::create(&pool, &valid("Сидоров", "Олег")).await.unwrap();

    let people = PersonRepo::list(&pool, &all(Some("Иван"))).await.unwrap();
    assert_eq!(last_names(&people), vec!["Иванов", "Петров"]);

    let count = PersonRepo::count(&pool, Some("Иван")).await.unwrap();
    assert_eq!(count, 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn search_ignores_case(pool: PgPool) {
    PersonRepo::create(&pool, &valid("Иванов", "Пётр")).await.unwrap();
    PersonRepo::create(&pool, &valid("Петров", "Иван")).await.unwrap();
    PersonRepo::create(&pool, &valid("Сидоров", "Олег")).await.unwrap();

    for search in ["иван", "ИВАН"] {
        let people = PersonRepo::list(&pool, &all(Some(search))).await.unwrap();
        assert_eq!(last_names(&people), vec!["Иванов", "Петров"], "{search}");
        assert_eq!(PersonRepo::count(&pool, Some(search)).await.unwrap(), 2, "{search}");
    }
}

#[sqlx::test(migrations = "./migrations")]
async fn blank_search_returns_everything(pool: PgPool) {
    PersonRepo::create(&pool, &valid("Иванов", "Пётр")).await.unwrap();
    PersonRepo::create(&pool, &valid("Петров", "Иван")).await.unwrap();

    let people = PersonRepo::list(&pool, &all(Some("   "))).await.unwrap();
    assert_eq!(people.len(), 2);
    assert_eq!(PersonRepo::count(&pool, None).await.unwrap(), 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn search_wildcards_match_literally(pool: PgPool) {
    PersonRepo::create(&pool, &valid("Иванов", "Пётр")).await.unwrap();

    let people = PersonRepo::list(&pool, &all(Some("%"))).await.unwrap();
    assert!(people.is_empty());
}

#[sqlx::test(migrations = "./migrations")]
async fn list_respects_limit_and_offset(pool: PgPool) {
    for last in ["Агеев", "Белов", "Волков", "Громов"] {
        PersonRepo::create(&pool, &valid(last, "Иван")).await.unwrap();
    }

    let window = PersonListQuery {
        search: None,
        limit: 2,
        offset: 2,
    };
    let people = PersonRepo::list(&pool, &window).await.unwrap();
    assert_eq!(last_names(&people), vec!["Волков", "Громов"]);
    assert_eq!(PersonRepo::count(&pool, None).await.unwrap(), 4);
}

// ---------------------------------------------------------------------------
// Language sessions
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn language_session_lifecycle(pool: PgPool) {
    let session = LanguageSessionRepo::create(&pool, "en").await.unwrap();
    assert_eq!(session.language, "en");
    assert_eq!(session.session_key.len(), 32);

    let updated = LanguageSessionRepo::update_language(&pool, &session.session_key, "xx")
        .await
        .unwrap()
        .expect("session should exist");
    assert_eq!(updated.language, "xx");

    let found = LanguageSessionRepo::find(&pool, &session.session_key)
        .await
        .unwrap();
    assert_matches!(found, Some(s) if s.language == "xx");
}

#[sqlx::test(migrations = "./migrations")]
async fn unknown_session_key(pool: PgPool) {
    assert!(LanguageSessionRepo::find(&pool, "nope").await.unwrap().is_none());
    assert!(LanguageSessionRepo::update_language(&pool, "nope", "en")
        .await
        .unwrap()
        .is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn cleanup_keeps_fresh_sessions(pool: PgPool) {
    let session = LanguageSessionRepo::create(&pool, "ru").await.unwrap();
    // The updated_at trigger only fires on UPDATE, so a backdated insert stays stale.
    sqlx::query(
        "INSERT INTO language_sessions (session_key, language, updated_at)
         VALUES ('stale', 'ru', NOW() - INTERVAL '30 days')",
    )
    .execute(&pool)
    .await
    .unwrap();

    let removed = LanguageSessionRepo::cleanup_stale(&pool, 14).await.unwrap();
    assert_eq!(removed, 1);
    assert!(LanguageSessionRepo::find(&pool, &session.session_key)
        .await
        .unwrap()
        .is_some());
    assert!(LanguageSessionRepo::find(&pool, "stale")
        .await
        .unwrap()
        .is_none());
}
