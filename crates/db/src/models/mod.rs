//! Row types mapped with `sqlx::FromRow`.

pub mod language_session;
pub mod person;
