//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod language_session_repo;
pub mod person_repo;

pub use language_session_repo::LanguageSessionRepo;
pub use person_repo::PersonRepo;
