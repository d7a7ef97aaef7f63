//! Request handlers.
//!
//! Handlers delegate persistence to the repositories in `cards_db` and map
//! errors via [`AppError`](crate::error::AppError).

pub mod person;
