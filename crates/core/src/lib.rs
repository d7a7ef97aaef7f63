//! Domain logic for person cards.
//!
//! Everything in this crate is pure: validation rules, translation-resource
//! parsing, pagination arithmetic. No database, no filesystem, no HTTP.

pub mod error;
pub mod pagination;
pub mod person;
pub mod translation;
pub mod types;
