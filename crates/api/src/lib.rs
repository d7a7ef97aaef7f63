//! Person cards HTTP server library.
//!
//! Exposes the building blocks (config, state, error handling, language
//! middleware, routes) so integration tests and the binary entrypoint can
//! both access them.

pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod i18n;
pub mod media;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
