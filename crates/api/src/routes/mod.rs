//! Route trees.
//!
//! ```text
//! /health                 service and database health
//! /                       person list
//! /add/                   create
//! /{id}/                  detail
//! /{id}/edit/             edit
//! /{id}/delete/           delete (GET confirms, POST deletes)
//! ```
//!
//! Uploaded photos under `/media` are mounted by
//! [`build_app_router`](crate::router::build_app_router).

pub mod health;
pub mod person;
