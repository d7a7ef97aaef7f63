//! Request middleware.
//!
//! - [`language::language_context`] -- Applies `?lang=` to the session and
//!   attaches a [`language::LanguageContext`] to every request.

pub mod language;
