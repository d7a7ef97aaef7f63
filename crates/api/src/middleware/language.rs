//! Per-request language context.
//!
//! [`language_context`] runs in front of every route. A non-empty `?lang=`
//! query parameter is lower-cased and stored as the session language without
//! any validation; unsupported codes only collapse to the default when the
//! bundle is resolved. The effective language and its translation bundle are
//! attached to the request as a [`LanguageContext`], which handlers extract
//! like any other argument.

use std::sync::Arc;

use axum::extract::{FromRequestParts, Query, Request, State};
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use cards_core::translation::{normalize_language, TranslationBundle, DEFAULT_LANGUAGE};
use cards_db::repositories::LanguageSessionRepo;

use crate::error::{AppError, AppResult};
use crate::i18n;
use crate::state::AppState;

/// Name of the cookie carrying the session key.
pub const SESSION_COOKIE: &str = "sessionid";

/// Language and translations for the current request.
#[derive(Debug, Clone)]
pub struct LanguageContext {
    /// Language stored in the session, or the default. May be unsupported.
    pub language: String,
    /// Translations resolved for `language`.
    pub bundle: Arc<TranslationBundle>,
}

impl LanguageContext {
    pub fn new(language: impl Into<String>, bundle: TranslationBundle) -> Self {
        Self {
            language: language.into(),
            bundle: Arc::new(bundle),
        }
    }

    /// The supported code the bundle was actually resolved for.
    pub fn resolved_language(&self) -> &'static str {
        normalize_language(&self.language)
    }
}

impl<S: Send + Sync> FromRequestParts<S> for LanguageContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<LanguageContext>()
            .cloned()
            .ok_or_else(|| {
                AppError::InternalError("Language middleware is not installed".into())
            })
    }
}

/// The language selected by `?lang=`, lower-cased, if present and non-empty.
///
/// When `lang` is repeated the last non-empty value wins.
pub fn selected_language(request: &Request) -> Option<String> {
    let Query(params) = Query::<Vec<(String, String)>>::try_from_uri(request.uri()).ok()?;
    params
        .into_iter()
        .filter(|(name, _)| name == "lang")
        .map(|(_, value)| value.trim().to_lowercase())
        .filter(|value| !value.is_empty())
        .last()
}

/// Value of the session cookie, if the client sent one.
pub fn session_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn session_cookie(session_key: &str, max_age_secs: i64) -> AppResult<HeaderValue> {
    let cookie = format!(
        "{SESSION_COOKIE}={session_key}; Path=/; Max-Age={max_age_secs}; HttpOnly; SameSite=Lax"
    );
    HeaderValue::from_str(&cookie).map_err(|e| AppError::InternalError(e.to_string()))
}

/// Middleware: persist `?lang=` to the session and attach a [`LanguageContext`].
///
/// A client without a valid session gets a new one. The session cookie is
/// (re)issued whenever the language is switched.
pub async fn language_context(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let existing_key = session_key(request.headers());
    let mut issued_key = None;

    let stored = match selected_language(&request) {
        Some(lang) => {
            let updated = match &existing_key {
                Some(key) => LanguageSessionRepo::update_language(&state.pool, key, &lang).await?,
                None => None,
            };
            // A switch also renews the cookie so it expires with the session row.
            let session = match updated {
                Some(session) => session,
                None => LanguageSessionRepo::create(&state.pool, &lang).await?,
            };
            issued_key = Some(session.session_key);
            tracing::info!(language = %lang, "Session language changed");
            Some(lang)
        }
        None => match &existing_key {
            Some(key) => LanguageSessionRepo::find(&state.pool, key)
                .await?
                .map(|session| session.language),
            None => None,
        },
    };

    let language = stored.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    let bundle = i18n::resolve(&state.config.locale_dir, &language).await;
    tracing::debug!(language = %language, "Current language");

    request
        .extensions_mut()
        .insert(LanguageContext::new(language, bundle));

    let mut response = next.run(request).await;

    if let Some(key) = issued_key {
        let cookie = session_cookie(&key, state.config.session_max_age_secs())?;
        response.headers_mut().append(SET_COOKIE, cookie);
    }

    Ok(response)
}

#[cfg(test)]
mod tests {
    use axum::body::Body;

    use super::*;

    fn request(uri: &str) -> Request {
        axum::http::Request::builder()
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn lang_param_is_lowercased() {
        assert_eq!(selected_language(&request("/?lang=EN")), Some("en".into()));
    }

    #[test]
    fn unsupported_lang_is_kept_as_selected() {
        assert_eq!(selected_language(&request("/add/?lang=xx")), Some("xx".into()));
    }

    #[test]
    fn absent_or_empty_lang_selects_nothing() {
        assert_eq!(selected_language(&request("/")), None);
        assert_eq!(selected_language(&request("/?q=%D0%98%D0%B2%D0%B0%D0%BD")), None);
        assert_eq!(selected_language(&request("/?lang=")), None);
    }

    #[test]
    fn lang_param_alongside_others() {
        assert_eq!(
            selected_language(&request("/?q=a&page=2&lang=Ru")),
            Some("ru".into())
        );
    }

    #[test]
    fn repeated_lang_takes_the_last_value() {
        assert_eq!(selected_language(&request("/?lang=en&lang=en")), Some("en".into()));
        assert_eq!(selected_language(&request("/?lang=ru&lang=EN")), Some("en".into()));
        assert_eq!(selected_language(&request("/?lang=en&lang=")), Some("en".into()));
    }

    #[test]
    fn session_cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; sessionid=abc123; other=1"),
        );
        assert_eq!(session_key(&headers), Some("abc123".into()));
    }

    #[test]
    fn missing_or_empty_session_cookie() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_key(&headers), None);

        headers.insert(COOKIE, HeaderValue::from_static("sessionid="));
        assert_eq!(session_key(&headers), None);
    }

    #[test]
    fn session_cookie_attributes() {
        let value = session_cookie("abc", 60).unwrap();
        let text = value.to_str().unwrap();
        assert!(text.starts_with("sessionid=abc;"));
        assert!(text.contains("HttpOnly"));
        assert!(text.contains("SameSite=Lax"));
        assert!(text.contains("Max-Age=60"));
    }

    #[test]
    fn resolved_language_collapses_unsupported() {
        let ctx = LanguageContext::new("xx", TranslationBundle::new());
        assert_eq!(ctx.language, "xx");
        assert_eq!(ctx.resolved_language(), DEFAULT_LANGUAGE);
    }
}
