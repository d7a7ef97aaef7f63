//! Translation resolution from the locale directory.
//!
//! Resources live at `<locale_dir>/<code>/messages.properties`. Every call to
//! [`resolve`] reads and parses the file again; nothing is cached.

use std::path::{Path, PathBuf};

use cards_core::translation::{
    expand_dotted, normalize_language, parse_properties, TranslationBundle, DEFAULT_LANGUAGE,
};

/// File name of the resource inside each language directory.
pub const RESOURCE_FILE: &str = "messages.properties";

/// Why a translation resource could not be used. Always recovered from.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("translation resource not found: {}", path.display())]
    Missing { path: PathBuf },

    #[error("translation resource unreadable: {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Path of the resource for `code` under `locale_dir`.
pub fn resource_path(locale_dir: &Path, code: &str) -> PathBuf {
    locale_dir.join(code).join(RESOURCE_FILE)
}

/// Build the translation bundle for `language`.
///
/// Unsupported codes resolve as [`DEFAULT_LANGUAGE`]. A missing or unreadable
/// resource falls back to the default language's; if that fails too the
/// bundle is empty and callers use built-in labels.
pub async fn resolve(locale_dir: &Path, language: &str) -> TranslationBundle {
    let code = normalize_language(language);

    let text = match load(locale_dir, code).await {
        Ok(text) => text,
        Err(err) if code != DEFAULT_LANGUAGE => {
            tracing::warn!(
                language = code,
                fallback = DEFAULT_LANGUAGE,
                error = %err,
                "Translation resource unavailable, falling back"
            );
            match load(locale_dir, DEFAULT_LANGUAGE).await {
                Ok(text) => text,
                Err(err) => return empty_bundle(&err),
            }
        }
        Err(err) => return empty_bundle(&err),
    };

    let bundle = expand_dotted(parse_properties(&text));
    tracing::debug!(language = code, entries = bundle.len(), "Loaded translations");
    bundle
}

async fn load(locale_dir: &Path, code: &str) -> Result<String, ResourceError> {
    let path = resource_path(locale_dir, code);
    tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => ResourceError::Missing { path },
            _ => ResourceError::Unreadable { path, source },
        })
}

fn empty_bundle(err: &ResourceError) -> TranslationBundle {
    tracing::warn!(
        language = DEFAULT_LANGUAGE,
        error = %err,
        "Default translation resource unavailable, using built-in labels"
    );
    TranslationBundle::new()
}
