use std::path::PathBuf;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Directory holding `<code>/messages.properties` translation resources.
    pub locale_dir: PathBuf,
    /// Directory uploaded photos are written under and served from.
    pub media_root: PathBuf,
    /// Largest accepted request body, photo included (default: 5 MiB).
    pub max_upload_bytes: usize,
    /// Language sessions idle for longer than this are purged at startup
    /// and the session cookie expires after it (default: `14`).
    pub session_max_age_days: i32,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default   |
    /// |------------------------|-----------|
    /// | `HOST`                 | `0.0.0.0` |
    /// | `PORT`                 | `3000`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`      |
    /// | `LOCALE_DIR`           | `locale`  |
    /// | `MEDIA_ROOT`           | `media`   |
    /// | `MAX_UPLOAD_BYTES`     | `5242880` |
    /// | `SESSION_MAX_AGE_DAYS` | `14`      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let locale_dir = std::env::var("LOCALE_DIR")
            .unwrap_or_else(|_| "locale".into())
            .into();

        let media_root = std::env::var("MEDIA_ROOT")
            .unwrap_or_else(|_| "media".into())
            .into();

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| "5242880".into())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        let session_max_age_days: i32 = std::env::var("SESSION_MAX_AGE_DAYS")
            .unwrap_or_else(|_| "14".into())
            .parse()
            .expect("SESSION_MAX_AGE_DAYS must be a valid i32");

        Self {
            host,
            port,
            request_timeout_secs,
            locale_dir,
            media_root,
            max_upload_bytes,
            session_max_age_days,
        }
    }

    /// Session cookie lifetime in seconds.
    pub fn session_max_age_secs(&self) -> i64 {
        i64::from(self.session_max_age_days) * 24 * 60 * 60
    }
}
