use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration, resolved once at startup from environment
/// variables with conventional on-disk fallbacks.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub media_dir: PathBuf,
    pub thumb_dir: PathBuf,
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
    pub schema_path: PathBuf,
    pub session_ttl_hours: i64,
    pub media_watch_interval_sec: u64,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String, // "json" or "pretty"
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const DEFAULT_WATCH_INTERVAL_SEC: u64 = 2;

/// Parse a numeric environment variable, silently falling back to the
/// default when unset or unparsable.
fn env_number<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Resolve a directory variable: the environment value wins when present;
/// otherwise the first existing candidate (`./<name>`, `../<name>`) is used.
/// When `create` is set and nothing exists yet, the primary candidate is
/// created.
fn choose_dir(env_name: &str, candidates: &[&str], create: bool) -> anyhow::Result<PathBuf> {
    if let Ok(value) = env::var(env_name) {
        if !value.is_empty() {
            let path = PathBuf::from(value);
            if create {
                fs::create_dir_all(&path)?;
            }
            return Ok(path);
        }
    }
    for candidate in candidates {
        let path = Path::new(candidate);
        if path.is_dir() {
            return Ok(path.to_path_buf());
        }
    }
    let primary = PathBuf::from(candidates[0]);
    if create {
        fs::create_dir_all(&primary)?;
    }
    Ok(primary)
}

/// Resolve a file variable the same way, without creating anything.
fn choose_file(env_name: &str, candidates: &[&str]) -> PathBuf {
    if let Ok(value) = env::var(env_name) {
        if !value.is_empty() {
            return PathBuf::from(value);
        }
    }
    for candidate in candidates {
        let path = Path::new(candidate);
        if path.is_file() {
            return path.to_path_buf();
        }
    }
    PathBuf::from(candidates[0])
}

impl Config {
    /// Load configuration from the environment. Fails fast on
    /// misconfigurations that make startup pointless: a missing static
    /// directory or schema file.
    pub fn load() -> anyhow::Result<Self> {
        let port = env_number("PORT", DEFAULT_PORT);
        let session_ttl_hours = env_number("SESSION_TTL_HOURS", DEFAULT_SESSION_TTL_HOURS);
        let session_ttl_hours = if session_ttl_hours <= 0 {
            DEFAULT_SESSION_TTL_HOURS
        } else {
            session_ttl_hours
        };
        let media_watch_interval_sec =
            env_number("MEDIA_WATCH_INTERVAL_SEC", DEFAULT_WATCH_INTERVAL_SEC).max(1);

        let static_dir = choose_dir("STATIC_DIR", &["./web/public", "../web/public"], false)?;
        if !static_dir.is_dir() {
            anyhow::bail!("static directory not found: {}", static_dir.display());
        }

        let media_dir = choose_dir("MEDIA_DIR", &["./media", "../media"], true)?;
        let thumb_dir = choose_dir("THUMB_DIR", &["./web/thumbnails", "../web/thumbnails"], true)?;
        let data_dir = choose_dir("DATA_DIR", &["./data", "../data"], true)?;

        let db_path = match env::var("DB_PATH") {
            Ok(value) if !value.is_empty() => PathBuf::from(value),
            _ => data_dir.join("app.db"),
        };

        let schema_path = choose_file("SCHEMA_PATH", &["./schema.sql", "../schema.sql"]);
        if !schema_path.is_file() {
            anyhow::bail!("schema file not found: {}", schema_path.display());
        }

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string()),
        };

        Ok(Self {
            port,
            media_dir,
            thumb_dir,
            data_dir,
            db_path,
            static_dir,
            schema_path,
            session_ttl_hours,
            media_watch_interval_sec,
            logging,
        })
    }

    /// Session lifetime in seconds, the unit the cookie and store use.
    #[must_use]
    pub const fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_hours * 3600
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_number_falls_back_on_garbage() {
        env::set_var("OTT_TEST_NUM", "not-a-number");
        let value: u16 = env_number("OTT_TEST_NUM", 3000);
        assert_eq!(value, 3000);
        env::remove_var("OTT_TEST_NUM");
    }

    #[test]
    fn env_number_parses_valid_values() {
        env::set_var("OTT_TEST_NUM2", "8080");
        let value: u16 = env_number("OTT_TEST_NUM2", 3000);
        assert_eq!(value, 8080);
        env::remove_var("OTT_TEST_NUM2");
    }

    #[test]
    fn ttl_converts_to_seconds() {
        let config = Config {
            port: 3000,
            media_dir: PathBuf::from("./media"),
            thumb_dir: PathBuf::from("./thumbs"),
            data_dir: PathBuf::from("./data"),
            db_path: PathBuf::from("./data/app.db"),
            static_dir: PathBuf::from("./web/public"),
            schema_path: PathBuf::from("./schema.sql"),
            session_ttl_hours: 24,
            media_watch_interval_sec: 2,
            logging: LoggingConfig::default(),
        };
        assert_eq!(config.session_ttl_seconds(), 86_400);
    }
}
