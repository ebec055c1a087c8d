use std::env;
use std::net::IpAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Default Gemini model used when `GEMINI_MODEL` is unset.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";
/// Public Gemini REST endpoint.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Language the summary, keywords, and FAQs are written in by default.
pub const DEFAULT_SUMMARY_LANGUAGE: &str = "Thai";
/// HTML asset served on `GET /` by default.
pub const DEFAULT_FRONTEND_PATH: &str = "index.html";
/// Default request body cap (20 MiB) for uploads.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;
/// File the tracing file layer appends to by default.
pub const DEFAULT_LOG_FILE: &str = "logs/article-digest.log";
const DEFAULT_SERVER_PORT: u16 = 5000;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Article Digest server.
///
/// Built once at start-up and handed to the components that need it; nothing reads the
/// environment after this point.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key. `None` leaves the server running in degraded mode.
    pub gemini_api_key: Option<String>,
    /// Model identifier passed to `generateContent`.
    pub gemini_model: String,
    /// Base URL of the Gemini REST API.
    pub gemini_base_url: String,
    /// Language requested for the generated summary.
    pub summary_language: String,
    /// Path of the HTML page served on `/`.
    pub frontend_path: PathBuf,
    /// Address the HTTP listener binds to.
    pub server_host: IpAddr,
    /// Port the HTTP listener binds to.
    pub server_port: u16,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// File the server log is appended to, alongside stdout.
    pub log_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            gemini_api_key: load_env_optional("GEMINI_API_KEY"),
            gemini_model: load_env_optional("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            gemini_base_url: load_env_optional("GEMINI_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            summary_language: load_env_optional("SUMMARY_LANGUAGE")
                .unwrap_or_else(|| DEFAULT_SUMMARY_LANGUAGE.to_string()),
            frontend_path: load_env_optional("FRONTEND_HTML_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FRONTEND_PATH)),
            server_host: parse_env_optional("SERVER_HOST")?
                .unwrap_or(IpAddr::from([0, 0, 0, 0])),
            server_port: parse_env_optional("SERVER_PORT")?.unwrap_or(DEFAULT_SERVER_PORT),
            max_upload_bytes: parse_env_optional("MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            log_file: load_env_optional("ARTICLE_DIGEST_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        })
    }

    /// Whether a usable provider key was supplied.
    pub fn has_api_key(&self) -> bool {
        self.gemini_api_key.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            summary_language: DEFAULT_SUMMARY_LANGUAGE.to_string(),
            frontend_path: PathBuf::from(DEFAULT_FRONTEND_PATH),
            server_host: IpAddr::from([0, 0, 0, 0]),
            server_port: DEFAULT_SERVER_PORT,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_env_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Load `.env` (if present) and build the configuration from the process environment.
pub fn init_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    Config::from_env()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    const KEYS: [&str; 9] = [
        "GEMINI_API_KEY",
        "GEMINI_MODEL",
        "GEMINI_API_BASE_URL",
        "SUMMARY_LANGUAGE",
        "FRONTEND_HTML_PATH",
        "SERVER_HOST",
        "SERVER_PORT",
        "MAX_UPLOAD_BYTES",
        "ARTICLE_DIGEST_LOG_FILE",
    ];

    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], body: F) {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        // SAFETY: env mutation is serialized by ENV_LOCK within this test module.
        unsafe {
            for key in KEYS {
                env::remove_var(key);
            }
            for (key, value) in vars {
                env::set_var(key, value);
            }
        }
        body();
        unsafe {
            for key in KEYS {
                env::remove_var(key);
            }
        }
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        with_env(&[], || {
            let config = Config::from_env().expect("config");
            assert!(config.gemini_api_key.is_none());
            assert_eq!(config.gemini_model, DEFAULT_GEMINI_MODEL);
            assert_eq!(config.summary_language, "Thai");
            assert_eq!(config.server_port, 5000);
            assert_eq!(config.frontend_path, PathBuf::from("index.html"));
            assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
            assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        });
    }

    #[test]
    fn blank_log_file_falls_back_to_default() {
        with_env(&[("ARTICLE_DIGEST_LOG_FILE", "  ")], || {
            let config = Config::from_env().expect("config");
            assert_eq!(config.log_file, PathBuf::from(DEFAULT_LOG_FILE));
        });
    }

    #[test]
    fn log_file_override_is_used() {
        with_env(&[("ARTICLE_DIGEST_LOG_FILE", "/var/log/digest.log")], || {
            let config = Config::from_env().expect("config");
            assert_eq!(config.log_file, PathBuf::from("/var/log/digest.log"));
        });
    }

    #[test]
    fn blank_api_key_is_treated_as_missing() {
        with_env(&[("GEMINI_API_KEY", "   ")], || {
            let config = Config::from_env().expect("config");
            assert!(!config.has_api_key());
        });
    }

    #[test]
    fn overrides_are_read_from_environment() {
        with_env(
            &[
                ("GEMINI_API_KEY", "secret"),
                ("GEMINI_MODEL", "gemini-2.0-flash"),
                ("SERVER_HOST", "127.0.0.1"),
                ("SERVER_PORT", "8080"),
                ("SUMMARY_LANGUAGE", "English"),
            ],
            || {
                let config = Config::from_env().expect("config");
                assert_eq!(config.gemini_api_key.as_deref(), Some("secret"));
                assert_eq!(config.gemini_model, "gemini-2.0-flash");
                assert_eq!(config.server_host, IpAddr::from([127, 0, 0, 1]));
                assert_eq!(config.server_port, 8080);
                assert_eq!(config.summary_language, "English");
            },
        );
    }

    #[test]
    fn invalid_port_is_rejected() {
        with_env(&[("SERVER_PORT", "not-a-port")], || {
            let error = Config::from_env().expect_err("invalid port");
            assert!(matches!(error, ConfigError::InvalidValue(key) if key == "SERVER_PORT"));
        });
    }
}
