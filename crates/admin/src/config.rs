//! Admin configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `ADMIN_BASE_URL` - Public URL for the back office
//! - `ADMIN_GATE_PASSWORD` - Shared password checked by `POST /api/admin/login`
//! - `ADMIN_COOKIE_SECRET` - Key signing the `admin-auth` cookie (min 32 chars, high entropy)
//!
//! ## Optional
//! - `ADMIN_HOST` - Bind address (default: 127.0.0.1)
//! - `ADMIN_PORT` - Listen port (default: 3001)
//! - `ADMIN_UPLOAD_DIR` - Where uploaded images are written (default: uploads)
//! - `ADMIN_UPLOAD_URL_PREFIX` - URL prefix the storefront serves them under (default: /uploads)
//! - `ADMIN_MAX_UPLOAD_BYTES` - Request body limit for uploads (default: 10 MiB)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_COOKIE_SECRET_LENGTH: usize = 32;
const MIN_GATE_PASSWORD_LENGTH: usize = 8;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "secret",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Admin application configuration.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    /// `PostgreSQL` database connection URL (contains password)
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the back office
    pub base_url: String,
    /// Admin gate credentials
    pub gate: GateConfig,
    /// Image upload settings
    pub upload: UploadConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "staging", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// The shared password and the key that signs gate cookies.
///
/// Implements `Debug` manually to redact both values.
#[derive(Clone)]
pub struct GateConfig {
    pub password: SecretString,
    pub cookie_secret: SecretString,
}

impl std::fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateConfig")
            .field("password", &"[REDACTED]")
            .field("cookie_secret", &"[REDACTED]")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    /// Directory uploaded files are written to
    pub dir: PathBuf,
    /// Public URL prefix for files in `dir`
    pub url_prefix: String,
    /// Largest accepted upload request, in bytes
    pub max_bytes: usize,
}

impl AdminConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ADMIN_DATABASE_URL")?;
        let host = get_env_or_default("ADMIN_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("ADMIN_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ADMIN_PORT".to_string(), e.to_string()))?;
        let base_url = get_required_env("ADMIN_BASE_URL")?;

        let gate = GateConfig::from_env()?;
        let upload = UploadConfig::from_env()?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            gate,
            upload,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GateConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let password = get_required_secret("ADMIN_GATE_PASSWORD")?;
        validate_gate_password(&password, "ADMIN_GATE_PASSWORD")?;

        let cookie_secret = get_validated_secret("ADMIN_COOKIE_SECRET")?;
        validate_cookie_secret(&cookie_secret, "ADMIN_COOKIE_SECRET")?;

        Ok(Self {
            password,
            cookie_secret,
        })
    }
}

impl UploadConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let max_bytes = get_env_or_default(
            "ADMIN_MAX_UPLOAD_BYTES",
            &DEFAULT_MAX_UPLOAD_BYTES.to_string(),
        )
        .parse::<usize>()
        .map_err(|e| {
            ConfigError::InvalidEnvVar("ADMIN_MAX_UPLOAD_BYTES".to_string(), e.to_string())
        })?;

        Ok(Self {
            dir: PathBuf::from(get_env_or_default("ADMIN_UPLOAD_DIR", "uploads")),
            url_prefix: get_env_or_default("ADMIN_UPLOAD_URL_PREFIX", "/uploads")
                .trim_end_matches('/')
                .to_string(),
            max_bytes,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get a required environment variable as a secret.
fn get_required_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    Ok(SecretString::from(value))
}

/// Get database URL with fallback to generic `DATABASE_URL` (used by Fly.io postgres attach).
fn get_database_url(primary_key: &str) -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var(primary_key) {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar(primary_key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// The gate password is typed by people, so only its length is checked.
fn validate_gate_password(password: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let len = password.expose_secret().chars().count();
    if len < MIN_GATE_PASSWORD_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {MIN_GATE_PASSWORD_LENGTH} characters (got {len})"),
        ));
    }
    Ok(())
}

/// Validate that a cookie signing secret meets minimum length requirements.
fn validate_cookie_secret(secret: &SecretString, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < MIN_COOKIE_SECRET_LENGTH {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "must be at least {} characters (got {})",
                MIN_COOKIE_SECRET_LENGTH,
                value.len()
            ),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.len() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_bounds() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("kkkkkk") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy("Qz8#vL2!wR5@tY9$") > 3.3);
    }

    #[test]
    fn test_cookie_secret_rejects_placeholders() {
        let err = validate_secret_strength("changeme-admin-cookie", "ADMIN_COOKIE_SECRET").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
        assert!(validate_secret_strength("Qz8#vL2!wR5@tY9$mN4%pK7^hJ3&cX6", "ADMIN_COOKIE_SECRET").is_ok());
    }

    #[test]
    fn test_cookie_secret_rejects_low_entropy() {
        assert!(validate_secret_strength(&"ab".repeat(20), "ADMIN_COOKIE_SECRET").is_err());
    }

    #[test]
    fn test_cookie_secret_length() {
        assert!(validate_cookie_secret(&SecretString::from("short"), "X").is_err());
        assert!(validate_cookie_secret(&SecretString::from("k".repeat(32)), "X").is_ok());
    }

    #[test]
    fn test_gate_password_length_counts_characters() {
        assert!(validate_gate_password(&SecretString::from("Koftan1"), "X").is_err());
        assert!(validate_gate_password(&SecretString::from("Médina2025"), "X").is_ok());
    }

    #[test]
    fn test_gate_config_debug_redacts_secrets() {
        let gate = GateConfig {
            password: SecretString::from("Medina-Sousse-2025"),
            cookie_secret: SecretString::from("Qz8#vL2!wR5@tY9$mN4%pK7^hJ3&cX6"),
        };

        let debug_output = format!("{gate:?}");

        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("Medina-Sousse-2025"));
        assert!(!debug_output.contains("Qz8#"));
    }

    #[test]
    fn test_socket_addr() {
        let config = AdminConfig {
            database_url: SecretString::from("postgres://localhost/dar_koftan"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            gate: GateConfig {
                password: SecretString::from("Medina-Sousse-2025"),
                cookie_secret: SecretString::from("k".repeat(32)),
            },
            upload: UploadConfig {
                dir: PathBuf::from("uploads"),
                url_prefix: "/uploads".to_string(),
                max_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }
}
