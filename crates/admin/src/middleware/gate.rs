//! The admin gate.
//!
//! One shared password unlocks the back office. A correct password earns an
//! `admin-auth` cookie holding `<issued_at>.<hex hmac-sha256(issued_at)>`,
//! keyed by `ADMIN_COOKIE_SECRET`. The cookie is readable by scripts
//! (not `HttpOnly`) and lasts 24 hours. Every admin API handler takes
//! [`RequireAdmin`], which answers 401 when the cookie is missing, forged
//! or expired. Failed attempts are not counted.

use axum::extract::FromRequestParts;
use axum::http::header::COOKIE;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};
use hmac::digest::InvalidLength;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, SameSite};

use crate::config::GateConfig;
use crate::error::AppError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Name of the gate cookie.
pub const GATE_COOKIE: &str = "admin-auth";

/// How long a gate cookie stays valid, in seconds.
pub const GATE_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Clock skew tolerated for tokens issued "in the future".
const MAX_CLOCK_SKEW_SECS: i64 = 60;

fn mac(secret: &SecretString) -> Result<HmacSha256, InvalidLength> {
    HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
}

/// Whether `submitted` equals the configured password.
///
/// Both sides are run through the HMAC so the comparison is constant time.
/// Case matters.
#[must_use]
pub fn check_password(gate: &GateConfig, submitted: &str) -> bool {
    let (Ok(mut expected), Ok(mut candidate)) = (mac(&gate.cookie_secret), mac(&gate.cookie_secret))
    else {
        return false;
    };
    expected.update(gate.password.expose_secret().as_bytes());
    let expected = expected.finalize().into_bytes();

    candidate.update(submitted.as_bytes());
    candidate.verify_slice(&expected).is_ok()
}

/// A gate token for a login at `now`.
///
/// # Errors
///
/// Returns `InvalidLength` if the HMAC rejects the key.
pub fn issue_token(secret: &SecretString, now: DateTime<Utc>) -> Result<String, InvalidLength> {
    let issued_at = now.timestamp().to_string();
    let mut signer = mac(secret)?;
    signer.update(issued_at.as_bytes());
    let signature = hex::encode(signer.finalize().into_bytes());
    Ok(format!("{issued_at}.{signature}"))
}

/// Whether `token` was signed with `secret` and is still within its lifetime.
#[must_use]
pub fn verify_token(secret: &SecretString, token: &str, now: DateTime<Utc>) -> bool {
    let Some((issued_at, signature)) = token.split_once('.') else {
        return false;
    };
    let Ok(issued) = issued_at.parse::<i64>() else {
        return false;
    };
    let age = now.timestamp() - issued;
    if age >= GATE_LIFETIME_SECS || age < -MAX_CLOCK_SKEW_SECS {
        return false;
    }
    let (Ok(signature), Ok(mut verifier)) = (hex::decode(signature), mac(secret)) else {
        return false;
    };

    verifier.update(issued_at.as_bytes());
    verifier.verify_slice(&signature).is_ok()
}

/// The `Set-Cookie` value for a fresh gate cookie.
#[must_use]
pub fn gate_cookie(token: String, secure: bool) -> String {
    Cookie::build((GATE_COOKIE, token))
        .path("/")
        .http_only(false)
        .secure(secure)
        .same_site(SameSite::Lax)
        .max_age(Duration::seconds(GATE_LIFETIME_SECS))
        .build()
        .to_string()
}

/// The `Set-Cookie` value that removes the gate cookie.
#[must_use]
pub fn cleared_gate_cookie() -> String {
    Cookie::build((GATE_COOKIE, ""))
        .path("/")
        .max_age(Duration::ZERO)
        .build()
        .to_string()
}

/// Value of the gate cookie in the request, if any.
fn token_from_parts(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == GATE_COOKIE)
        .map(|cookie| cookie.value().to_string())
}

/// Extractor that requires a valid gate cookie.
///
/// ```rust,ignore
/// async fn handler(_admin: RequireAdmin, State(state): State<AppState>) -> ... {}
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)
            .ok_or_else(|| AppError::Unauthorized("Admin login required".to_string()))?;

        if verify_token(&state.config().gate.cookie_secret, &token, Utc::now()) {
            Ok(Self)
        } else {
            tracing::debug!(path = %parts.uri.path(), "Rejected admin gate cookie");
            Err(AppError::Unauthorized("Admin login required".to_string()))
        }
    }
}
