//! Account request bodies.
//!
//! Every field is optional at the serde level; handlers turn a missing
//! field into a 400 with the message the client expects.

use serde::{Deserialize, Serialize};

use dar_koftan_core::{Email, UserId};

/// Reset links stay valid for one hour.
pub const RESET_TOKEN_TTL_MINUTES: i64 = 60;

/// Random bytes in a reset token, hex-encoded on the wire.
pub const RESET_TOKEN_BYTES: usize = 32;

pub(crate) fn filled(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_owned())
        .filter(|s| !s.is_empty())
}

/// Passwords are not trimmed; only emptiness counts as missing.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignupRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// `PUT /api/users/profile`. The password only changes when both
/// `currentPassword` and `newPassword` are given.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

impl ProfileUpdateRequest {
    /// The `(current, new)` pair when both were sent.
    #[must_use]
    pub fn password_change(&self) -> Option<(&str, &str)> {
        match (self.current_password.as_deref(), self.new_password.as_deref()) {
            (Some(current), Some(new)) if !current.is_empty() && !new.is_empty() => {
                Some((current, new))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyResetTokenRequest {
    pub token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub password: Option<String>,
}

/// `{message}` bodies.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupResponse {
    pub message: &'static str,
    pub user_id: UserId,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginUser {
    pub id: UserId,
    pub username: String,
    pub email: Email,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: LoginUser,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifyResetTokenResponse {
    pub message: &'static str,
    pub email: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_change_needs_both_fields() {
        let mut req = ProfileUpdateRequest {
            current_password: Some("old-password".to_owned()),
            ..Default::default()
        };
        assert!(req.password_change().is_none());

        req.new_password = Some(String::new());
        assert!(req.password_change().is_none());

        req.new_password = Some("new-password".to_owned());
        assert_eq!(req.password_change(), Some(("old-password", "new-password")));
    }

    #[test]
    fn test_filled_trims() {
        assert_eq!(filled(Some("  yasmine ".to_owned())).as_deref(), Some("yasmine"));
        assert_eq!(filled(Some("   ".to_owned())), None);
        assert_eq!(present(Some(" pass ".to_owned())).as_deref(), Some(" pass "));
    }
}
