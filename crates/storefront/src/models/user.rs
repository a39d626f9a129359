//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use dar_koftan_core::{Email, UserId};

/// A storefront customer account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub is_subscribed: bool,
    pub fidelity_points: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `GET /api/users/me`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub id: UserId,
    pub username: String,
    pub email: Email,
    pub is_subscribed: bool,
    pub fidelity_points: i32,
}

impl From<User> for MeResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_subscribed: user.is_subscribed,
            fidelity_points: user.fidelity_points,
        }
    }
}

/// `GET /api/users/profile`: the `me` fields plus the signup date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub me: MeResponse,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        let created_at = user.created_at;
        Self {
            me: user.into(),
            created_at,
        }
    }
}
