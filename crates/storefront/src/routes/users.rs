//! Account routes: signup, sessions, profile, orders and password reset.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};
use dar_koftan_core::OrderDetail;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::{AppError, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::extract::JsonBody;
use crate::middleware::{RequireAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::models::account::{
    ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, LoginResponse, LoginUser,
    MessageResponse, ProfileUpdateRequest, ResetPasswordRequest, SignupRequest, SignupResponse,
    SuccessResponse, VerifyResetTokenRequest, VerifyResetTokenResponse, filled, present,
};
use crate::models::user::{MeResponse, ProfileResponse};
use crate::services::AuthService;
use crate::services::email::{deliver_reset_link, reset_link};
use crate::state::AppState;

/// Same answer whether or not the account exists.
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account with that email exists, we have sent a password reset link";

/// Routes that create sessions or spend reset tokens. These sit behind the
/// auth rate limiter.
pub fn credential_router() -> Router<AppState> {
    Router::new()
        .route("/api/users/signup", post(signup))
        .route("/api/users/login", post(login))
        .route("/api/users/forgot-password", post(forgot_password))
        .route("/api/users/reset-password", post(reset_password))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/users/logout", post(logout))
        .route("/api/users/me", get(me))
        .route("/api/users/profile", get(profile).put(update_profile))
        .route("/api/users/change-password", put(change_password))
        .route("/api/users/orders", get(orders))
        .route("/api/users/verify-reset-token", post(verify_reset_token))
}

fn bad_request(message: &str) -> AppError {
    AppError::BadRequest(message.to_owned())
}

fn session_error(err: tower_sessions::session::Error) -> AppError {
    AppError::Internal(format!("Session error: {err}"))
}

#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), AppError> {
    let (Some(username), Some(email), Some(password)) = (
        filled(body.username),
        filled(body.email),
        present(body.password),
    ) else {
        return Err(bad_request("Username, email, and password are required"));
    };

    let user = AuthService::new(state.pool())
        .register(&username, &email, &password)
        .await?;

    tracing::info!(user_id = %user.id, "Account created");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully",
            user_id: user.id,
        }),
    ))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let (Some(email), Some(password)) = (filled(body.email), present(body.password)) else {
        return Err(bad_request("Email and password are required"));
    };

    let user = AuthService::new(state.pool()).login(&email, &password).await?;

    set_current_user(&session, &CurrentUser::from(&user))
        .await
        .map_err(session_error)?;
    set_sentry_user(&user.id, Some(user.email.as_str()));
    add_breadcrumb("auth", "Signed in", None);

    Ok(Json(LoginResponse {
        message: "Logged in successfully",
        user: LoginUser {
            id: user.id,
            username: user.username,
            email: user.email,
        },
    }))
}

#[instrument(skip_all)]
pub async fn logout(session: Session) -> Result<Json<MessageResponse>, AppError> {
    clear_current_user(&session).await.map_err(session_error)?;
    clear_sentry_user();

    Ok(Json(MessageResponse {
        message: "Logged out successfully",
    }))
}

#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn me(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<MeResponse>, AppError> {
    let user = AuthService::new(state.pool()).get_user(current.id).await?;
    Ok(Json(user.into()))
}

#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn profile(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = AuthService::new(state.pool()).get_user(current.id).await?;
    Ok(Json(user.into()))
}

/// Absent username or email keep their current values. The session is
/// refreshed so later requests see the new identity.
#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn update_profile(
    State(state): State<AppState>,
    session: Session,
    RequireAuth(current): RequireAuth,
    JsonBody(body): JsonBody<ProfileUpdateRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let auth = AuthService::new(state.pool());
    let existing = auth.get_user(current.id).await?;

    let username = filled(body.username.clone()).unwrap_or(existing.username);
    let email = filled(body.email.clone()).unwrap_or_else(|| existing.email.into_inner());

    let user = auth
        .update_profile(current.id, &username, &email, body.password_change())
        .await?;

    session
        .insert(crate::models::session_keys::CURRENT_USER, CurrentUser::from(&user))
        .await
        .map_err(session_error)?;

    Ok(Json(SuccessResponse { success: true }))
}

#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn change_password(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    JsonBody(body): JsonBody<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (Some(current_password), Some(new_password)) =
        (present(body.current_password), present(body.new_password))
    else {
        return Err(bad_request("Current password and new password are required"));
    };

    AuthService::new(state.pool())
        .change_password(current.id, &current_password, &new_password)
        .await?;

    tracing::info!("Password changed");
    Ok(Json(MessageResponse {
        message: "Password updated successfully",
    }))
}

/// The signed-in customer's orders, newest first.
#[instrument(skip_all, fields(user_id = %current.id))]
pub async fn orders(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Json<Vec<OrderDetail>>, AppError> {
    let orders = OrderRepository::new(state.pool()).for_user(current.id).await?;
    Ok(Json(orders))
}

/// Start a password reset. The answer never reveals whether the account exists.
#[instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = filled(body.email).ok_or_else(|| bad_request("Email is required"))?;

    if let Some((user, token)) = AuthService::new(state.pool())
        .start_password_reset(&email)
        .await?
    {
        let link = reset_link(&state.config().base_url, &token);
        deliver_reset_link(state.email(), user.email.as_str(), &user.username, &link).await?;
        tracing::info!(user_id = %user.id, "Password reset requested");
    }

    Ok(Json(MessageResponse {
        message: FORGOT_PASSWORD_MESSAGE,
    }))
}

#[instrument(skip_all)]
pub async fn verify_reset_token(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<VerifyResetTokenRequest>,
) -> Result<Json<VerifyResetTokenResponse>, AppError> {
    let token = filled(body.token).ok_or_else(|| bad_request("Token is required"))?;

    let email = AuthService::new(state.pool())
        .verify_reset_token(&token)
        .await?;

    Ok(Json(VerifyResetTokenResponse {
        message: "Token is valid",
        email,
    }))
}

#[instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let (Some(token), Some(password)) = (filled(body.token), present(body.password)) else {
        return Err(bad_request("Token and password are required"));
    };

    let user_id = AuthService::new(state.pool())
        .reset_password(&token, &password)
        .await?;

    tracing::info!(user_id = %user_id, "Password reset");
    Ok(Json(MessageResponse {
        message: "Password has been reset successfully",
    }))
}
