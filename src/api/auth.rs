use axum::{Json, extract::State};
use std::sync::Arc;
use tower_sessions::Session;

use super::validation::validate_credentials;
use super::{ApiError, ApiResponse, AppState, CredentialsRequest, LoginResponse};
use crate::constants::session::{IS_ADMIN_KEY, USER_ID_KEY};
use crate::domain::{Caller, UserId};
use crate::services::{Navigation, UserSummary};

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
/// Self-registration; the new account is never an administrator
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<UserSummary>>, ApiError> {
    let username = validate_credentials(&payload.username, &payload.password)?;

    let user = state
        .auth()
        .create_user(username, &payload.password, false)
        .await?;

    Ok(Json(ApiResponse::success(UserSummary::from(user))))
}

/// POST /auth/login
/// Authenticate with username and password and start a session
pub async fn login(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<LoginResponse>>, ApiError> {
    let username = validate_credentials(&payload.username, &payload.password)?;

    let user = state
        .auth()
        .authenticate(username, &payload.password)
        .await?;

    session
        .cycle_id()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(USER_ID_KEY, user.id)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;
    session
        .insert(IS_ADMIN_KEY, user.is_admin)
        .await
        .map_err(|e| ApiError::internal(format!("Failed to create session: {e}")))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(ApiResponse::success(LoginResponse {
        id: user.id,
        username: user.username,
        is_admin: user.is_admin,
    })))
}

/// POST /auth/logout
/// Invalidate the current session and point the client at the login page
pub async fn logout(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Navigation>>, ApiError> {
    let caller = session_caller(&session).await?;

    session
        .flush()
        .await
        .map_err(|e| ApiError::internal(format!("Failed to clear session: {e}")))?;

    Ok(Json(ApiResponse::success(state.accounts().logout(&caller))))
}

// ============================================================================
// Helpers
// ============================================================================

/// Build the caller identity from the session. A missing session is an
/// anonymous caller, not an error.
pub async fn session_caller(session: &Session) -> Result<Caller, ApiError> {
    let user_id = session
        .get::<UserId>(USER_ID_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?;

    let admin_hint = session
        .get::<bool>(IS_ADMIN_KEY)
        .await
        .map_err(|e| ApiError::internal(format!("Session error: {e}")))?
        .unwrap_or(false);

    if let Some(id) = user_id {
        tracing::Span::current().record("user_id", id.value());
    }

    Ok(Caller {
        user_id,
        admin_hint,
    })
}
