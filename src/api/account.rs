//! Account page and admin panel endpoints.
//!
//! Authorization lives in [`crate::services::AccountController`]; these
//! handlers only translate between the session, JSON and the controller.

use axum::{
    Json,
    extract::{Path, State},
};
use std::sync::Arc;
use tower_sessions::Session;

use super::auth::session_caller;
use super::validation::validate_user_id;
use super::{ApiError, ApiResponse, AppState, CredentialsRequest};
use crate::services::{
    AccountAction, AccountView, ActionOutcome, CreateUserOutcome, UserSummary,
};

/// GET /account
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<AccountView>>, ApiError> {
    let caller = session_caller(&session).await?;
    let view = state.accounts().view(&caller).await?;
    Ok(Json(ApiResponse::success(view)))
}

/// GET /account/users
/// Empty for anyone but an administrator
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    session: Session,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let caller = session_caller(&session).await?;
    let users = state.accounts().refresh_user_list(&caller).await?;
    Ok(Json(ApiResponse::success(users)))
}

/// POST /account/users
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(payload): Json<CredentialsRequest>,
) -> Result<Json<ApiResponse<CreateUserOutcome>>, ApiError> {
    let caller = session_caller(&session).await?;
    let outcome = state
        .accounts()
        .create_user_action(&caller, &payload.username, &payload.password)
        .await?;
    Ok(Json(ApiResponse::success(outcome)))
}

/// POST /account/users/{id}/block
pub async fn toggle_block(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let target_id = validate_user_id(id)?;
    let caller = session_caller(&session).await?;
    let users = state
        .accounts()
        .toggle_block_action(&caller, target_id)
        .await?;
    Ok(Json(ApiResponse::success(users)))
}

/// DELETE /account/users/{id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    session: Session,
    Path(id): Path<i32>,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    let target_id = validate_user_id(id)?;
    let caller = session_caller(&session).await?;
    let users = state
        .accounts()
        .delete_user_action(&caller, target_id)
        .await?;
    Ok(Json(ApiResponse::success(users)))
}

/// POST /account/actions
/// Typed action payload, e.g. `{"action": "block", "target_id": 3}`
pub async fn dispatch(
    State(state): State<Arc<AppState>>,
    session: Session,
    Json(action): Json<AccountAction>,
) -> Result<Json<ApiResponse<ActionOutcome>>, ApiError> {
    let caller = session_caller(&session).await?;

    if action == AccountAction::Logout {
        session
            .flush()
            .await
            .map_err(|e| ApiError::internal(format!("Failed to clear session: {e}")))?;
    }

    let outcome = state.accounts().dispatch(&caller, action).await?;
    Ok(Json(ApiResponse::success(outcome)))
}
