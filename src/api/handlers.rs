//! Request handlers.
//!
//! All handlers return `Result<impl IntoResponse, TaskboardError>`; errors
//! convert to status codes and the error envelope via `IntoResponse`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use super::{ApiResponse, AppState};
use crate::auth::AuthUser;
use crate::error::TaskboardError;
use crate::models::{AuditLogFilter, NewOrganization, NewTask, ReplaceTask};
use crate::services::{CreateOwnerRequest, CreateUserRequest, LoginRequest, RegisterRequest};

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, TaskboardError> {
    let response = state.auth.login(req).await?;
    Ok(Json(ApiResponse::success(response)))
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, TaskboardError> {
    let response = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(response))))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, TaskboardError> {
    let tasks = state.tasks.list(&user.context).await?;
    Ok(Json(ApiResponse::success(tasks)))
}

pub async fn create_task(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<NewTask>,
) -> Result<impl IntoResponse, TaskboardError> {
    let task = state.tasks.create(&user.context, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(task))))
}

pub async fn get_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, TaskboardError> {
    let task = state.tasks.find_one(&user.context, id).await?;
    Ok(Json(ApiResponse::success(task)))
}

pub async fn replace_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<ReplaceTask>,
) -> Result<impl IntoResponse, TaskboardError> {
    let task = state.tasks.replace(&user.context, id, req).await?;
    Ok(Json(ApiResponse::success(task)))
}

pub async fn delete_task(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, TaskboardError> {
    state.tasks.remove(&user.context, id).await?;
    Ok(Json(ApiResponse::message("Task deleted")))
}

pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, TaskboardError> {
    let created = state.users.create(&user.context, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(created))))
}

pub async fn create_organization(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<NewOrganization>,
) -> Result<impl IntoResponse, TaskboardError> {
    let org = state.organizations.create(&user.context, req).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(org))))
}

pub async fn create_organization_owner(
    State(state): State<AppState>,
    user: AuthUser,
    Path(org_id): Path<i64>,
    Json(req): Json<CreateOwnerRequest>,
) -> Result<impl IntoResponse, TaskboardError> {
    let owner = state
        .organizations
        .create_owner(&user.context, org_id, req)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(owner))))
}

pub async fn audit_log(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filter): Query<AuditLogFilter>,
) -> Result<impl IntoResponse, TaskboardError> {
    let page = state.audit.query(&user.context, filter).await?;
    Ok(Json(ApiResponse::success(page)))
}
