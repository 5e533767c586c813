//! HTTP layer: application state, router, and the response envelope.

mod handlers;

use std::sync::Arc;

use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::auth::TokenService;
use crate::rbac::AccessDecisionEngine;
use crate::services::{
    AuditService, AuthService, OrganizationService, TaskService, UserService,
};
use crate::store::{AuditStore, OrgStore, TaskStore, UserStore};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub tasks: TaskService,
    pub users: UserService,
    pub organizations: OrganizationService,
    pub audit: AuditService,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Wire every service against one backing store.
    pub fn new<S>(store: Arc<S>, tokens: Arc<TokenService>) -> Self
    where
        S: OrgStore + UserStore + TaskStore + AuditStore + 'static,
    {
        let orgs: Arc<dyn OrgStore> = store.clone();
        let users: Arc<dyn UserStore> = store.clone();
        let tasks: Arc<dyn TaskStore> = store.clone();
        let audit: Arc<dyn AuditStore> = store;
        let engine = AccessDecisionEngine::new(orgs.clone());

        Self {
            auth: AuthService::new(users.clone(), orgs.clone(), audit.clone(), tokens.clone()),
            tasks: TaskService::new(tasks, audit.clone(), engine.clone()),
            users: UserService::new(users.clone(), orgs.clone(), audit.clone(), engine.clone()),
            organizations: OrganizationService::new(orgs, users, audit.clone(), engine.clone()),
            audit: AuditService::new(audit, engine),
            tokens,
        }
    }
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/auth/login", post(handlers::login))
        .route("/api/auth/register", post(handlers::register))
        .route("/api/tasks", get(handlers::list_tasks).post(handlers::create_task))
        .route(
            "/api/tasks/:id",
            get(handlers::get_task)
                .put(handlers::replace_task)
                .delete(handlers::delete_task),
        )
        .route("/api/users", post(handlers::create_user))
        .route("/api/organizations", post(handlers::create_organization))
        .route(
            "/api/organizations/:id/owner",
            post(handlers::create_organization_owner),
        )
        .route("/api/audit-log", get(handlers::audit_log))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// API response wrapper: `{ success, data?, message? }`.
#[derive(Debug, serde::Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: serde::Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }
}

impl ApiResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_omits_message() {
        let json = serde_json::to_string(&ApiResponse::success(42)).unwrap();
        assert_eq!(json, r#"{"success":true,"data":42}"#);
    }

    #[test]
    fn message_envelope_omits_data() {
        let json = serde_json::to_string(&ApiResponse::message("Task deleted")).unwrap();
        assert_eq!(json, r#"{"success":true,"message":"Task deleted"}"#);
    }
}
