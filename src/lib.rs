//! # Taskboard
//!
//! Multi-tenant task management API with hierarchical RBAC.
//!
//! ## Architecture
//!
//! - **RBAC core**: role model, organization hierarchy resolver, and the
//!   access decision engine every operation consults explicitly
//! - **Services**: task, user, organization, audit, and auth operations,
//!   each writing to the append-only audit trail
//! - **Stores**: trait-abstracted persistence with a Postgres
//!   implementation
//! - **API**: Axum router with bearer-token extraction

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod observability;
pub mod rbac;
pub mod services;
pub mod store;

pub use error::{ErrorCode, Result, TaskboardError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::api::{build_router, ApiResponse, AppState};
    pub use crate::auth::{AuthUser, TokenService};
    pub use crate::error::{ErrorCode, Result, TaskboardError};
    pub use crate::models::{
        AuditEntry, AuditLogFilter, AuditPage, NewOrganization, NewTask, Organization,
        ReplaceTask, Task, TaskPriority, TaskStatus, User, UserDto,
    };
    pub use crate::rbac::{
        AccessContext, AccessDecision, AccessDecisionEngine, HierarchyResolver, Role,
        TaskListPredicate,
    };
    pub use crate::services::{
        AuditService, AuthService, OrganizationService, TaskService, UserService,
    };
    pub use crate::store::{postgres::Database, AuditStore, OrgStore, TaskStore, UserStore};
}
