//! Resource services. Each operation consults the decision engine
//! explicitly before touching a store, and writes to the audit trail after
//! a successful mutation.

pub mod audit;
pub mod auth;
pub mod organization;
pub mod seed;
pub mod task;
pub mod user;

pub use audit::AuditService;
pub use auth::{AuthResponse, AuthService, LoginRequest, RegisterRequest};
pub use organization::{CreateOwnerRequest, OrganizationService};
pub use seed::seed_demo_data;
pub use task::TaskService;
pub use user::{CreateUserRequest, UserService};
