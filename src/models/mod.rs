//! Domain models: organizations, users, tasks, and audit entries.

mod audit;
mod organization;
mod task;
mod user;

pub use audit::{AuditEntry, AuditLogFilter, AuditPage, NewAuditEntry};
pub use organization::{NewOrganization, Organization, OrgWithChildren};
pub use task::{NewTask, ReplaceTask, Task, TaskPriority, TaskStatus};
pub use user::{NewUser, User, UserDto};
