//! Abstract persistence collaborators.
//!
//! The authorization core and the resource services are written against
//! these traits; the Postgres-backed [`Database`](postgres::Database)
//! implements all of them, and the tests run against in-memory stores.

pub mod postgres;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    AuditEntry, AuditLogFilter, AuditPage, NewAuditEntry, NewOrganization, NewTask, NewUser,
    Organization, OrgWithChildren, ReplaceTask, Task, User,
};
use crate::rbac::TaskListPredicate;

/// Organization lookups used by the hierarchy resolver plus tenant
/// management.
#[async_trait]
pub trait OrgStore: Send + Sync {
    async fn get_org(&self, id: i64) -> Result<Option<Organization>>;

    /// The organization with its direct children. The hierarchy is capped
    /// at two levels, so there is never a grandchild to fetch.
    async fn get_org_with_children(&self, id: i64) -> Result<Option<OrgWithChildren>>;

    async fn insert_org(&self, new: NewOrganization) -> Result<Organization>;

    async fn count_orgs(&self) -> Result<i64>;
}

/// User lookups and creation.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>>;

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>>;

    async fn insert_user(&self, new: NewUser) -> Result<User>;

    async fn count_users(&self) -> Result<i64>;
}

/// Task CRUD plus the predicate-scoped list query.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, new: NewTask, created_by: i64, organization_id: i64)
        -> Result<Task>;

    async fn find_task(&self, id: i64) -> Result<Option<Task>>;

    /// List tasks scoped by the access predicate: organization membership
    /// in the reachable set, optionally restricted to the caller's own
    /// creations.
    async fn list_tasks(&self, predicate: &TaskListPredicate, caller_id: i64)
        -> Result<Vec<Task>>;

    /// Full replacement of a task's mutable fields. `organization_id` and
    /// `created_by` are never touched.
    async fn replace_task(&self, id: i64, replace: ReplaceTask) -> Result<Option<Task>>;

    /// Returns true if a row was deleted.
    async fn delete_task(&self, id: i64) -> Result<bool>;
}

/// Append-only audit trail with a filtered, paged query.
#[async_trait]
pub trait AuditStore: Send + Sync {
    async fn append_audit(&self, entry: NewAuditEntry) -> Result<AuditEntry>;

    async fn query_audit(&self, organization_id: i64, filter: &AuditLogFilter)
        -> Result<AuditPage>;
}
