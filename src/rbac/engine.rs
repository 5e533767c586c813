//! The access decision engine: the single authority consulted before every
//! resource read or write.
//!
//! Decisions are stateless and re-evaluated per call from an
//! [`AccessContext`] plus action metadata. Role checks always run before
//! organization lookups, so a caller who fails the role check never learns
//! whether an organization exists. Absent or unrecognized roles resolve to
//! deny, never to an error.

use std::collections::HashSet;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use super::hierarchy::HierarchyResolver;
use super::role::Role;
use crate::error::Result;
use crate::models::Task;
use crate::store::OrgStore;

/// The caller's identity for one request, derived from a verified token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessContext {
    pub user_id: i64,
    /// `None` when the token carried no recognizable role; every decision
    /// treats that as "no permissions".
    pub role: Option<Role>,
    pub organization_id: i64,
}

impl AccessContext {
    pub fn new(user_id: i64, role: Option<Role>, organization_id: i64) -> Self {
        Self {
            user_id,
            role,
            organization_id,
        }
    }

    fn role_at_least(&self, threshold: Role) -> bool {
        self.role.is_some_and(|r| r.at_least(threshold))
    }
}

/// Outcome of a user-creation decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessDecision {
    Allow,
    Deny(String),
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow)
    }

    fn deny(reason: &str) -> Self {
        Self::Deny(reason.to_string())
    }
}

/// Scoping predicate for task list queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskListPredicate {
    /// Organizations whose tasks the caller may see.
    pub org_ids: HashSet<i64>,
    /// When true (Viewer), only tasks the caller created are visible.
    pub restrict_to_creator: bool,
}

/// Evaluates allow/deny for every resource operation.
///
/// Holds only the hierarchy resolver; each decision is a pure function of
/// the context and freshly fetched hierarchy facts.
#[derive(Clone)]
pub struct AccessDecisionEngine {
    hierarchy: HierarchyResolver,
}

impl AccessDecisionEngine {
    pub fn new(orgs: Arc<dyn OrgStore>) -> Self {
        Self {
            hierarchy: HierarchyResolver::new(orgs),
        }
    }

    pub fn hierarchy(&self) -> &HierarchyResolver {
        &self.hierarchy
    }

    /// Task creation requires Admin capability or above.
    pub fn can_create_task(&self, ctx: &AccessContext) -> bool {
        ctx.role_at_least(Role::Admin)
    }

    /// Build the scoping predicate for a task list query. Viewers are
    /// restricted to their own creations; higher roles see every task
    /// across the reachable organizations.
    pub async fn task_list_predicate(&self, ctx: &AccessContext) -> Result<TaskListPredicate> {
        let restrict_to_creator = !ctx.role.is_some_and(|r| r.can_view_all_org_resources());
        let org_ids = self.hierarchy.reachable_org_ids(ctx.organization_id).await?;
        Ok(TaskListPredicate {
            org_ids,
            restrict_to_creator,
        })
    }

    /// Read access: the task's organization must be reachable, and the
    /// caller must either see all org resources or be the creator.
    pub async fn can_read_task(&self, ctx: &AccessContext, task: &Task) -> Result<bool> {
        let visible = ctx.role.is_some_and(|r| r.can_view_all_org_resources())
            || task.created_by == ctx.user_id;
        if !visible {
            return Ok(false);
        }
        self.hierarchy
            .can_org_access_org(ctx.organization_id, task.organization_id)
            .await
    }

    /// Mutation (replace and delete share one rule): read access composed
    /// with manage capability or creatorship. The composition already
    /// covers the parent-org-manager case, because reachability spans
    /// child organizations.
    pub async fn can_mutate_task(&self, ctx: &AccessContext, task: &Task) -> Result<bool> {
        let can_manage = ctx.role.is_some_and(|r| r.can_manage_any_resource_in_org())
            || task.created_by == ctx.user_id;
        if !can_manage {
            return Ok(false);
        }
        self.can_read_task(ctx, task).await
    }

    /// Decide whether the caller may create a user with `target_role` in
    /// `target_org_id`. Role constraints are checked before any
    /// organization lookup.
    pub async fn can_create_user_with_role(
        &self,
        ctx: &AccessContext,
        target_org_id: i64,
        target_role: Role,
    ) -> Result<AccessDecision> {
        let decision = match ctx.role {
            None => AccessDecision::deny("No role assigned - contact administrator"),
            Some(Role::Viewer) => AccessDecision::deny("Viewers cannot create users"),
            Some(Role::SystemAdmin) => AccessDecision::Allow,
            Some(Role::Owner) => {
                if target_org_id == ctx.organization_id {
                    AccessDecision::Allow
                } else if self
                    .hierarchy
                    .is_child_org_of(ctx.organization_id, target_org_id)
                    .await?
                {
                    if target_role == Role::Owner {
                        AccessDecision::deny("Cannot create Owner in child organization")
                    } else {
                        AccessDecision::Allow
                    }
                } else {
                    AccessDecision::deny("Cannot create users in unrelated organizations")
                }
            }
            Some(Role::Admin) => {
                if target_role == Role::Owner {
                    AccessDecision::deny("Admins cannot create Owner users")
                } else if target_org_id == ctx.organization_id
                    || self
                        .hierarchy
                        .is_child_org_of(ctx.organization_id, target_org_id)
                        .await?
                {
                    AccessDecision::Allow
                } else {
                    AccessDecision::deny("Cannot create users in unrelated organizations")
                }
            }
        };

        if let AccessDecision::Deny(reason) = &decision {
            debug!(
                user_id = ctx.user_id,
                target_org_id,
                target_role = %target_role,
                reason,
                "user creation denied"
            );
        }
        Ok(decision)
    }

    /// Audit log access requires Admin capability or above.
    pub fn can_view_audit_log(&self, ctx: &AccessContext) -> bool {
        ctx.role_at_least(Role::Admin)
    }
}
