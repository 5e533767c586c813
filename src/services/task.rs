//! Task operations, each gated by an explicit engine decision.

use std::sync::Arc;

use serde_json::json;
use tracing::info;

use crate::error::{ErrorCode, Result, TaskboardError};
use crate::models::{NewAuditEntry, NewTask, ReplaceTask, Task};
use crate::rbac::{AccessContext, AccessDecisionEngine};
use crate::store::{AuditStore, TaskStore};

#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskStore>,
    audit: Arc<dyn AuditStore>,
    engine: AccessDecisionEngine,
}

impl TaskService {
    pub fn new(
        tasks: Arc<dyn TaskStore>,
        audit: Arc<dyn AuditStore>,
        engine: AccessDecisionEngine,
    ) -> Self {
        Self {
            tasks,
            audit,
            engine,
        }
    }

    /// Create a task in the caller's organization.
    pub async fn create(&self, ctx: &AccessContext, new: NewTask) -> Result<Task> {
        if ctx.role.is_none() {
            return Err(TaskboardError::forbidden(
                "No role assigned - contact administrator",
            ));
        }
        if !self.engine.can_create_task(ctx) {
            return Err(TaskboardError::forbidden(
                "Only Admins and Owners can create tasks",
            ));
        }
        if new.title.trim().is_empty() {
            return Err(TaskboardError::validation("Title is required"));
        }

        let task = self
            .tasks
            .insert_task(new, ctx.user_id, ctx.organization_id)
            .await?;

        self.audit
            .append_audit(
                NewAuditEntry::new(ctx.user_id, ctx.organization_id, "task.created", "task")
                    .with_resource_id(task.id)
                    .with_details(json!({ "title": task.title })),
            )
            .await?;

        info!(task_id = task.id, user_id = ctx.user_id, "task created");
        Ok(task)
    }

    /// List tasks visible to the caller.
    pub async fn list(&self, ctx: &AccessContext) -> Result<Vec<Task>> {
        let predicate = self.engine.task_list_predicate(ctx).await?;
        self.tasks.list_tasks(&predicate, ctx.user_id).await
    }

    /// Fetch one task. A missing task is 404 regardless of the caller; an
    /// existing but unreadable task is 403.
    pub async fn find_one(&self, ctx: &AccessContext, id: i64) -> Result<Task> {
        let task = self
            .tasks
            .find_task(id)
            .await?
            .ok_or_else(|| TaskboardError::not_found(ErrorCode::TaskNotFound, "Task not found"))?;

        if !self.engine.can_read_task(ctx, &task).await? {
            return Err(TaskboardError::forbidden("Access denied to this task"));
        }
        Ok(task)
    }

    /// Replace every mutable field of a task.
    pub async fn replace(&self, ctx: &AccessContext, id: i64, replace: ReplaceTask) -> Result<Task> {
        let task = self
            .tasks
            .find_task(id)
            .await?
            .ok_or_else(|| TaskboardError::not_found(ErrorCode::TaskNotFound, "Task not found"))?;

        if !self.engine.can_mutate_task(ctx, &task).await? {
            return Err(TaskboardError::forbidden(
                "You can only replace tasks you created or manage as parent org admin",
            ));
        }
        if replace.title.trim().is_empty() {
            return Err(TaskboardError::validation("Title is required"));
        }

        let updated = self
            .tasks
            .replace_task(id, replace)
            .await?
            .ok_or_else(|| TaskboardError::not_found(ErrorCode::TaskNotFound, "Task not found"))?;

        self.audit
            .append_audit(
                NewAuditEntry::new(ctx.user_id, ctx.organization_id, "task.replaced", "task")
                    .with_resource_id(id),
            )
            .await?;

        Ok(updated)
    }

    /// Delete a task.
    pub async fn remove(&self, ctx: &AccessContext, id: i64) -> Result<()> {
        let task = self
            .tasks
            .find_task(id)
            .await?
            .ok_or_else(|| TaskboardError::not_found(ErrorCode::TaskNotFound, "Task not found"))?;

        if !self.engine.can_mutate_task(ctx, &task).await? {
            return Err(TaskboardError::forbidden(
                "You can only delete tasks you created or manage as parent org admin",
            ));
        }

        self.tasks.delete_task(id).await?;

        self.audit
            .append_audit(
                NewAuditEntry::new(ctx.user_id, ctx.organization_id, "task.deleted", "task")
                    .with_resource_id(id),
            )
            .await?;

        info!(task_id = id, user_id = ctx.user_id, "task deleted");
        Ok(())
    }
}
