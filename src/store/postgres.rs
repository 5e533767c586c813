//! Postgres-backed store implementation using sqlx.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};

use super::{AuditStore, OrgStore, TaskStore, UserStore};
use crate::error::Result;
use crate::models::{
    AuditEntry, AuditLogFilter, AuditPage, NewAuditEntry, NewOrganization, NewTask, NewUser,
    Organization, OrgWithChildren, ReplaceTask, Task, TaskPriority, TaskStatus, User,
};
use crate::rbac::TaskListPredicate;

/// Database connection pool and operations.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    pub async fn new(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Run migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| crate::error::TaskboardError::from(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[derive(sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    status: String,
    priority: String,
    category: String,
    due_date: Option<DateTime<Utc>>,
    created_by: i64,
    organization_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            title: row.title,
            description: row.description,
            status: TaskStatus::parse(&row.status),
            priority: TaskPriority::parse(&row.priority),
            category: row.category,
            due_date: row.due_date,
            created_by: row.created_by,
            organization_id: row.organization_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    organization_id: i64,
    role: String,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            first_name: row.first_name,
            last_name: row.last_name,
            organization_id: row.organization_id,
            role: row.role,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuditRow {
    id: i64,
    user_id: i64,
    organization_id: i64,
    action: String,
    resource_type: String,
    resource_id: Option<i64>,
    details: Option<serde_json::Value>,
    created_at: DateTime<Utc>,
}

impl From<AuditRow> for AuditEntry {
    fn from(row: AuditRow) -> Self {
        AuditEntry {
            id: row.id,
            user_id: row.user_id,
            organization_id: row.organization_id,
            action: row.action,
            resource_type: row.resource_type,
            resource_id: row.resource_id,
            details: row.details,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl OrgStore for Database {
    async fn get_org(&self, id: i64) -> Result<Option<Organization>> {
        let org = sqlx::query_as::<_, Organization>(
            "SELECT id, name, parent_id, created_at FROM organizations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(org)
    }

    async fn get_org_with_children(&self, id: i64) -> Result<Option<OrgWithChildren>> {
        let Some(org) = self.get_org(id).await? else {
            return Ok(None);
        };

        let children = sqlx::query_as::<_, Organization>(
            "SELECT id, name, parent_id, created_at FROM organizations WHERE parent_id = $1 ORDER BY id",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(OrgWithChildren { org, children }))
    }

    async fn insert_org(&self, new: NewOrganization) -> Result<Organization> {
        let org = sqlx::query_as::<_, Organization>(
            r#"
            INSERT INTO organizations (name, parent_id)
            VALUES ($1, $2)
            RETURNING id, name, parent_id, created_at
            "#,
        )
        .bind(&new.name)
        .bind(new.parent_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(org)
    }

    async fn count_orgs(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM organizations")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("count"))
    }
}

#[async_trait]
impl UserStore for Database {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, first_name, last_name,
                   organization_id, role, is_active, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, first_name, last_name,
                   organization_id, role, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    async fn insert_user(&self, new: NewUser) -> Result<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, organization_id, role)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, email, password_hash, first_name, last_name,
                      organization_id, role, is_active, created_at
            "#,
        )
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(new.organization_id)
        .bind(new.role.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(User::from(row))
    }

    async fn count_users(&self) -> Result<i64> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get::<i64, _>("count"))
    }
}

#[async_trait]
impl TaskStore for Database {
    async fn insert_task(
        &self,
        new: NewTask,
        created_by: i64,
        organization_id: i64,
    ) -> Result<Task> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (title, description, status, priority, category, due_date, created_by, organization_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, title, description, status, priority, category, due_date,
                      created_by, organization_id, created_at, updated_at
            "#,
        )
        .bind(&new.title)
        .bind(&new.description)
        .bind(new.status.as_str())
        .bind(new.priority.as_str())
        .bind(&new.category)
        .bind(new.due_date)
        .bind(created_by)
        .bind(organization_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(Task::from(row))
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            SELECT id, title, description, status, priority, category, due_date,
                   created_by, organization_id, created_at, updated_at
            FROM tasks
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Task::from))
    }

    async fn list_tasks(
        &self,
        predicate: &TaskListPredicate,
        caller_id: i64,
    ) -> Result<Vec<Task>> {
        let mut org_ids: Vec<i64> = predicate.org_ids.iter().copied().collect();
        org_ids.sort_unstable();

        let rows = if predicate.restrict_to_creator {
            sqlx::query_as::<_, TaskRow>(
                r#"
                SELECT id, title, description, status, priority, category, due_date,
                       created_by, organization_id, created_at, updated_at
                FROM tasks
                WHERE organization_id = ANY($1) AND created_by = $2
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .bind(&org_ids)
            .bind(caller_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, TaskRow>(
                r#"
                SELECT id, title, description, status, priority, category, due_date,
                       created_by, organization_id, created_at, updated_at
                FROM tasks
                WHERE organization_id = ANY($1)
                ORDER BY created_at DESC, id DESC
                "#,
            )
            .bind(&org_ids)
            .fetch_all(&self.pool)
            .await?
        };

        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn replace_task(&self, id: i64, replace: ReplaceTask) -> Result<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            UPDATE tasks
            SET title = $2, description = $3, status = $4, priority = $5,
                category = $6, due_date = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING id, title, description, status, priority, category, due_date,
                      created_by, organization_id, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(&replace.title)
        .bind(&replace.description)
        .bind(replace.status.as_str())
        .bind(replace.priority.as_str())
        .bind(&replace.category)
        .bind(replace.due_date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Task::from))
    }

    async fn delete_task(&self, id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl AuditStore for Database {
    async fn append_audit(&self, entry: NewAuditEntry) -> Result<AuditEntry> {
        let row = sqlx::query_as::<_, AuditRow>(
            r#"
            INSERT INTO audit_logs (user_id, organization_id, action, resource_type, resource_id, details)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, organization_id, action, resource_type, resource_id, details, created_at
            "#,
        )
        .bind(entry.user_id)
        .bind(entry.organization_id)
        .bind(&entry.action)
        .bind(&entry.resource_type)
        .bind(entry.resource_id)
        .bind(&entry.details)
        .fetch_one(&self.pool)
        .await?;

        Ok(AuditEntry::from(row))
    }

    async fn query_audit(
        &self,
        organization_id: i64,
        filter: &AuditLogFilter,
    ) -> Result<AuditPage> {
        let page = filter.page();
        let limit = filter.limit();
        // Widen before multiplying; `page` is an unvalidated query
        // parameter and the product can exceed u32.
        let offset = (i64::from(page) - 1) * i64::from(limit);
        let action_pattern = filter.action.as_ref().map(|a| format!("%{}%", a));

        let count_row = sqlx::query(
            r#"
            SELECT COUNT(*) AS count
            FROM audit_logs
            WHERE organization_id = $1
              AND ($2::BIGINT IS NULL OR user_id = $2)
              AND ($3::TEXT IS NULL OR action LIKE $3)
              AND ($4::TEXT IS NULL OR resource_type = $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at >= $5)
              AND ($6::TIMESTAMPTZ IS NULL OR created_at <= $6)
            "#,
        )
        .bind(organization_id)
        .bind(filter.user_id)
        .bind(&action_pattern)
        .bind(&filter.resource_type)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .fetch_one(&self.pool)
        .await?;
        let total = count_row.get::<i64, _>("count");

        let rows = sqlx::query_as::<_, AuditRow>(
            r#"
            SELECT id, user_id, organization_id, action, resource_type, resource_id, details, created_at
            FROM audit_logs
            WHERE organization_id = $1
              AND ($2::BIGINT IS NULL OR user_id = $2)
              AND ($3::TEXT IS NULL OR action LIKE $3)
              AND ($4::TEXT IS NULL OR resource_type = $4)
              AND ($5::TIMESTAMPTZ IS NULL OR created_at >= $5)
              AND ($6::TIMESTAMPTZ IS NULL OR created_at <= $6)
            ORDER BY created_at DESC, id DESC
            LIMIT $7 OFFSET $8
            "#,
        )
        .bind(organization_id)
        .bind(filter.user_id)
        .bind(&action_pattern)
        .bind(&filter.resource_type)
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(limit as i64)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let data = rows.into_iter().map(AuditEntry::from).collect();
        Ok(AuditPage::new(data, total, page, limit))
    }
}
