//! In-memory store used by the unit tests. Mirrors the Postgres
//! implementation's semantics: unique emails, newest-first audit pages,
//! predicate-scoped task lists.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{AuditStore, OrgStore, TaskStore, UserStore};
use crate::error::{Result, TaskboardError};
use crate::models::{
    AuditEntry, AuditLogFilter, AuditPage, NewAuditEntry, NewOrganization, NewTask, NewUser,
    Organization, OrgWithChildren, ReplaceTask, Task, User,
};
use crate::rbac::TaskListPredicate;

#[derive(Default)]
struct Inner {
    orgs: HashMap<i64, Organization>,
    users: HashMap<i64, User>,
    tasks: HashMap<i64, Task>,
    audit: Vec<AuditEntry>,
    next_id: i64,
}

impl Inner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Thread-safe in-memory store implementing every store trait.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an organization with a fixed id, for test fixtures.
    pub async fn seed_org(&self, id: i64, name: &str, parent_id: Option<i64>) {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id = inner.next_id.max(id);
        inner.orgs.insert(
            id,
            Organization {
                id,
                name: name.to_string(),
                parent_id,
                created_at: Utc::now(),
            },
        );
    }

    /// Insert a user with a fixed id, for test fixtures.
    pub async fn seed_user(&self, id: i64, email: &str, organization_id: i64, role: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.next_id = inner.next_id.max(id);
        inner.users.insert(
            id,
            User {
                id,
                email: email.to_string(),
                password_hash: "unset".to_string(),
                first_name: "Test".to_string(),
                last_name: "User".to_string(),
                organization_id,
                role: role.to_string(),
                is_active: true,
                created_at: Utc::now(),
            },
        );
    }
}

#[async_trait]
impl OrgStore for MemoryStore {
    async fn get_org(&self, id: i64) -> Result<Option<Organization>> {
        Ok(self.inner.lock().unwrap().orgs.get(&id).cloned())
    }

    async fn get_org_with_children(&self, id: i64) -> Result<Option<OrgWithChildren>> {
        let inner = self.inner.lock().unwrap();
        let Some(org) = inner.orgs.get(&id).cloned() else {
            return Ok(None);
        };
        let mut children: Vec<Organization> = inner
            .orgs
            .values()
            .filter(|o| o.parent_id == Some(id))
            .cloned()
            .collect();
        children.sort_by_key(|o| o.id);
        Ok(Some(OrgWithChildren { org, children }))
    }

    async fn insert_org(&self, new: NewOrganization) -> Result<Organization> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let org = Organization {
            id,
            name: new.name,
            parent_id: new.parent_id,
            created_at: Utc::now(),
        };
        inner.orgs.insert(id, org.clone());
        Ok(org)
    }

    async fn count_orgs(&self) -> Result<i64> {
        Ok(self.inner.lock().unwrap().orgs.len() as i64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .inner
            .lock()
            .unwrap()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>> {
        Ok(self.inner.lock().unwrap().users.get(&id).cloned())
    }

    async fn insert_user(&self, new: NewUser) -> Result<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.users.values().any(|u| u.email == new.email) {
            return Err(TaskboardError::conflict(
                "A record with this identifier already exists",
            ));
        }
        let id = inner.next_id();
        let user = User {
            id,
            email: new.email,
            password_hash: new.password_hash,
            first_name: new.first_name,
            last_name: new.last_name,
            organization_id: new.organization_id,
            role: new.role.as_str().to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn count_users(&self) -> Result<i64> {
        Ok(self.inner.lock().unwrap().users.len() as i64)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(
        &self,
        new: NewTask,
        created_by: i64,
        organization_id: i64,
    ) -> Result<Task> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let now = Utc::now();
        let task = Task {
            id,
            title: new.title,
            description: new.description,
            status: new.status,
            priority: new.priority,
            category: new.category,
            due_date: new.due_date,
            created_by,
            organization_id,
            created_at: now,
            updated_at: now,
        };
        inner.tasks.insert(id, task.clone());
        Ok(task)
    }

    async fn find_task(&self, id: i64) -> Result<Option<Task>> {
        Ok(self.inner.lock().unwrap().tasks.get(&id).cloned())
    }

    async fn list_tasks(
        &self,
        predicate: &TaskListPredicate,
        caller_id: i64,
    ) -> Result<Vec<Task>> {
        let inner = self.inner.lock().unwrap();
        let mut tasks: Vec<Task> = inner
            .tasks
            .values()
            .filter(|t| predicate.org_ids.contains(&t.organization_id))
            .filter(|t| !predicate.restrict_to_creator || t.created_by == caller_id)
            .cloned()
            .collect();
        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(tasks)
    }

    async fn replace_task(&self, id: i64, replace: ReplaceTask) -> Result<Option<Task>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(task) = inner.tasks.get_mut(&id) else {
            return Ok(None);
        };
        task.title = replace.title;
        task.description = replace.description;
        task.status = replace.status;
        task.priority = replace.priority;
        task.category = replace.category;
        task.due_date = replace.due_date;
        task.updated_at = Utc::now();
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: i64) -> Result<bool> {
        Ok(self.inner.lock().unwrap().tasks.remove(&id).is_some())
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn append_audit(&self, entry: NewAuditEntry) -> Result<AuditEntry> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let record = AuditEntry {
            id,
            user_id: entry.user_id,
            organization_id: entry.organization_id,
            action: entry.action,
            resource_type: entry.resource_type,
            resource_id: entry.resource_id,
            details: entry.details,
            created_at: Utc::now(),
        };
        inner.audit.push(record.clone());
        Ok(record)
    }

    async fn query_audit(
        &self,
        organization_id: i64,
        filter: &AuditLogFilter,
    ) -> Result<AuditPage> {
        let inner = self.inner.lock().unwrap();
        let mut matches: Vec<AuditEntry> = inner
            .audit
            .iter()
            .filter(|e| e.organization_id == organization_id)
            .filter(|e| filter.user_id.map_or(true, |id| e.user_id == id))
            .filter(|e| {
                filter
                    .action
                    .as_deref()
                    .map_or(true, |action| e.action.contains(action))
            })
            .filter(|e| {
                filter
                    .resource_type
                    .as_deref()
                    .map_or(true, |rt| e.resource_type == rt)
            })
            .filter(|e| filter.start_date.map_or(true, |from| e.created_at >= from))
            .filter(|e| filter.end_date.map_or(true, |until| e.created_at <= until))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matches.len() as i64;
        let page = filter.page();
        let limit = filter.limit();
        // Widen before multiplying, as the Postgres offset computation does.
        let start = (u64::from(page) - 1) * u64::from(limit);
        let data = matches
            .into_iter()
            .skip(start as usize)
            .take(limit as usize)
            .collect();
        Ok(AuditPage::new(data, total, page, limit))
    }
}
