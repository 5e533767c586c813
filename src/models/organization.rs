//! Organization entities for the two-level tenancy hierarchy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An organization (tenant). The hierarchy is capped at two levels: an
/// organization with a `parent_id` must never have children of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Organization {
    /// An organization with a parent is a child and may not own children.
    pub fn is_child(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// An organization together with its direct children.
#[derive(Debug, Clone, Serialize)]
pub struct OrgWithChildren {
    pub org: Organization,
    pub children: Vec<Organization>,
}

impl OrgWithChildren {
    pub fn child_ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.children.iter().map(|c| c.id)
    }
}

/// Payload for creating an organization.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrganization {
    pub name: String,
    pub parent_id: Option<i64>,
}
