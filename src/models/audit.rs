//! Audit log entities and query filters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One audit record: who did what to which resource, scoped to an
/// organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub user_id: i64,
    pub organization_id: i64,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<i64>,
    pub details: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

/// Payload for appending an audit record.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub user_id: i64,
    pub organization_id: i64,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<i64>,
    pub details: Option<serde_json::Value>,
}

impl NewAuditEntry {
    pub fn new(
        user_id: i64,
        organization_id: i64,
        action: impl Into<String>,
        resource_type: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            organization_id,
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: None,
            details: None,
        }
    }

    pub fn with_resource_id(mut self, id: i64) -> Self {
        self.resource_id = Some(id);
        self
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Filters for the audit query endpoint. `action` matches as a substring;
/// the date bounds are inclusive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditLogFilter {
    pub user_id: Option<i64>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl AuditLogFilter {
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(50).clamp(1, 200)
    }
}

/// A page of audit results, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct AuditPage {
    pub data: Vec<AuditEntry>,
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
}

impl AuditPage {
    pub fn new(data: Vec<AuditEntry>, total: i64, page: u32, limit: u32) -> Self {
        let total_pages = ((total as f64) / (limit as f64)).ceil() as u32;
        Self {
            data,
            total,
            page,
            limit,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_defaults() {
        let filter = AuditLogFilter::default();
        assert_eq!(filter.page(), 1);
        assert_eq!(filter.limit(), 50);
    }

    #[test]
    fn filter_clamps_limit() {
        let filter = AuditLogFilter {
            limit: Some(10_000),
            page: Some(0),
            ..Default::default()
        };
        assert_eq!(filter.limit(), 200);
        assert_eq!(filter.page(), 1);
    }

    #[test]
    fn page_math() {
        let page = AuditPage::new(vec![], 101, 1, 50);
        assert_eq!(page.total_pages, 3);
    }
}
