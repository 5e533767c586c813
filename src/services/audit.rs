//! Audit log queries, scoped to the caller's organization.

use std::sync::Arc;

use crate::error::{Result, TaskboardError};
use crate::models::{AuditLogFilter, AuditPage};
use crate::rbac::{AccessContext, AccessDecisionEngine};
use crate::store::AuditStore;

#[derive(Clone)]
pub struct AuditService {
    audit: Arc<dyn AuditStore>,
    engine: AccessDecisionEngine,
}

impl AuditService {
    pub fn new(audit: Arc<dyn AuditStore>, engine: AccessDecisionEngine) -> Self {
        Self { audit, engine }
    }

    /// Query the caller's organization trail. The organization scope comes
    /// from the verified context, never from the request.
    pub async fn query(&self, ctx: &AccessContext, filter: AuditLogFilter) -> Result<AuditPage> {
        if !self.engine.can_view_audit_log(ctx) {
            return Err(TaskboardError::forbidden(
                "Only Admins and Owners can view the audit log",
            ));
        }
        self.audit.query_audit(ctx.organization_id, &filter).await
    }
}
