//! User provisioning, gated by the role placement decision.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::hash_password;
use crate::error::{ErrorCode, Result, TaskboardError};
use crate::models::{NewAuditEntry, NewUser, UserDto};
use crate::rbac::{AccessContext, AccessDecision, AccessDecisionEngine, Role};
use crate::store::{AuditStore, OrgStore, UserStore};

/// Request to create a user. Omitted `organization_id` targets the
/// caller's own organization; omitted `role` defaults to Viewer.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub organization_id: Option<i64>,
    pub role: Option<Role>,
}

#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    orgs: Arc<dyn OrgStore>,
    audit: Arc<dyn AuditStore>,
    engine: AccessDecisionEngine,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserStore>,
        orgs: Arc<dyn OrgStore>,
        audit: Arc<dyn AuditStore>,
        engine: AccessDecisionEngine,
    ) -> Self {
        Self {
            users,
            orgs,
            audit,
            engine,
        }
    }

    pub async fn create(&self, ctx: &AccessContext, req: CreateUserRequest) -> Result<UserDto> {
        let target_org_id = req.organization_id.unwrap_or(ctx.organization_id);
        let target_role = req.role.unwrap_or(Role::Viewer);

        match self
            .engine
            .can_create_user_with_role(ctx, target_org_id, target_role)
            .await?
        {
            AccessDecision::Allow => {}
            AccessDecision::Deny(reason) => return Err(TaskboardError::forbidden(reason)),
        }

        validate_credentials(&req.email, &req.password)?;

        // The decision passed on hierarchy facts alone; the org itself must
        // still exist before we insert.
        if self.orgs.get_org(target_org_id).await?.is_none() {
            return Err(TaskboardError::not_found(
                ErrorCode::OrganizationNotFound,
                "Organization not found",
            ));
        }

        let user = self
            .users
            .insert_user(NewUser {
                email: req.email,
                password_hash: hash_password(&req.password)?,
                first_name: req.first_name,
                last_name: req.last_name,
                organization_id: target_org_id,
                role: target_role,
            })
            .await?;

        self.audit
            .append_audit(
                NewAuditEntry::new(ctx.user_id, target_org_id, "user.created", "user")
                    .with_resource_id(user.id)
                    .with_details(json!({ "email": user.email, "role": user.role })),
            )
            .await?;

        info!(
            user_id = user.id,
            organization_id = target_org_id,
            role = %user.role,
            "user created"
        );
        Ok(user.into_dto())
    }
}

pub(crate) fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if !email.contains('@') || email.trim().len() < 3 {
        return Err(TaskboardError::validation("A valid email address is required"));
    }
    if password.len() < 8 {
        return Err(TaskboardError::validation(
            "Password must be at least 8 characters",
        ));
    }
    Ok(())
}
