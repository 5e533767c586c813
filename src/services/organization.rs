//! Organization management. The hierarchy is capped at two levels, so an
//! organization may have a parent only when that parent is itself a root.

use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::hash_password;
use crate::error::{ErrorCode, Result, TaskboardError};
use crate::models::{NewAuditEntry, NewOrganization, NewUser, Organization, UserDto};
use crate::rbac::{AccessContext, AccessDecision, AccessDecisionEngine, Role};
use crate::services::user::validate_credentials;
use crate::store::{AuditStore, OrgStore, UserStore};

/// Request to install an Owner account into an organization.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOwnerRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Clone)]
pub struct OrganizationService {
    orgs: Arc<dyn OrgStore>,
    users: Arc<dyn UserStore>,
    audit: Arc<dyn AuditStore>,
    engine: AccessDecisionEngine,
}

impl OrganizationService {
    pub fn new(
        orgs: Arc<dyn OrgStore>,
        users: Arc<dyn UserStore>,
        audit: Arc<dyn AuditStore>,
        engine: AccessDecisionEngine,
    ) -> Self {
        Self {
            orgs,
            users,
            audit,
            engine,
        }
    }

    /// Create an organization. SystemAdmin only.
    pub async fn create(&self, ctx: &AccessContext, new: NewOrganization) -> Result<Organization> {
        if ctx.role != Some(Role::SystemAdmin) {
            return Err(TaskboardError::forbidden(
                "Only system administrators can create organizations",
            ));
        }
        if new.name.trim().is_empty() {
            return Err(TaskboardError::validation("Organization name is required"));
        }

        if let Some(parent_id) = new.parent_id {
            let parent = self.orgs.get_org(parent_id).await?.ok_or_else(|| {
                TaskboardError::not_found(
                    ErrorCode::OrganizationNotFound,
                    "Parent organization not found",
                )
            })?;
            if parent.is_child() {
                return Err(TaskboardError::validation(
                    "Cannot create organization under a child organization",
                ));
            }
        }

        let org = self.orgs.insert_org(new).await?;

        self.audit
            .append_audit(
                NewAuditEntry::new(ctx.user_id, org.id, "organization.created", "organization")
                    .with_resource_id(org.id)
                    .with_details(json!({ "name": org.name, "parent_id": org.parent_id })),
            )
            .await?;

        info!(org_id = org.id, name = %org.name, "organization created");
        Ok(org)
    }

    /// Install an Owner into an organization. Runs through the same role
    /// placement decision as any other user creation.
    pub async fn create_owner(
        &self,
        ctx: &AccessContext,
        org_id: i64,
        req: CreateOwnerRequest,
    ) -> Result<UserDto> {
        match self
            .engine
            .can_create_user_with_role(ctx, org_id, Role::Owner)
            .await?
        {
            AccessDecision::Allow => {}
            AccessDecision::Deny(reason) => return Err(TaskboardError::forbidden(reason)),
        }

        validate_credentials(&req.email, &req.password)?;

        if self.orgs.get_org(org_id).await?.is_none() {
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
                organization_id: org_id,
                role: Role::Owner,
            })
            .await?;

        self.audit
            .append_audit(
                NewAuditEntry::new(ctx.user_id, org_id, "user.created", "user")
                    .with_resource_id(user.id)
                    .with_details(json!({ "email": user.email, "role": user.role })),
            )
            .await?;

        Ok(user.into_dto())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    async fn service() -> (OrganizationService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.seed_org(1, "Holdings", None).await;
        store.seed_org(2, "Dev", Some(1)).await;
        let engine = AccessDecisionEngine::new(store.clone());
        (
            OrganizationService::new(store.clone(), store.clone(), store.clone(), engine),
            store,
        )
    }

    fn ctx(role: Role, org: i64) -> AccessContext {
        AccessContext::new(1, Some(role), org)
    }

    fn owner_req(email: &str) -> CreateOwnerRequest {
        CreateOwnerRequest {
            email: email.to_string(),
            password: "correct horse".to_string(),
            first_name: "Olive".to_string(),
            last_name: "Owner".to_string(),
        }
    }

    #[tokio::test]
    async fn only_system_admin_creates_orgs() {
        let (service, _) = service().await;
        for role in [Role::Viewer, Role::Admin, Role::Owner] {
            let err = service
                .create(
                    &ctx(role, 1),
                    NewOrganization {
                        name: "Nope".to_string(),
                        parent_id: None,
                    },
                )
                .await
                .unwrap_err();
            assert_eq!(err.code(), ErrorCode::Forbidden);
        }
    }

    #[tokio::test]
    async fn system_admin_creates_root_and_child() {
        let (service, _) = service().await;
        let sys = ctx(Role::SystemAdmin, 1);
        let root = service
            .create(
                &sys,
                NewOrganization {
                    name: "Acme".to_string(),
                    parent_id: None,
                },
            )
            .await
            .unwrap();
        let child = service
            .create(
                &sys,
                NewOrganization {
                    name: "Acme Labs".to_string(),
                    parent_id: Some(root.id),
                },
            )
            .await
            .unwrap();
        assert_eq!(child.parent_id, Some(root.id));
    }

    #[tokio::test]
    async fn no_grandchildren() {
        let (service, _) = service().await;
        // Org 2 is already a child of org 1.
        let err = service
            .create(
                &ctx(Role::SystemAdmin, 1),
                NewOrganization {
                    name: "Too deep".to_string(),
                    parent_id: Some(2),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(
            err.user_message(),
            "Cannot create organization under a child organization"
        );
    }

    #[tokio::test]
    async fn missing_parent_is_not_found() {
        let (service, _) = service().await;
        let err = service
            .create(
                &ctx(Role::SystemAdmin, 1),
                NewOrganization {
                    name: "Orphan".to_string(),
                    parent_id: Some(999),
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::OrganizationNotFound);
    }

    #[tokio::test]
    async fn system_admin_installs_owner_anywhere() {
        let (service, _) = service().await;
        let user = service
            .create_owner(&ctx(Role::SystemAdmin, 1), 2, owner_req("boss@example.com"))
            .await
            .unwrap();
        assert_eq!(user.role, "Owner");
        assert_eq!(user.organization_id, 2);
    }

    #[tokio::test]
    async fn owner_cannot_install_owner_in_child() {
        let (service, _) = service().await;
        let err = service
            .create_owner(&ctx(Role::Owner, 1), 2, owner_req("boss@example.com"))
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Cannot create Owner in child organization");
    }

    #[tokio::test]
    async fn org_creation_audited() {
        let (service, store) = service().await;
        let org = service
            .create(
                &ctx(Role::SystemAdmin, 1),
                NewOrganization {
                    name: "Audited".to_string(),
                    parent_id: None,
                },
            )
            .await
            .unwrap();

        let page = store.query_audit(org.id, &Default::default()).await.unwrap();
        assert_eq!(page.data[0].action, "organization.created");
    }
}
