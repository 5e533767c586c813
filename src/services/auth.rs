//! Login and self-registration.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, TokenService};
use crate::error::{ErrorCode, Result, TaskboardError};
use crate::models::{NewAuditEntry, NewUser, UserDto};
use crate::rbac::Role;
use crate::services::user::validate_credentials;
use crate::store::{AuditStore, OrgStore, UserStore};

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Self-registration always produces a Viewer; anything higher has to be
/// provisioned by an existing Admin or above.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub organization_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserStore>,
    orgs: Arc<dyn OrgStore>,
    audit: Arc<dyn AuditStore>,
    tokens: Arc<TokenService>,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserStore>,
        orgs: Arc<dyn OrgStore>,
        audit: Arc<dyn AuditStore>,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            users,
            orgs,
            audit,
            tokens,
        }
    }

    pub async fn login(&self, req: LoginRequest) -> Result<AuthResponse> {
        // Same response for unknown email and wrong password.
        let user = self
            .users
            .find_user_by_email(&req.email)
            .await?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&req.password, &user.password_hash) {
            warn!(email = %req.email, "failed login attempt");
            return Err(invalid_credentials());
        }
        if !user.is_active {
            return Err(TaskboardError::forbidden("This account has been disabled"));
        }

        let token = self.tokens.issue(&user)?;

        self.audit
            .append_audit(
                NewAuditEntry::new(user.id, user.organization_id, "auth.login", "user")
                    .with_resource_id(user.id),
            )
            .await?;

        info!(user_id = user.id, "login succeeded");
        Ok(AuthResponse {
            token,
            user: user.into_dto(),
        })
    }

    pub async fn register(&self, req: RegisterRequest) -> Result<AuthResponse> {
        validate_credentials(&req.email, &req.password)?;

        if self.orgs.get_org(req.organization_id).await?.is_none() {
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
                organization_id: req.organization_id,
                role: Role::Viewer,
            })
            .await?;

        self.audit
            .append_audit(
                NewAuditEntry::new(user.id, user.organization_id, "auth.register", "user")
                    .with_resource_id(user.id),
            )
            .await?;

        let token = self.tokens.issue(&user)?;
        info!(user_id = user.id, "user registered");
        Ok(AuthResponse {
            token,
            user: user.into_dto(),
        })
    }
}

fn invalid_credentials() -> TaskboardError {
    TaskboardError::new(ErrorCode::InvalidCredentials, "Invalid credentials")
}
