//! User entity. Each user belongs to exactly one organization and carries
//! exactly one role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::rbac::Role;

/// A user account. `role` is the stored role string; it is parsed into a
/// [`Role`] when an access context is built, and an unrecognized value
/// simply yields no permissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub organization_id: i64,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }

    /// Strip credential material for API responses.
    pub fn into_dto(self) -> UserDto {
        UserDto {
            id: self.id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            organization_id: self.organization_id,
            role: self.role,
            is_active: self.is_active,
            created_at: self.created_at,
        }
    }
}

/// User representation safe to return to clients (no password hash).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDto {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub organization_id: i64,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Payload for inserting a user (password already hashed).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub organization_id: i64,
    pub role: Role,
}
