//! Demo data seeding, invoked once from the composition root.
//!
//! The seed is count-guarded: it runs only against an empty database, so
//! restarting the server never duplicates or overwrites records.

use std::sync::Arc;

use tracing::info;

use crate::auth::hash_password;
use crate::error::Result;
use crate::models::{NewOrganization, NewUser};
use crate::rbac::Role;
use crate::store::{OrgStore, UserStore};

pub async fn seed_demo_data(orgs: &Arc<dyn OrgStore>, users: &Arc<dyn UserStore>) -> Result<()> {
    if orgs.count_orgs().await? > 0 || users.count_users().await? > 0 {
        info!("database already populated, skipping demo seed");
        return Ok(());
    }

    let parent = orgs
        .insert_org(NewOrganization {
            name: "TechCorp Holdings".to_string(),
            parent_id: None,
        })
        .await?;
    let child = orgs
        .insert_org(NewOrganization {
            name: "TechCorp Development".to_string(),
            parent_id: Some(parent.id),
        })
        .await?;

    let demo_users = [
        ("sysadmin@taskboard.local", "Sys", "Admin", parent.id, Role::SystemAdmin),
        ("owner@techcorp.example", "Olive", "Owner", parent.id, Role::Owner),
        ("admin@techcorp.example", "Andy", "Admin", child.id, Role::Admin),
        ("viewer@techcorp.example", "Vera", "Viewer", child.id, Role::Viewer),
    ];

    for (email, first, last, org_id, role) in demo_users {
        users
            .insert_user(NewUser {
                email: email.to_string(),
                password_hash: hash_password("changeme123")?,
                first_name: first.to_string(),
                last_name: last.to_string(),
                organization_id: org_id,
                role,
            })
            .await?;
    }

    info!(
        parent_org = parent.id,
        child_org = child.id,
        "seeded demo organizations and users"
    );
    Ok(())
}
