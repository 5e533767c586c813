//! Role taxonomy with total capability ordering.
//!
//! Capability containment is strict and total:
//! `SystemAdmin > Owner > Admin > Viewer`. Every check a lower role passes,
//! a higher role passes too. Exactly one role is assigned per user.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The fixed, closed role enumeration.
///
/// Variant order defines capability order; the derived `Ord` is relied on
/// by [`Role::at_least`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Role {
    Viewer,
    Admin,
    Owner,
    SystemAdmin,
}

impl Role {
    /// Parse the stored/wire role string. Unknown values yield `None`,
    /// which every decision path treats as "no permissions" rather than an
    /// error.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "SystemAdmin" => Some(Self::SystemAdmin),
            "Owner" => Some(Self::Owner),
            "Admin" => Some(Self::Admin),
            "Viewer" => Some(Self::Viewer),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SystemAdmin => "SystemAdmin",
            Self::Owner => "Owner",
            Self::Admin => "Admin",
            Self::Viewer => "Viewer",
        }
    }

    /// True if this role's capability set contains `threshold`'s.
    /// SystemAdmin satisfies every threshold; Viewer satisfies only Viewer.
    pub fn at_least(&self, threshold: Role) -> bool {
        *self >= threshold
    }

    /// SystemAdmin, Owner and Admin see every resource across their
    /// reachable organizations; Viewer sees only resources they created.
    pub fn can_view_all_org_resources(&self) -> bool {
        self.at_least(Role::Admin)
    }

    /// SystemAdmin, Owner and Admin may edit or delete any resource within
    /// an organization they can reach, not only their own.
    pub fn can_manage_any_resource_in_org(&self) -> bool {
        self.at_least(Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Role; 4] = [Role::Viewer, Role::Admin, Role::Owner, Role::SystemAdmin];

    #[test]
    fn system_admin_satisfies_every_threshold() {
        for threshold in ALL {
            assert!(Role::SystemAdmin.at_least(threshold));
        }
    }

    #[test]
    fn viewer_satisfies_only_viewer() {
        assert!(Role::Viewer.at_least(Role::Viewer));
        assert!(!Role::Viewer.at_least(Role::Admin));
        assert!(!Role::Viewer.at_least(Role::Owner));
        assert!(!Role::Viewer.at_least(Role::SystemAdmin));
    }

    #[test]
    fn containment_is_strict_and_total() {
        // Every allow for a lower role is an allow for every higher role.
        for (i, lower) in ALL.iter().enumerate() {
            for higher in &ALL[i..] {
                for threshold in ALL {
                    if lower.at_least(threshold) {
                        assert!(higher.at_least(threshold));
                    }
                }
            }
        }
    }

    #[test]
    fn owner_is_below_system_admin() {
        assert!(Role::Owner.at_least(Role::Admin));
        assert!(!Role::Owner.at_least(Role::SystemAdmin));
    }

    #[test]
    fn view_and_manage_capabilities() {
        assert!(!Role::Viewer.can_view_all_org_resources());
        assert!(!Role::Viewer.can_manage_any_resource_in_org());
        for role in [Role::Admin, Role::Owner, Role::SystemAdmin] {
            assert!(role.can_view_all_org_resources());
            assert!(role.can_manage_any_resource_in_org());
        }
    }

    #[test]
    fn parse_round_trip_and_deny_by_default() {
        for role in ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
        assert_eq!(Role::parse(""), None);
        assert_eq!(Role::parse("admin"), None); // case-sensitive
    }
}
