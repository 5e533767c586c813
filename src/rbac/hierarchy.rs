//! Organization hierarchy resolution for the two-tier tenancy model.
//!
//! Access flows downward (a parent organization manages its children) and
//! upward one hop (a child sees its parent), never sideways between
//! siblings. A child org's reach is `{self, parent}`; a parent org's reach
//! is `{self, all children}`.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;

use crate::error::Result;
use crate::store::OrgStore;

/// Computes which organization ids a given organization may act across.
///
/// Hierarchy facts are fetched fresh from the backing store on every call;
/// nothing is cached between requests.
#[derive(Clone)]
pub struct HierarchyResolver {
    orgs: Arc<dyn OrgStore>,
}

impl HierarchyResolver {
    pub fn new(orgs: Arc<dyn OrgStore>) -> Self {
        Self { orgs }
    }

    /// The set of organization ids reachable from `org_id`:
    ///
    /// - always contains `org_id` itself;
    /// - plus every direct child (depth is capped at two, so children never
    ///   have children of their own);
    /// - plus the parent, if any — but never the parent's other children.
    ///
    /// A nonexistent organization degrades to self-only reach rather than
    /// failing.
    pub async fn reachable_org_ids(&self, org_id: i64) -> Result<HashSet<i64>> {
        let mut reach = HashSet::new();
        reach.insert(org_id);

        let Some(node) = self.orgs.get_org_with_children(org_id).await? else {
            debug!(org_id, "organization not found, degrading to self-only reach");
            return Ok(reach);
        };

        reach.extend(node.child_ids());

        // Upward one hop only. Siblings are deliberately excluded.
        if let Some(parent_id) = node.org.parent_id {
            reach.insert(parent_id);
        }

        Ok(reach)
    }

    /// True if `from_org_id` may act on resources owned by `to_org_id`.
    /// Same-org access short-circuits without a store lookup.
    pub async fn can_org_access_org(&self, from_org_id: i64, to_org_id: i64) -> Result<bool> {
        if from_org_id == to_org_id {
            return Ok(true);
        }
        Ok(self.reachable_org_ids(from_org_id).await?.contains(&to_org_id))
    }

    /// True if the organization exists and has at least one child.
    pub async fn is_parent_org(&self, org_id: i64) -> Result<bool> {
        Ok(self
            .orgs
            .get_org_with_children(org_id)
            .await?
            .is_some_and(|node| !node.children.is_empty()))
    }

    /// True if `candidate_id` is a direct child of `parent_org_id`.
    pub async fn is_child_org_of(&self, parent_org_id: i64, candidate_id: i64) -> Result<bool> {
        Ok(self
            .orgs
            .get_org_with_children(parent_org_id)
            .await?
            .is_some_and(|node| node.child_ids().any(|id| id == candidate_id)))
    }
}
