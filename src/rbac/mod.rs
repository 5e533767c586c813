//! Role-based access control over a two-level organization hierarchy.
//!
//! This module is the authorization core consulted by every resource
//! service:
//! - **Role model** ([`role`]): the fixed `SystemAdmin > Owner > Admin >
//!   Viewer` capability ordering.
//! - **Hierarchy resolver** ([`hierarchy`]): which organizations a caller
//!   anchored at one organization may reach.
//! - **Decision engine** ([`engine`]): per-operation allow/deny and the
//!   scoping predicate for list queries.
//!
//! Decisions are deny-by-default: a missing or unrecognized role always
//! denies, and a missing organization degrades to self-only reach. Nothing
//! here raises for malformed input.

pub mod engine;
pub mod hierarchy;
pub mod role;

pub use engine::{AccessContext, AccessDecision, AccessDecisionEngine, TaskListPredicate};
pub use hierarchy::HierarchyResolver;
pub use role::Role;
