//! # Access Decision Engine
//!
//! Decides whether a role may perform an action, either through its own
//! grants or through grants inherited from parent roles.
//!
//! ## Resolution order
//!
//! For each role visited:
//! 1. **Direct check**: the role's grant set contains the wildcard or the action.
//! 2. **Inherited check**: only when the direct check fails and a hierarchy is
//!    supplied. Parents are searched depth-first in declared order and the
//!    search stops at the first role that grants the action.
//!
//! A role with no entry in the permission table is denied and its parents are
//! not consulted. This holds for the queried role and for every ancestor
//! reached along the way.
//!
//! The traversal is an explicit worklist with a visited set. Every role is
//! examined at most once, so cyclic hierarchies terminate and deep ones cannot
//! overflow the stack.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, trace};

use crate::grants::GrantSet;
use crate::tables::{PermissionTable, RoleHierarchy};

/// Outcome of an access check, including which role supplied the grant.
///
/// # Example
///
/// ```
/// use access_decision::{AccessDecisionEngine, PermissionTable, RoleHierarchy};
///
/// let engine = AccessDecisionEngine::new(
///     PermissionTable::new()
///         .with_role("supervisor", ["view_reports"])
///         .with_role("manager", ["create"]),
/// )
/// .with_hierarchy(RoleHierarchy::new().with_parents("manager", ["supervisor"]));
///
/// let decision = engine.decide("manager", "view_reports");
/// assert!(decision.granted);
/// assert_eq!(decision.granted_by.as_deref(), Some("supervisor"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    /// Whether the action is authorized.
    pub granted: bool,

    /// The role whose grant set authorized the action.
    /// Either the queried role or one of its ancestors; `None` when denied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub granted_by: Option<String>,
}

impl Decision {
    /// A denial.
    pub fn denied() -> Self {
        Self {
            granted: false,
            granted_by: None,
        }
    }

    /// A grant supplied by `role`.
    pub fn granted_by(role: impl Into<String>) -> Self {
        Self {
            granted: true,
            granted_by: Some(role.into()),
        }
    }

    /// Check if the grant came from an ancestor rather than the queried role.
    pub fn is_inherited(&self, queried_role: &str) -> bool {
        self.granted_by.as_deref().is_some_and(|role| role != queried_role)
    }
}

/// Check whether `role` is authorized for `action`.
///
/// Unknown roles, unknown actions and empty grant sets all yield `false`.
/// This never fails: the argument types already guarantee a string role,
/// a string action and a keyed permission table. Use
/// [`evaluate_value`](crate::validate::evaluate_value) for untyped input.
///
/// # Arguments
///
/// * `role` - The role to check
/// * `action` - The action requested
/// * `permissions` - Direct grants per role
/// * `hierarchy` - Optional parent roles per role
///
/// # Example
///
/// ```
/// use access_decision::{evaluate, PermissionTable, RoleHierarchy};
///
/// let table = PermissionTable::new()
///     .with_role("admin", ["*"])
///     .with_role("user", ["read"])
///     .with_role("supervisor", ["view_reports", "edit_users"]);
/// let hierarchy = RoleHierarchy::new().with_parents("user", ["supervisor"]);
///
/// assert!(evaluate("admin", "delete", &table, None));
/// assert!(!evaluate("user", "delete", &table, None));
/// assert!(evaluate("user", "view_reports", &table, Some(&hierarchy)));
/// assert!(!evaluate("guest", "read", &table, Some(&hierarchy)));
/// ```
pub fn evaluate(
    role: &str,
    action: &str,
    permissions: &PermissionTable,
    hierarchy: Option<&RoleHierarchy>,
) -> bool {
    resolve(role, action, permissions, hierarchy).granted
}

/// Like [`evaluate`], but reports which role supplied the grant.
pub fn resolve(
    role: &str,
    action: &str,
    permissions: &PermissionTable,
    hierarchy: Option<&RoleHierarchy>,
) -> Decision {
    let granting = walk(role, permissions, hierarchy, |_, grants| grants.allows(action));

    let decision = match granting {
        Some(granting_role) => Decision::granted_by(granting_role),
        None => Decision::denied(),
    };
    debug!(
        role = %role,
        action = %action,
        granted = decision.granted,
        granted_by = ?decision.granted_by,
        "Access decision"
    );
    decision
}

/// Visit `role` and then, if a hierarchy is supplied, its ancestors in
/// depth-first declared order, calling `stop` with each visited role's grant
/// set until it returns `true`.
///
/// Roles absent from the permission table are skipped without expanding their
/// parents.
///
/// # Returns
///
/// The role at which `stop` returned `true`, if any
fn walk<'a, F>(
    role: &'a str,
    permissions: &'a PermissionTable,
    hierarchy: Option<&'a RoleHierarchy>,
    mut stop: F,
) -> Option<&'a str>
where
    F: FnMut(&'a str, &'a GrantSet) -> bool,
{
    let mut visited: HashSet<&str> = HashSet::new();
    let mut pending: Vec<&str> = vec![role];

    while let Some(current) = pending.pop() {
        if !visited.insert(current) {
            trace!(role = %current, "Role already visited, skipping");
            continue;
        }

        let Some(grants) = permissions.get(current) else {
            trace!(role = %current, "Role has no permission entry");
            continue;
        };
        trace!(role = %current, grants = grants.len(), "Checking direct grants");

        if stop(current, grants) {
            return Some(current);
        }

        if let Some(hierarchy) = hierarchy {
            // Reversed so the first declared parent is popped first.
            for parent in hierarchy.parents(current).iter().rev() {
                let parent = parent.as_str();
                if !visited.contains(parent) {
                    pending.push(parent);
                }
            }
        }
    }

    None
}

/// Access decisions over an owned permission table and optional hierarchy.
///
/// The engine is an immutable snapshot: it is `Send + Sync` and can be shared
/// across threads or tasks behind an `Arc`. Rebuild it to pick up policy
/// changes.
///
/// # Example
///
/// ```
/// use access_decision::{AccessDecisionEngine, PermissionTable, RoleHierarchy};
///
/// let engine = AccessDecisionEngine::new(
///     PermissionTable::new()
///         .with_role("manager", ["create", "read", "update", "delete"])
///         .with_role("user", ["read"])
///         .with_role("supervisor", ["view_reports", "edit_users"]),
/// )
/// .with_hierarchy(
///     RoleHierarchy::new()
///         .with_parents("manager", ["supervisor", "user"])
///         .with_parents("user", ["supervisor"]),
/// );
///
/// assert!(engine.is_allowed("manager", "view_reports"));
/// assert!(!engine.is_allowed("user", "create"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AccessDecisionEngine {
    permissions: PermissionTable,
    hierarchy: Option<RoleHierarchy>,
}

impl AccessDecisionEngine {
    /// Create an engine without a role hierarchy.
    pub fn new(permissions: PermissionTable) -> Self {
        Self {
            permissions,
            hierarchy: None,
        }
    }

    /// Attach a role hierarchy.
    pub fn with_hierarchy(mut self, hierarchy: RoleHierarchy) -> Self {
        self.hierarchy = Some(hierarchy);
        self
    }

    /// The permission table this engine decides against.
    pub fn permissions(&self) -> &PermissionTable {
        &self.permissions
    }

    /// The role hierarchy, if one was attached.
    pub fn hierarchy(&self) -> Option<&RoleHierarchy> {
        self.hierarchy.as_ref()
    }

    /// Check whether `role` is authorized for `action`.
    pub fn is_allowed(&self, role: &str, action: &str) -> bool {
        self.decide(role, action).granted
    }

    /// Decide whether `role` is authorized for `action`, with provenance.
    pub fn decide(&self, role: &str, action: &str) -> Decision {
        resolve(role, action, &self.permissions, self.hierarchy.as_ref())
    }

    /// Roles `role` inherits from, depth-first in declared order.
    ///
    /// Purely structural: roles without a permission entry are still listed.
    pub fn ancestors(&self, role: &str) -> Vec<String> {
        self.hierarchy
            .as_ref()
            .map(|hierarchy| hierarchy.ancestors(role))
            .unwrap_or_default()
    }

    /// Every action `role` is authorized for, direct and inherited.
    ///
    /// Follows the same visiting rules as [`AccessDecisionEngine::decide`], so
    /// for any action `a`, `effective_grants(r).allows(a)` equals
    /// `is_allowed(r, a)`.
    pub fn effective_grants(&self, role: &str) -> GrantSet {
        let mut effective = GrantSet::new();
        walk(role, &self.permissions, self.hierarchy.as_ref(), |_, grants| {
            effective.merge(grants);
            effective.is_wildcard()
        });
        effective
    }
}
