//! # Tables
//!
//! Caller-owned lookup tables consulted by the decision engine:
//! - [`PermissionTable`]: role → directly granted actions
//! - [`RoleHierarchy`]: role → ordered parent roles
//!
//! Both serialize as plain JSON objects so they can be loaded from
//! configuration without an intermediate representation.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::grants::GrantSet;

/// Direct grants keyed by role.
///
/// A role missing from the table has no direct grants. Lookups never create
/// entries.
///
/// # Example
///
/// ```
/// use access_decision::tables::PermissionTable;
///
/// let table = PermissionTable::new()
///     .with_role("admin", ["*"])
///     .with_role("user", ["read"]);
///
/// assert!(table.get("admin").unwrap().is_wildcard());
/// assert!(table.get("guest").is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTable {
    roles: HashMap<String, GrantSet>,
}

impl PermissionTable {
    /// Create an empty permission table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`PermissionTable::grant_all`].
    pub fn with_role<I, S>(mut self, role: impl Into<String>, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.grant_all(role, actions);
        self
    }

    /// Grant a single action to a role, creating the role entry if needed.
    pub fn grant(&mut self, role: impl Into<String>, action: impl Into<String>) {
        self.roles.entry(role.into()).or_default().grant(action);
    }

    /// Grant several actions to a role, creating the role entry if needed.
    ///
    /// Passing an empty iterator still registers the role, with no grants.
    pub fn grant_all<I, S>(&mut self, role: impl Into<String>, actions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = self.roles.entry(role.into()).or_default();
        for action in actions {
            entry.grant(action);
        }
    }

    /// Replace a role's grant set.
    ///
    /// # Returns
    ///
    /// The previous grant set, if the role was present
    pub fn insert(&mut self, role: impl Into<String>, grants: GrantSet) -> Option<GrantSet> {
        self.roles.insert(role.into(), grants)
    }

    /// Look up a role's direct grants.
    pub fn get(&self, role: &str) -> Option<&GrantSet> {
        self.roles.get(role)
    }

    /// Check if the role has an entry (possibly empty).
    pub fn contains_role(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// Iterate the roles in the table, in no particular order.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    /// Number of roles.
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl<R: Into<String>> FromIterator<(R, GrantSet)> for PermissionTable {
    fn from_iter<T: IntoIterator<Item = (R, GrantSet)>>(iter: T) -> Self {
        Self {
            roles: iter.into_iter().map(|(role, grants)| (role.into(), grants)).collect(),
        }
    }
}

/// Parent roles keyed by role.
///
/// Parent order is preserved; it decides the order in which inherited grants
/// are searched. A role with no entry, or an empty entry, has no parents.
/// Cycles are representable and are tolerated by every traversal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleHierarchy {
    parents: HashMap<String, Vec<String>>,
}

impl RoleHierarchy {
    /// Create an empty hierarchy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`RoleHierarchy::set_parents`].
    pub fn with_parents<I, S>(mut self, role: impl Into<String>, parents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set_parents(role, parents);
        self
    }

    /// Replace a role's parent list.
    pub fn set_parents<I, S>(&mut self, role: impl Into<String>, parents: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.parents
            .insert(role.into(), parents.into_iter().map(Into::into).collect());
    }

    /// Append a parent to a role's parent list.
    pub fn add_parent(&mut self, role: impl Into<String>, parent: impl Into<String>) {
        self.parents.entry(role.into()).or_default().push(parent.into());
    }

    /// Parents of `role` in declared order. Empty when the role has no entry.
    pub fn parents(&self, role: &str) -> &[String] {
        self.parents.get(role).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of roles with an entry.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// All roles reachable from `role` through parent links.
    ///
    /// Roles are listed depth-first in declared parent order, each at most
    /// once. `role` itself is excluded even when a cycle leads back to it.
    ///
    /// # Example
    ///
    /// ```
    /// use access_decision::tables::RoleHierarchy;
    ///
    /// let hierarchy = RoleHierarchy::new()
    ///     .with_parents("manager", ["supervisor", "user"])
    ///     .with_parents("user", ["supervisor"]);
    ///
    /// assert_eq!(hierarchy.ancestors("manager"), vec!["supervisor", "user"]);
    /// assert!(hierarchy.ancestors("supervisor").is_empty());
    /// ```
    pub fn ancestors(&self, role: &str) -> Vec<String> {
        let mut seen: HashSet<&str> = HashSet::from([role]);
        let mut lineage = Vec::new();
        let mut pending: Vec<&str> = self.parents(role).iter().rev().map(String::as_str).collect();

        while let Some(current) = pending.pop() {
            if !seen.insert(current) {
                continue;
            }
            lineage.push(current.to_string());
            pending.extend(
                self.parents(current)
                    .iter()
                    .rev()
                    .map(String::as_str)
                    .filter(|parent| !seen.contains(parent)),
            );
        }

        lineage
    }

    /// Find one inheritance cycle, if the hierarchy contains any.
    ///
    /// Roles are examined in sorted order so the reported cycle is stable.
    ///
    /// # Returns
    ///
    /// The cycle as a path that starts and ends on the same role
    /// (e.g. `["a", "b", "a"]`), or `None` for an acyclic hierarchy
    pub fn find_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            OnPath,
            Done,
        }

        let mut marks: HashMap<&str, Mark> = HashMap::new();
        let mut roots: Vec<&str> = self.parents.keys().map(String::as_str).collect();
        roots.sort_unstable();

        for root in roots {
            if marks.contains_key(root) {
                continue;
            }
            marks.insert(root, Mark::OnPath);
            // (role, index of the next parent to examine)
            let mut path: Vec<(&str, usize)> = vec![(root, 0)];

            while let Some(&(role, next)) = path.last() {
                let Some(parent) = self.parents(role).get(next) else {
                    marks.insert(role, Mark::Done);
                    path.pop();
                    continue;
                };
                let parent = parent.as_str();
                if let Some(top) = path.last_mut() {
                    top.1 += 1;
                }

                match marks.get(parent) {
                    Some(Mark::OnPath) => {
                        let start = path.iter().position(|(r, _)| *r == parent).unwrap_or(0);
                        let mut cycle: Vec<String> =
                            path[start..].iter().map(|(r, _)| r.to_string()).collect();
                        cycle.push(parent.to_string());
                        return Some(cycle);
                    }
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(parent, Mark::OnPath);
                        path.push((parent, 0));
                    }
                }
            }
        }

        None
    }
}

impl<R, P, S> FromIterator<(R, P)> for RoleHierarchy
where
    R: Into<String>,
    P: IntoIterator<Item = S>,
    S: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (R, P)>>(iter: T) -> Self {
        let mut hierarchy = Self::new();
        for (role, parents) in iter {
            hierarchy.set_parents(role, parents);
        }
        hierarchy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_table_builders() {
        let mut table = PermissionTable::new().with_role("user", ["read"]);
        table.grant("user", "comment");
        table.grant_all("auditor", Vec::<String>::new());

        assert_eq!(table.len(), 2);
        assert!(table.get("user").unwrap().allows("comment"));
        assert!(table.contains_role("auditor"));
        assert!(table.get("auditor").unwrap().is_empty());
        assert!(!table.contains_role("guest"));
    }

    #[test]
    fn test_permission_table_insert_replaces() {
        let mut table = PermissionTable::new().with_role("user", ["read"]);
        let previous = table.insert("user", GrantSet::wildcard());
        assert_eq!(previous, Some(GrantSet::from_actions(["read"])));
        assert!(table.get("user").unwrap().is_wildcard());
    }

    #[test]
    fn test_permission_table_from_json() {
        let table: PermissionTable =
            serde_json::from_str(r#"{"admin": ["*"], "user": ["read"], "nobody": []}"#).unwrap();
        assert_eq!(table.len(), 3);
        assert!(table.get("admin").unwrap().is_wildcard());
        assert!(table.get("nobody").unwrap().is_empty());
    }

    #[test]
    fn test_parents_default_to_empty() {
        let hierarchy = RoleHierarchy::new().with_parents("manager", ["supervisor", "user"]);
        assert_eq!(hierarchy.parents("manager"), ["supervisor", "user"]);
        assert!(hierarchy.parents("user").is_empty());
    }

    #[test]
    fn test_add_parent_preserves_order() {
        let mut hierarchy = RoleHierarchy::new();
        hierarchy.add_parent("lead", "engineer");
        hierarchy.add_parent("lead", "reviewer");
        assert_eq!(hierarchy.parents("lead"), ["engineer", "reviewer"]);
    }

    #[test]
    fn test_ancestors_depth_first_without_duplicates() {
        let hierarchy: RoleHierarchy = [
            ("a", vec!["b", "c"]),
            ("b", vec!["d"]),
            ("c", vec!["d", "e"]),
        ]
        .into_iter()
        .collect();

        assert_eq!(hierarchy.ancestors("a"), vec!["b", "d", "c", "e"]);
        assert_eq!(hierarchy.ancestors("c"), vec!["d", "e"]);
        assert!(hierarchy.ancestors("unknown").is_empty());
    }

    #[test]
    fn test_ancestors_tolerates_cycles() {
        let hierarchy = RoleHierarchy::new()
            .with_parents("a", ["b"])
            .with_parents("b", ["c"])
            .with_parents("c", ["a"]);

        assert_eq!(hierarchy.ancestors("a"), vec!["b", "c"]);
        assert_eq!(hierarchy.ancestors("b"), vec!["c", "a"]);
    }

    #[test]
    fn test_find_cycle_none_for_acyclic() {
        let hierarchy = RoleHierarchy::new()
            .with_parents("manager", ["supervisor", "user"])
            .with_parents("user", ["supervisor"]);
        assert_eq!(hierarchy.find_cycle(), None);
    }

    #[test]
    fn test_find_cycle_reports_path() {
        let hierarchy = RoleHierarchy::new()
            .with_parents("a", ["b"])
            .with_parents("b", ["c"])
            .with_parents("c", ["a"]);
        assert_eq!(
            hierarchy.find_cycle(),
            Some(vec!["a".to_string(), "b".to_string(), "c".to_string(), "a".to_string()])
        );
    }

    #[test]
    fn test_find_cycle_self_parent() {
        let hierarchy = RoleHierarchy::new().with_parents("loop", ["loop"]);
        assert_eq!(hierarchy.find_cycle(), Some(vec!["loop".to_string(), "loop".to_string()]));
    }

    #[test]
    fn test_hierarchy_from_json() {
        let hierarchy: RoleHierarchy =
            serde_json::from_str(r#"{"manager": ["supervisor", "user"], "user": []}"#).unwrap();
        assert_eq!(hierarchy.len(), 2);
        assert_eq!(hierarchy.parents("manager"), ["supervisor", "user"]);
    }
}
