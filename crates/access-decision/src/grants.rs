//! # Grants
//!
//! The set of actions a single role is granted directly.
//! A grant set is either the wildcard (every action) or an explicit set of actions.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Reserved action literal meaning "every action is granted".
pub const WILDCARD: &str = "*";

/// Actions granted directly to a role.
///
/// The wildcard is modelled as its own variant rather than as a magic string
/// inside the action set. On the wire a grant set is still a plain list of
/// action strings, where `"*"` selects [`GrantSet::Wildcard`].
///
/// # Example
///
/// ```
/// use access_decision::grants::GrantSet;
///
/// let editor = GrantSet::from_actions(["read", "update"]);
/// assert!(editor.allows("read"));
/// assert!(!editor.allows("delete"));
///
/// // The wildcard subsumes any explicit actions listed next to it
/// let admin = GrantSet::from_actions(["read", "*"]);
/// assert!(admin.is_wildcard());
/// assert!(admin.allows("delete"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum GrantSet {
    /// Every action is granted.
    Wildcard,

    /// Only the listed actions are granted.
    Actions(HashSet<String>),
}

impl Default for GrantSet {
    fn default() -> Self {
        GrantSet::Actions(HashSet::new())
    }
}

impl GrantSet {
    /// Create an empty grant set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a grant set that allows every action.
    pub fn wildcard() -> Self {
        GrantSet::Wildcard
    }

    /// Build a grant set from action identifiers.
    ///
    /// Any occurrence of [`WILDCARD`] turns the whole set into [`GrantSet::Wildcard`].
    pub fn from_actions<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for action in actions {
            set.grant(action);
        }
        set
    }

    /// Grant a single action.
    ///
    /// Granting [`WILDCARD`] discards the explicit actions, since the wildcard
    /// already covers them. Granting anything to a wildcard set is a no-op.
    ///
    /// # Arguments
    ///
    /// * `action` - The action identifier to grant
    pub fn grant(&mut self, action: impl Into<String>) {
        let action = action.into();
        if action == WILDCARD {
            *self = GrantSet::Wildcard;
            return;
        }
        if let GrantSet::Actions(actions) = self {
            actions.insert(action);
        }
    }

    /// Check whether this set authorizes `action`.
    ///
    /// # Returns
    ///
    /// `true` if the set is the wildcard or explicitly contains `action`
    pub fn allows(&self, action: &str) -> bool {
        match self {
            GrantSet::Wildcard => true,
            GrantSet::Actions(actions) => actions.contains(action),
        }
    }

    /// Check if this is the wildcard grant.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, GrantSet::Wildcard)
    }

    /// Number of entries as they would be listed: one for the wildcard,
    /// otherwise the count of explicit actions.
    pub fn len(&self) -> usize {
        match self {
            GrantSet::Wildcard => 1,
            GrantSet::Actions(actions) => actions.len(),
        }
    }

    /// Check if no action is granted.
    pub fn is_empty(&self) -> bool {
        match self {
            GrantSet::Wildcard => false,
            GrantSet::Actions(actions) => actions.is_empty(),
        }
    }

    /// Iterate the explicit actions. A wildcard set yields nothing.
    pub fn actions(&self) -> impl Iterator<Item = &str> {
        let actions = match self {
            GrantSet::Wildcard => None,
            GrantSet::Actions(actions) => Some(actions.iter().map(String::as_str)),
        };
        actions.into_iter().flatten()
    }

    /// Merge another grant set into this one.
    ///
    /// # Arguments
    ///
    /// * `other` - The grant set to merge
    pub fn merge(&mut self, other: &GrantSet) {
        match other {
            GrantSet::Wildcard => *self = GrantSet::Wildcard,
            GrantSet::Actions(actions) => {
                for action in actions {
                    self.grant(action.as_str());
                }
            }
        }
    }
}

impl From<Vec<String>> for GrantSet {
    fn from(actions: Vec<String>) -> Self {
        GrantSet::from_actions(actions)
    }
}

impl From<GrantSet> for Vec<String> {
    fn from(set: GrantSet) -> Self {
        match set {
            GrantSet::Wildcard => vec![WILDCARD.to_string()],
            GrantSet::Actions(actions) => {
                let mut actions: Vec<String> = actions.into_iter().collect();
                actions.sort();
                actions
            }
        }
    }
}

impl<S: Into<String>> FromIterator<S> for GrantSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        GrantSet::from_actions(iter)
    }
}
