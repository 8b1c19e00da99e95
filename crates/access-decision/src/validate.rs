//! Boundary validation for untyped input.
//!
//! Converts `serde_json::Value` input into typed tables, enforcing the
//! argument contract of an access check:
//! - role and action must be strings
//! - the permission table must be an object of action arrays
//! - a hierarchy that is missing or malformed counts as no hierarchy
//!
//! The asymmetry between the last two rules is part of the contract.

use serde_json::{Map, Value};
use tracing::warn;

use crate::engine::evaluate;
use crate::error::{AccessError, AccessResult};
use crate::grants::GrantSet;
use crate::tables::{PermissionTable, RoleHierarchy};

/// Message for a non-string role or action.
pub const ROLE_ACTION_MUST_BE_STRINGS: &str = "role and action must be a string";

/// Message for a missing or non-object permission table.
pub const ROLES_MUST_BE_OBJECT: &str = "roles must be an object";

/// Message for a malformed role hierarchy (strict loading only).
pub const HIERARCHY_MUST_BE_OBJECT: &str = "role hierarchy must be an object of parent role arrays";

/// Check whether `role` is authorized for `action`, from untyped input.
///
/// # Errors
///
/// [`AccessError::InvalidArgument`] when `role` or `action` is not a string,
/// or when `permissions` is not a valid permission table. A malformed
/// `hierarchy` is logged and ignored instead.
///
/// # Example
///
/// ```
/// use access_decision::evaluate_value;
/// use serde_json::json;
///
/// let roles = json!({"admin": ["*"], "user": ["read"]});
/// assert!(evaluate_value(&json!("admin"), &json!("delete"), &roles, None).unwrap());
///
/// let err = evaluate_value(&json!(123), &json!("read"), &roles, None).unwrap_err();
/// assert_eq!(err.to_string(), "Invalid input: role and action must be a string");
///
/// let err = evaluate_value(&json!("user"), &json!("read"), &json!(null), None).unwrap_err();
/// assert_eq!(err.to_string(), "Invalid input: roles must be an object");
/// ```
pub fn evaluate_value(
    role: &Value,
    action: &Value,
    permissions: &Value,
    hierarchy: Option<&Value>,
) -> AccessResult<bool> {
    let (Some(role), Some(action)) = (role.as_str(), action.as_str()) else {
        return Err(AccessError::invalid_argument(ROLE_ACTION_MUST_BE_STRINGS));
    };
    let permissions = PermissionTable::from_value(permissions)?;
    let hierarchy = hierarchy.and_then(RoleHierarchy::from_value_lenient);

    Ok(evaluate(role, action, &permissions, hierarchy.as_ref()))
}

impl PermissionTable {
    /// Build a permission table from an untyped JSON object.
    ///
    /// Every entry must be an array of strings. A `null` entry is treated as if
    /// the role were absent.
    pub fn from_value(value: &Value) -> AccessResult<Self> {
        let Some(object) = value.as_object() else {
            return Err(AccessError::invalid_argument(ROLES_MUST_BE_OBJECT));
        };

        let mut table = PermissionTable::new();
        for (role, entry) in object {
            if entry.is_null() {
                continue;
            }
            let actions = string_array(entry).ok_or_else(|| {
                AccessError::invalid_argument(format!(
                    "permissions for role `{role}` must be an array of strings"
                ))
            })?;
            table.insert(role.as_str(), GrantSet::from_actions(actions));
        }
        Ok(table)
    }
}

impl RoleHierarchy {
    /// Build a role hierarchy from an untyped JSON object.
    ///
    /// Every entry must be an array of strings; a `null` entry means no parents.
    pub fn from_value(value: &Value) -> AccessResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| AccessError::invalid_argument(HIERARCHY_MUST_BE_OBJECT))?;
        parse_hierarchy(object).ok_or_else(|| AccessError::invalid_argument(HIERARCHY_MUST_BE_OBJECT))
    }

    /// Like [`RoleHierarchy::from_value`], but a malformed hierarchy becomes
    /// `None` (no hierarchy) instead of an error.
    pub fn from_value_lenient(value: &Value) -> Option<Self> {
        match Self::from_value(value) {
            Ok(hierarchy) => Some(hierarchy),
            Err(e) => {
                warn!(error = %e, "Ignoring malformed role hierarchy");
                None
            }
        }
    }
}

fn parse_hierarchy(object: &Map<String, Value>) -> Option<RoleHierarchy> {
    let mut hierarchy = RoleHierarchy::new();
    for (role, entry) in object {
        if entry.is_null() {
            continue;
        }
        hierarchy.set_parents(role.as_str(), string_array(entry)?);
    }
    Some(hierarchy)
}

fn string_array(value: &Value) -> Option<Vec<&str>> {
    value.as_array()?.iter().map(Value::as_str).collect()
}
