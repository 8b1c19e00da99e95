//! Policy configuration.
//!
//! Locates and loads the JSON policy document that supplies the permission
//! table and role hierarchy. Configuration is read from environment variables.
//!
//! Policy document format:
//!
//! ```json
//! {
//!   "roles": {
//!     "admin": ["*"],
//!     "user": ["read"],
//!     "supervisor": ["view_reports", "edit_users"]
//!   },
//!   "hierarchy": {
//!     "user": ["supervisor"]
//!   }
//! }
//! ```
//!
//! `hierarchy` is optional.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::engine::AccessDecisionEngine;
use crate::error::{AccessError, AccessResult};
use crate::tables::{PermissionTable, RoleHierarchy};
use crate::validate::ROLES_MUST_BE_OBJECT;

/// Environment variable holding the policy file path.
pub const POLICY_PATH_ENV: &str = "ACCESS_POLICY_PATH";

/// Environment variable enabling strict hierarchy validation.
pub const STRICT_HIERARCHY_ENV: &str = "ACCESS_POLICY_STRICT_HIERARCHY";

/// Where to load the policy from and how strictly to validate it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Path of the JSON policy document.
    pub path: Option<PathBuf>,

    /// Reject a malformed hierarchy instead of dropping it.
    pub strict_hierarchy: bool,
}

impl PolicyConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `ACCESS_POLICY_PATH`: policy file path (required by [`PolicyConfig::load`])
    /// - `ACCESS_POLICY_STRICT_HIERARCHY`: reject malformed hierarchies (default: false)
    pub fn from_env() -> Self {
        Self {
            path: std::env::var_os(POLICY_PATH_ENV).map(PathBuf::from),
            strict_hierarchy: std::env::var(STRICT_HIERARCHY_ENV)
                .map(|s| s == "true" || s == "1")
                .unwrap_or(false),
        }
    }

    /// Load the configured policy.
    ///
    /// # Errors
    ///
    /// [`AccessError::MissingEnvVar`] when no path is configured, otherwise
    /// any error from [`Policy::load`].
    pub fn load(&self) -> AccessResult<Policy> {
        let path = self
            .path
            .as_deref()
            .ok_or_else(|| AccessError::MissingEnvVar(POLICY_PATH_ENV.to_string()))?;
        Policy::load(path, self.strict_hierarchy)
    }
}

/// A validated permission table and optional hierarchy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Policy {
    /// Direct grants per role.
    pub permissions: PermissionTable,

    /// Parent roles per role.
    pub hierarchy: Option<RoleHierarchy>,
}

impl Policy {
    /// Read and validate a policy file.
    pub fn load(path: &Path, strict_hierarchy: bool) -> AccessResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| AccessError::PolicyLoad {
            path: path.display().to_string(),
            source,
        })?;
        let policy = Self::from_json_str(&contents, strict_hierarchy)?;

        info!(
            path = %path.display(),
            roles = policy.permissions.len(),
            hierarchy_entries = policy.hierarchy.as_ref().map_or(0, RoleHierarchy::len),
            "Loaded access policy"
        );
        Ok(policy)
    }

    /// Parse and validate a policy document.
    pub fn from_json_str(json: &str, strict_hierarchy: bool) -> AccessResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(&value, strict_hierarchy)
    }

    /// Validate an already-parsed policy document.
    ///
    /// `roles` goes through the same checks as an access-check argument.
    /// A malformed `hierarchy` is dropped unless `strict_hierarchy` is set.
    /// Cycles are allowed and only reported through a warning.
    pub fn from_value(value: &Value, strict_hierarchy: bool) -> AccessResult<Self> {
        let document = value
            .as_object()
            .ok_or_else(|| AccessError::invalid_argument("policy document must be an object"))?;
        let roles = document
            .get("roles")
            .ok_or_else(|| AccessError::invalid_argument(ROLES_MUST_BE_OBJECT))?;
        let permissions = PermissionTable::from_value(roles)?;

        let hierarchy = match document.get("hierarchy") {
            None | Some(Value::Null) => None,
            Some(raw) if strict_hierarchy => Some(RoleHierarchy::from_value(raw)?),
            Some(raw) => RoleHierarchy::from_value_lenient(raw),
        };

        if let Some(cycle) = hierarchy.as_ref().and_then(RoleHierarchy::find_cycle) {
            warn!(cycle = %cycle.join(" -> "), "Role hierarchy contains a cycle");
        }

        Ok(Self {
            permissions,
            hierarchy,
        })
    }

    /// Build a decision engine over this policy.
    pub fn into_engine(self) -> AccessDecisionEngine {
        let engine = AccessDecisionEngine::new(self.permissions);
        match self.hierarchy {
            Some(hierarchy) => engine.with_hierarchy(hierarchy),
            None => engine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const POLICY: &str = r#"{
        "roles": {
            "admin": ["*"],
            "manager": ["create", "read", "update", "delete"],
            "user": ["read"],
            "supervisor": ["view_reports", "edit_users"]
        },
        "hierarchy": {
            "manager": ["supervisor", "user"],
            "user": ["supervisor"]
        }
    }"#;

    #[test]
    fn test_from_json_str() {
        let policy = Policy::from_json_str(POLICY, false).unwrap();
        assert_eq!(policy.permissions.len(), 4);
        assert_eq!(policy.hierarchy.as_ref().map(RoleHierarchy::len), Some(2));

        let engine = policy.into_engine();
        assert!(engine.is_allowed("manager", "view_reports"));
        assert!(!engine.is_allowed("user", "create"));
    }

    #[test]
    fn test_hierarchy_optional() {
        let policy = Policy::from_json_str(r#"{"roles": {"user": ["read"]}}"#, true).unwrap();
        assert!(policy.hierarchy.is_none());
    }

    #[test]
    fn test_missing_roles_rejected() {
        let err = Policy::from_json_str(r#"{"hierarchy": {}}"#, false).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: roles must be an object");

        let err = Policy::from_json_str(r#"{"roles": null}"#, false).unwrap_err();
        assert_eq!(err.to_string(), "Invalid input: roles must be an object");
    }

    #[test]
    fn test_non_object_document_rejected() {
        let err = Policy::from_json_str("[]", false).unwrap_err();
        assert!(err.is_caller_error());
    }

    #[test]
    fn test_invalid_json_rejected() {
        let err = Policy::from_json_str("{\"roles\": ", false).unwrap_err();
        assert!(matches!(err, AccessError::PolicyParse(_)));
    }

    #[test]
    fn test_malformed_hierarchy_lenient_vs_strict() {
        let doc = r#"{"roles": {"user": ["read"]}, "hierarchy": {"user": "supervisor"}}"#;

        let policy = Policy::from_json_str(doc, false).unwrap();
        assert!(policy.hierarchy.is_none());

        let err = Policy::from_json_str(doc, true).unwrap_err();
        assert!(matches!(err, AccessError::InvalidArgument(_)));
    }

    #[test]
    fn test_cyclic_hierarchy_accepted() {
        let doc = r#"{"roles": {"a": ["x"], "b": ["y"]}, "hierarchy": {"a": ["b"], "b": ["a"]}}"#;
        let engine = Policy::from_json_str(doc, true).unwrap().into_engine();
        assert!(engine.is_allowed("a", "y"));
        assert!(engine.is_allowed("b", "x"));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(POLICY.as_bytes()).unwrap();

        let config = PolicyConfig {
            path: Some(file.path().to_path_buf()),
            strict_hierarchy: true,
        };
        let engine = config.load().unwrap().into_engine();
        assert!(engine.is_allowed("admin", "anything"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Policy::load(&dir.path().join("absent.json"), false).unwrap_err();
        assert!(matches!(err, AccessError::PolicyLoad { .. }));
    }

    #[test]
    fn test_load_without_path() {
        let err = PolicyConfig::default().load().unwrap_err();
        assert!(matches!(err, AccessError::MissingEnvVar(ref var) if var == POLICY_PATH_ENV));
    }

    #[test]
    fn test_from_env() {
        std::env::set_var(POLICY_PATH_ENV, "/etc/access/policy.json");
        std::env::set_var(STRICT_HIERARCHY_ENV, "1");
        let config = PolicyConfig::from_env();
        std::env::remove_var(POLICY_PATH_ENV);
        std::env::remove_var(STRICT_HIERARCHY_ENV);

        assert_eq!(config.path, Some(PathBuf::from("/etc/access/policy.json")));
        assert!(config.strict_hierarchy);
    }
}
