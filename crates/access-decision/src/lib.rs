//! # Access Decision
//!
//! Allow-only role-based access control with wildcard grants and multi-parent
//! role inheritance.
//!
//! ## Overview
//!
//! The access-decision crate handles:
//! - **Grants**: The actions a role is granted directly, or the `*` wildcard
//! - **Tables**: Caller-owned permission table and role hierarchy
//! - **Engine**: Direct and inherited access checks
//! - **Validation**: Argument checks for untyped (JSON) input
//! - **Config**: Loading a policy document from disk
//!
//! ## Model
//!
//! ```text
//! Permission table: role -> [action | "*"]
//! Role hierarchy:   role -> [parent role, ...]
//!
//! Example:
//!   admin      -> ["*"]
//!   manager    -> ["create", "read", "update", "delete"]
//!   user       -> ["read"]
//!   supervisor -> ["view_reports", "edit_users"]
//!
//!   manager inherits from [supervisor, user]
//!   user    inherits from [supervisor]
//! ```
//!
//! A role is authorized when its own grants contain the action or the
//! wildcard, or when any ancestor is authorized. There are no deny rules and
//! no resource scoping. Unknown roles are denied rather than rejected.
//!
//! ## Usage
//!
//! ```rust
//! use access_decision::{evaluate, PermissionTable, RoleHierarchy};
//!
//! let table = PermissionTable::new()
//!     .with_role("admin", ["*"])
//!     .with_role("manager", ["create", "read", "update", "delete"])
//!     .with_role("user", ["read"])
//!     .with_role("supervisor", ["view_reports", "edit_users"]);
//!
//! let hierarchy = RoleHierarchy::new()
//!     .with_parents("manager", ["supervisor", "user"])
//!     .with_parents("user", ["supervisor"]);
//!
//! assert!(evaluate("admin", "delete", &table, None));
//! assert!(!evaluate("user", "delete", &table, None));
//! assert!(evaluate("manager", "view_reports", &table, Some(&hierarchy)));
//! assert!(!evaluate("user", "create", &table, Some(&hierarchy)));
//! ```
//!
//! ## Untyped input
//!
//! Tables that arrive as JSON go through [`evaluate_value`], which enforces
//! the argument contract and reports violations as
//! [`AccessError::InvalidArgument`].
//!
//! ## Logging
//!
//! The crate emits `tracing` events (decisions at `debug`, traversal at
//! `trace`, policy loading at `info`/`warn`). Installing a subscriber is left
//! to the host application.

pub mod config;
pub mod engine;
pub mod error;
pub mod grants;
pub mod tables;
pub mod validate;

// Re-export main types for convenience
pub use config::{Policy, PolicyConfig};
pub use engine::{evaluate, resolve, AccessDecisionEngine, Decision};
pub use error::{AccessError, AccessResult};
pub use grants::{GrantSet, WILDCARD};
pub use tables::{PermissionTable, RoleHierarchy};
pub use validate::evaluate_value;
