//! # Role-Based Access Control (rbac)
//!
//! Authorization core with support for:
//! - Hierarchical roles with multiple inheritance and cycle-safe resolution
//! - Pluggable role providers with a whole-snapshot role graph cache
//! - Permission checks narrowed by runtime assertions (closures, objects, CEL expressions)
//! - Route and controller guards with wildcard patterns and a protection policy
//! - Thread-safe concurrent access
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rbac::assertion::AssertionLike;
//! use rbac::identity::{StaticIdentity, StaticIdentitySource};
//! use rbac::{Rbac, RbacConfig};
//!
//! let config = RbacConfig::from_json_str(r#"{
//!     "roles": {
//!         "guest":  { "permissions": ["read"] },
//!         "member": { "parents": ["guest"], "permissions": ["write"] },
//!         "admin":  { "parents": ["member"], "permissions": ["delete"] }
//!     }
//! }"#).unwrap();
//!
//! let source = StaticIdentitySource::new(StaticIdentity::new("alice", ["member"]));
//! let rbac = Rbac::from_config(&config, Arc::new(source)).unwrap();
//!
//! assert!(rbac.is_granted("read", None, None).unwrap());
//! assert!(!rbac.is_granted("delete", None, None).unwrap());
//!
//! let not_today = AssertionLike::function(|_, _| false);
//! assert!(!rbac.is_granted("read", Some(&not_today), None).unwrap());
//! ```

pub mod assertion;
pub mod config;
pub mod engine;
pub mod error;
pub mod guard;
pub mod identity;
pub mod rbac;
pub mod role;
pub mod types;

pub use assertion::{Assertion, AssertionLike, AssertionSet};
pub use config::{ProtectionPolicy, RbacConfig};
pub use engine::AuthorizationService;
pub use error::{RbacError, Result};
pub use guard::{GuardEngine, RequestDescriptor};
pub use identity::{Identity, IdentityRoleResolver, IdentitySource};
pub use rbac::Rbac;
pub use role::{RoleGraph, RoleProvider};
pub use types::{Role, RoleDefinition};
