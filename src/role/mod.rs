//! # Role Module
//!
//! Hierarchical role resolution:
//! - [`RoleGraph`]: immutable name → role snapshot with cycle-safe traversal
//! - [`RoleProvider`]: pluggable source of role definitions
//! - [`RoleCache`]: snapshot cache contract, whole-cache invalidation
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use rbac::role::{CachedRoleProvider, InMemoryRoleCache, InMemoryRoleProvider, RoleProvider};
//! use rbac::types::RoleDefinition;
//!
//! let provider = CachedRoleProvider::new(
//!     InMemoryRoleProvider::new()
//!         .with_role("guest", RoleDefinition::new(Vec::<String>::new(), ["read"]))
//!         .with_role("admin", RoleDefinition::new(["guest"], ["delete"])),
//!     Arc::new(InMemoryRoleCache::new(None)),
//! );
//!
//! let graph = provider.graph().unwrap();
//! assert!(graph.has_permission(["admin"], "read"));
//! ```

pub mod cache;
pub mod graph;
pub mod provider;

pub use cache::{CacheConfig, CacheStats, InMemoryRoleCache, RoleCache};
pub use graph::RoleGraph;
pub use provider::{CachedRoleProvider, InMemoryRoleProvider, RoleProvider, DEFAULT_CACHE_KEY};
