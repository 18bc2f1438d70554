//! # Request Guards
//!
//! Coarse, permission-agnostic request interception. Guards match a request's
//! route name or controller + action against wildcard rules and admit callers
//! by role membership alone.
//!
//! ## Features
//!
//! - **Route guard**: route-name patterns, runs at [`InterceptionStage::RouteResolved`]
//! - **Controller guard**: controller patterns with optional action lists, runs at
//!   [`InterceptionStage::Dispatch`]; action-specific rules take precedence
//! - **Protection policy**: deny or allow requests no rule mentions
//! - **Wildcards**: trailing `*` prefix matches, `*` single segments, in-segment globs
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashSet;
//! use rbac::config::{ControllerRuleConfig, GuardsConfig, ProtectionPolicy};
//! use rbac::guard::{GuardEngine, RequestDescriptor};
//!
//! let config = GuardsConfig {
//!     route: None,
//!     controller: Some(vec![
//!         ControllerRuleConfig::new("App\\Post", ["member"]),
//!         ControllerRuleConfig::new("App\\Post", ["admin"]).with_actions(["delete"]),
//!     ]),
//! };
//! let engine = GuardEngine::new(ProtectionPolicy::DenyUnlessDeclared, &config).unwrap();
//!
//! let member: HashSet<String> = ["member".to_string()].into_iter().collect();
//! assert!(engine.is_allowed(&RequestDescriptor::controller("App\\Post", "edit"), &member));
//! assert!(!engine.is_allowed(&RequestDescriptor::controller("App\\Post", "delete"), &member));
//! ```

pub mod controller;
pub mod decision;
pub mod engine;
pub mod pattern;
pub mod route;
pub mod rules;
pub mod types;

pub use controller::{ControllerGuard, CONTROLLER_GUARD};
pub use decision::{DecisionReason, GuardDecision};
pub use engine::GuardEngine;
pub use pattern::{Pattern, CONTROLLER_SEPARATOR, ROUTE_SEPARATOR};
pub use route::{RouteGuard, ROUTE_GUARD};
pub use rules::{ControllerRule, RoleSet, RouteRule};
pub use types::{Guard, InterceptionStage, RequestDescriptor};
