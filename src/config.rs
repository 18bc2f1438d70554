//! Configuration for roles, assertions, guards and caching
//!
//! Everything here is plain serde data. Patterns are validated by
//! [`RbacConfig::validate`] and compiled once when the guard engine is built.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assertion::ExpressionAssertion;
use crate::error::{RbacError, Result};
use crate::guard::pattern::{Pattern, CONTROLLER_SEPARATOR, ROUTE_SEPARATOR};
use crate::types::{Role, RoleDefinition};

pub use crate::role::cache::CacheConfig;

/// What guards do with a request no rule mentions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProtectionPolicy {
    /// Undeclared requests are denied
    #[default]
    DenyUnlessDeclared,

    /// Undeclared requests are allowed
    AllowUnlessDeclared,
}

impl ProtectionPolicy {
    /// Decision applied when no rule matches
    pub fn allows_undeclared(self) -> bool {
        matches!(self, ProtectionPolicy::AllowUnlessDeclared)
    }
}

/// A route rule: route pattern → roles allowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRuleConfig {
    #[serde(alias = "route")]
    pub pattern: String,

    /// Allowed roles; `"*"` allows any role
    #[serde(default)]
    pub roles: Vec<String>,
}

impl RouteRuleConfig {
    pub fn new<R, S>(pattern: impl Into<String>, roles: R) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pattern: pattern.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }
}

/// A controller rule: controller pattern (and optional actions) → roles allowed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerRuleConfig {
    #[serde(alias = "controller")]
    pub pattern: String,

    /// Actions this rule is limited to; absent or empty covers every action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,

    /// Allowed roles; `"*"` allows any role
    #[serde(default)]
    pub roles: Vec<String>,
}

impl ControllerRuleConfig {
    /// Rule covering every action of the controller
    pub fn new<R, S>(pattern: impl Into<String>, roles: R) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pattern: pattern.into(),
            actions: None,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Restricts the rule to `actions`
    pub fn with_actions<A, S>(mut self, actions: A) -> Self
    where
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = Some(actions.into_iter().map(Into::into).collect());
        self
    }
}

/// Guard rule sets; a guard is only installed when its list is present
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<Vec<RouteRuleConfig>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<Vec<ControllerRuleConfig>>,
}

/// Top-level configuration
///
/// # Examples
///
/// ```rust
/// use rbac::config::{ProtectionPolicy, RbacConfig};
///
/// let config = RbacConfig::from_json_str(r#"{
///     "guest_role": "guest",
///     "roles": {
///         "guest":  { "permissions": ["read"] },
///         "member": { "parents": ["guest"], "permissions": ["comment"] }
///     },
///     "guards": {
///         "route": [ { "route": "admin/*", "roles": ["admin"] } ]
///     }
/// }"#).unwrap();
///
/// assert_eq!(config.roles.len(), 2);
/// assert_eq!(config.protection_policy, ProtectionPolicy::DenyUnlessDeclared);
/// config.validate().unwrap();
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RbacConfig {
    /// Role given to anonymous callers; `None` leaves them with no roles
    pub guest_role: Option<String>,

    pub protection_policy: ProtectionPolicy,

    /// Role definitions in declaration order
    pub roles: IndexMap<String, RoleDefinition>,

    /// Named CEL assertions (name → expression)
    pub expressions: IndexMap<String, String>,

    /// Permission → names of the assertions that must also hold
    pub assertion_map: IndexMap<String, Vec<String>>,

    pub guards: GuardsConfig,

    pub cache: CacheConfig,
}

impl RbacConfig {
    /// Parses a JSON document
    ///
    /// # Errors
    ///
    /// Returns `RbacError::InvalidConfig` if the document is not valid JSON or
    /// does not have the expected shape.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        debug!(
            roles = config.roles.len(),
            expressions = config.expressions.len(),
            "configuration parsed"
        );
        Ok(config)
    }

    /// Checks roles, patterns and expressions without building anything
    ///
    /// # Errors
    ///
    /// - `RbacError::InvalidRole` for empty role, parent or permission names
    /// - `RbacError::InvalidPattern` for empty or malformed guard patterns
    /// - `RbacError::Expression` for expressions that do not compile
    /// - `RbacError::InvalidConfig` for an empty guest role or assertion name
    pub fn validate(&self) -> Result<()> {
        if let Some(guest) = &self.guest_role {
            if guest.trim().is_empty() {
                return Err(RbacError::InvalidConfig("guest_role cannot be empty".to_string()));
            }
        }

        for (name, definition) in &self.roles {
            Role::new(name.clone(), definition)?;
        }

        for (name, expression) in &self.expressions {
            if name.trim().is_empty() {
                return Err(RbacError::InvalidConfig(
                    "expression names cannot be empty".to_string(),
                ));
            }
            ExpressionAssertion::new(expression.clone())?;
        }

        for (permission, names) in &self.assertion_map {
            if names.iter().any(|name| name.trim().is_empty()) {
                return Err(RbacError::InvalidConfig(format!(
                    "assertion_map entry '{}' contains an empty assertion name",
                    permission
                )));
            }
        }

        for rule in self.guards.route.iter().flatten() {
            Pattern::parse(&rule.pattern, ROUTE_SEPARATOR)?;
        }
        for rule in self.guards.controller.iter().flatten() {
            Pattern::parse(&rule.pattern, CONTROLLER_SEPARATOR)?;
        }

        Ok(())
    }
}
