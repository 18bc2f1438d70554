//! Request descriptors, interception stages and the guard capability

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::decision::GuardDecision;

/// Point in request handling at which a guard runs
///
/// Stages are ordered: every `RouteResolved` guard runs before any `Dispatch` guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterceptionStage {
    /// The route has been resolved
    RouteResolved,

    /// The handler (controller + action) is about to be dispatched
    Dispatch,
}

impl InterceptionStage {
    pub const ALL: [InterceptionStage; 2] = [InterceptionStage::RouteResolved, InterceptionStage::Dispatch];
}

/// What a guard knows about an incoming request
///
/// # Examples
///
/// ```rust
/// use rbac::guard::RequestDescriptor;
///
/// let request = RequestDescriptor::route("admin/users")
///     .with_controller("App\\Controller\\User")
///     .with_action("list");
///
/// assert_eq!(request.route.as_deref(), Some("admin/users"));
/// assert_eq!(request.action.as_deref(), Some("list"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Resolved route name
    #[serde(default)]
    pub route: Option<String>,

    /// Controller identifier
    #[serde(default)]
    pub controller: Option<String>,

    /// Action name on the controller
    #[serde(default)]
    pub action: Option<String>,
}

impl RequestDescriptor {
    /// Descriptor carrying only a route name
    pub fn route(route: impl Into<String>) -> Self {
        Self {
            route: Some(route.into()),
            ..Default::default()
        }
    }

    /// Descriptor carrying a controller and an action
    pub fn controller(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            controller: Some(controller.into()),
            action: Some(action.into()),
            ..Default::default()
        }
    }

    pub fn with_controller(mut self, controller: impl Into<String>) -> Self {
        self.controller = Some(controller.into());
        self
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

/// A request interceptor deciding on role membership alone
pub trait Guard: Send + Sync {
    /// Name used in decisions and logs
    fn name(&self) -> &str;

    /// Stage this guard runs at
    fn stage(&self) -> InterceptionStage;

    /// Higher runs first within a stage
    fn priority(&self) -> i32 {
        0
    }

    /// Decides on `request` for a caller holding `roles`
    fn evaluate(&self, request: &RequestDescriptor, roles: &HashSet<String>) -> GuardDecision;
}
