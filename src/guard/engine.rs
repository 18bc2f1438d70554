//! Ordered evaluation of guards across interception stages

use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

use super::controller::ControllerGuard;
use super::decision::GuardDecision;
use super::route::RouteGuard;
use super::types::{Guard, InterceptionStage, RequestDescriptor};
use crate::config::{GuardsConfig, ProtectionPolicy};
use crate::error::Result;

/// Runs guards stage by stage and stops at the first denial
///
/// Guards are ordered by stage (`RouteResolved` first), then by descending
/// priority, then by registration order. The protection policy is fixed at
/// construction; engines with different policies can coexist.
///
/// # Examples
///
/// ```rust
/// use std::collections::HashSet;
/// use rbac::config::{GuardsConfig, ProtectionPolicy, RouteRuleConfig};
/// use rbac::guard::{GuardEngine, RequestDescriptor};
///
/// let config = GuardsConfig {
///     route: Some(vec![RouteRuleConfig::new("admin/*", ["admin"])]),
///     controller: None,
/// };
/// let engine = GuardEngine::new(ProtectionPolicy::DenyUnlessDeclared, &config).unwrap();
///
/// let admin: HashSet<String> = ["admin".to_string()].into_iter().collect();
/// assert!(engine.is_allowed(&RequestDescriptor::route("admin/users"), &admin));
/// assert!(!engine.is_allowed(&RequestDescriptor::route("home"), &admin));
/// ```
pub struct GuardEngine {
    policy: ProtectionPolicy,
    guards: Vec<Box<dyn Guard>>,
}

impl GuardEngine {
    /// Builds the route and controller guards present in `config`
    ///
    /// A guard type whose rule list is absent is not installed at all, so it
    /// neither allows nor denies anything.
    ///
    /// # Errors
    ///
    /// Returns `RbacError::InvalidPattern` for malformed rule patterns.
    pub fn new(policy: ProtectionPolicy, config: &GuardsConfig) -> Result<Self> {
        let mut engine = Self::empty(policy);

        if let Some(rules) = &config.route {
            engine = engine.with_guard(RouteGuard::new(rules, policy)?);
        }
        if let Some(rules) = &config.controller {
            engine = engine.with_guard(ControllerGuard::new(rules, policy)?);
        }

        info!(guards = engine.guards.len(), policy = ?policy, "guard engine initialized");
        Ok(engine)
    }

    /// Engine with no guards; every request is allowed
    pub fn empty(policy: ProtectionPolicy) -> Self {
        Self {
            policy,
            guards: Vec::new(),
        }
    }

    /// Adds a guard, keeping stage and priority order
    pub fn with_guard(mut self, guard: impl Guard + 'static) -> Self {
        self.guards.push(Box::new(guard));
        self.guards
            .sort_by_key(|guard| (guard.stage(), Reverse(guard.priority())));
        self
    }

    pub fn policy(&self) -> ProtectionPolicy {
        self.policy
    }

    /// Installed guard names in evaluation order
    pub fn guard_names(&self) -> Vec<&str> {
        self.guards.iter().map(|guard| guard.name()).collect()
    }

    /// Decisions of the guards at `stage`, stopping after the first denial
    pub fn evaluate_stage(
        &self,
        stage: InterceptionStage,
        request: &RequestDescriptor,
        roles: &HashSet<String>,
    ) -> Vec<GuardDecision> {
        let mut decisions = Vec::new();
        for guard in self.guards.iter().filter(|guard| guard.stage() == stage) {
            let decision = guard.evaluate(request, roles);
            let denied = !decision.allowed;
            decisions.push(decision);
            if denied {
                debug!(guard = guard.name(), stage = ?stage, "request denied by guard");
                break;
            }
        }
        decisions
    }

    /// Whether every guard at `stage` allows the request
    pub fn is_allowed_at(
        &self,
        stage: InterceptionStage,
        request: &RequestDescriptor,
        roles: &HashSet<String>,
    ) -> bool {
        self.evaluate_stage(stage, request, roles)
            .iter()
            .all(|decision| decision.allowed)
    }

    /// Decisions across all stages in order, stopping after the first denial
    pub fn evaluate(&self, request: &RequestDescriptor, roles: &HashSet<String>) -> Vec<GuardDecision> {
        let mut decisions = Vec::new();
        for stage in InterceptionStage::ALL {
            let stage_decisions = self.evaluate_stage(stage, request, roles);
            let denied = stage_decisions.iter().any(|decision| !decision.allowed);
            decisions.extend(stage_decisions);
            if denied {
                break;
            }
        }
        decisions
    }

    /// Whether the request passes every stage
    pub fn is_allowed(&self, request: &RequestDescriptor, roles: &HashSet<String>) -> bool {
        self.evaluate(request, roles).iter().all(|decision| decision.allowed)
    }
}

impl fmt::Debug for GuardEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardEngine")
            .field("policy", &self.policy)
            .field("guards", &self.guard_names())
            .finish()
    }
}
