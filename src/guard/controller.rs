//! Controller guard: controller + action patterns checked before dispatch

use std::collections::HashSet;
use tracing::{debug, trace};

use super::decision::{DecisionReason, GuardDecision};
use super::rules::ControllerRule;
use super::types::{Guard, InterceptionStage, RequestDescriptor};
use crate::config::{ControllerRuleConfig, ProtectionPolicy};
use crate::error::Result;

pub const CONTROLLER_GUARD: &str = "controller";

/// Guards requests by controller and action
///
/// Resolution for a `(controller, action)` pair:
/// 1. Action-specific rules covering the action decide alone. When several
///    match, the caller needs a role from the union of their role sets.
/// 2. Otherwise controller-wide rules decide.
/// 3. A controller that only has action-specific rules, none covering the
///    action, is denied.
/// 4. A controller no rule matches falls back to the protection policy.
#[derive(Debug, Clone)]
pub struct ControllerGuard {
    rules: Vec<ControllerRule>,
    policy: ProtectionPolicy,
}

impl ControllerGuard {
    /// Compiles `rules` in declaration order
    pub fn new(rules: &[ControllerRuleConfig], policy: ProtectionPolicy) -> Result<Self> {
        let rules = rules
            .iter()
            .map(ControllerRule::compile)
            .collect::<Result<Vec<_>>>()?;
        debug!(rules = rules.len(), policy = ?policy, "controller guard compiled");
        Ok(Self { rules, policy })
    }

    pub fn rules(&self) -> &[ControllerRule] {
        &self.rules
    }

    /// Decision for `action` on `controller`
    pub fn check(&self, controller: &str, action: Option<&str>, roles: &HashSet<String>) -> GuardDecision {
        let declared: Vec<&ControllerRule> = self
            .rules
            .iter()
            .filter(|rule| rule.matches_controller(controller))
            .collect();

        if declared.is_empty() {
            let allowed = self.policy.allows_undeclared();
            trace!(controller, allowed, "no controller rule matched, applying protection policy");
            let reason = DecisionReason::ProtectionPolicy { allowed };
            return if allowed {
                GuardDecision::allow(CONTROLLER_GUARD, reason)
            } else {
                GuardDecision::deny(CONTROLLER_GUARD, reason)
            };
        }

        if let Some(action) = action {
            let specific: Vec<&ControllerRule> = declared
                .iter()
                .copied()
                .filter(|rule| rule.covers_action(action))
                .collect();

            if !specific.is_empty() {
                return self.decide_action(&specific, action, roles);
            }
        }

        let wide: Vec<&ControllerRule> = declared
            .iter()
            .copied()
            .filter(|rule| !rule.is_action_specific())
            .collect();

        if wide.is_empty() {
            let action = action.unwrap_or_default().to_string();
            debug!(controller, action = %action, "controller declared but action not covered");
            return GuardDecision::deny(
                CONTROLLER_GUARD,
                DecisionReason::ActionNotCovered {
                    controller: controller.to_string(),
                    action,
                },
            );
        }

        if let Some(rule) = wide.iter().find(|rule| rule.roles.allows(roles)) {
            trace!(controller, pattern = %rule.pattern, "controller rule granted access");
            return GuardDecision::allow(
                CONTROLLER_GUARD,
                DecisionReason::RuleMatch {
                    pattern: rule.pattern.to_string(),
                },
            );
        }

        debug!(controller, roles = ?roles, "controller denied, no matching rule admits the caller");
        GuardDecision::deny(
            CONTROLLER_GUARD,
            DecisionReason::NoMatchingRoles {
                patterns: wide.iter().map(|rule| rule.pattern.to_string()).collect(),
            },
        )
    }

    fn decide_action(&self, specific: &[&ControllerRule], action: &str, roles: &HashSet<String>) -> GuardDecision {
        if let Some(rule) = specific.iter().find(|rule| rule.roles.allows(roles)) {
            trace!(action, pattern = %rule.pattern, "action rule granted access");
            return GuardDecision::allow(
                CONTROLLER_GUARD,
                DecisionReason::ActionRuleMatch {
                    pattern: rule.pattern.to_string(),
                    action: action.to_string(),
                },
            );
        }

        debug!(action, roles = ?roles, "action denied by action-specific rules");
        GuardDecision::deny(
            CONTROLLER_GUARD,
            DecisionReason::NoMatchingRoles {
                patterns: specific.iter().map(|rule| rule.pattern.to_string()).collect(),
            },
        )
    }
}

impl Guard for ControllerGuard {
    fn name(&self) -> &str {
        CONTROLLER_GUARD
    }

    fn stage(&self) -> InterceptionStage {
        InterceptionStage::Dispatch
    }

    fn evaluate(&self, request: &RequestDescriptor, roles: &HashSet<String>) -> GuardDecision {
        match request.controller.as_deref() {
            Some(controller) => self.check(controller, request.action.as_deref(), roles),
            None => GuardDecision::abstain(CONTROLLER_GUARD),
        }
    }
}
