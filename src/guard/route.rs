//! Route guard: route-name patterns checked once the route is resolved

use std::collections::HashSet;
use tracing::{debug, trace};

use super::decision::{DecisionReason, GuardDecision};
use super::rules::RouteRule;
use super::types::{Guard, InterceptionStage, RequestDescriptor};
use crate::config::{ProtectionPolicy, RouteRuleConfig};
use crate::error::Result;

pub const ROUTE_GUARD: &str = "route";

/// Guards requests by their resolved route name
///
/// A request is allowed if any matching rule admits one of the caller's roles.
/// Matching rules that admit none of them deny regardless of policy; a route
/// no rule matches falls back to the protection policy.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    rules: Vec<RouteRule>,
    policy: ProtectionPolicy,
}

impl RouteGuard {
    /// Compiles `rules` in declaration order
    ///
    /// # Errors
    ///
    /// Returns `RbacError::InvalidPattern` for the first malformed pattern.
    pub fn new(rules: &[RouteRuleConfig], policy: ProtectionPolicy) -> Result<Self> {
        let rules = rules.iter().map(RouteRule::compile).collect::<Result<Vec<_>>>()?;
        debug!(rules = rules.len(), policy = ?policy, "route guard compiled");
        Ok(Self { rules, policy })
    }

    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Decision for `route`
    pub fn check(&self, route: &str, roles: &HashSet<String>) -> GuardDecision {
        let matching: Vec<&RouteRule> = self.rules.iter().filter(|rule| rule.matches(route)).collect();

        if matching.is_empty() {
            let allowed = self.policy.allows_undeclared();
            trace!(route, allowed, "no route rule matched, applying protection policy");
            let reason = DecisionReason::ProtectionPolicy { allowed };
            return if allowed {
                GuardDecision::allow(ROUTE_GUARD, reason)
            } else {
                GuardDecision::deny(ROUTE_GUARD, reason)
            };
        }

        if let Some(rule) = matching.iter().find(|rule| rule.roles.allows(roles)) {
            trace!(route, pattern = %rule.pattern, "route rule granted access");
            return GuardDecision::allow(
                ROUTE_GUARD,
                DecisionReason::RuleMatch {
                    pattern: rule.pattern.to_string(),
                },
            );
        }

        debug!(route, roles = ?roles, "route denied, no matching rule admits the caller");
        GuardDecision::deny(
            ROUTE_GUARD,
            DecisionReason::NoMatchingRoles {
                patterns: matching.iter().map(|rule| rule.pattern.to_string()).collect(),
            },
        )
    }
}

impl Guard for RouteGuard {
    fn name(&self) -> &str {
        ROUTE_GUARD
    }

    fn stage(&self) -> InterceptionStage {
        InterceptionStage::RouteResolved
    }

    fn evaluate(&self, request: &RequestDescriptor, roles: &HashSet<String>) -> GuardDecision {
        match request.route.as_deref() {
            Some(route) => self.check(route, roles),
            None => GuardDecision::abstain(ROUTE_GUARD),
        }
    }
}
