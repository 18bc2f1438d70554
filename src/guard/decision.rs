//! Guard decision types

use serde::{Deserialize, Serialize};

/// Why a guard allowed or denied a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum DecisionReason {
    /// A rule matched the request and the caller holds one of its roles
    RuleMatch { pattern: String },

    /// An action-specific controller rule matched and the caller holds one of its roles
    ActionRuleMatch { pattern: String, action: String },

    /// Rules matched but the caller holds none of their roles
    NoMatchingRoles { patterns: Vec<String> },

    /// The controller is declared but no rule covers the requested action
    ActionNotCovered { controller: String, action: String },

    /// No rule mentions the request; the protection policy decided
    ProtectionPolicy { allowed: bool },

    /// The request carries nothing this guard inspects
    NotApplicable,
}

/// Outcome of a single guard
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardDecision {
    /// Whether the request may proceed
    pub allowed: bool,

    /// Guard that made the decision
    pub guard: String,

    /// Reason for the decision
    pub reason: DecisionReason,
}

impl GuardDecision {
    /// Create an allow decision
    pub fn allow(guard: impl Into<String>, reason: DecisionReason) -> Self {
        Self {
            allowed: true,
            guard: guard.into(),
            reason,
        }
    }

    /// Create a deny decision
    pub fn deny(guard: impl Into<String>, reason: DecisionReason) -> Self {
        Self {
            allowed: false,
            guard: guard.into(),
            reason,
        }
    }

    /// Decision for a request no guard looked at
    pub fn abstain(guard: impl Into<String>) -> Self {
        Self::allow(guard, DecisionReason::NotApplicable)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allow_decision() {
        let decision = GuardDecision::allow(
            "route",
            DecisionReason::RuleMatch {
                pattern: "admin/*".to_string(),
            },
        );
        assert!(decision.allowed);
        assert_eq!(decision.guard, "route");
    }

    #[test]
    fn test_deny_decision_serializes_reason_tag() {
        let decision = GuardDecision::deny("route", DecisionReason::ProtectionPolicy { allowed: false });
        let json = serde_json::to_value(&decision).unwrap();
        assert_eq!(json["allowed"], false);
        assert_eq!(json["reason"]["type"], "ProtectionPolicy");
    }
}
