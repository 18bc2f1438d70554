//! Compiled guard rules

use std::collections::HashSet;

use super::pattern::{Pattern, CONTROLLER_SEPARATOR, ROUTE_SEPARATOR};
use crate::config::{ControllerRuleConfig, RouteRuleConfig};
use crate::error::Result;

const ANY_ROLE: &str = "*";

/// Roles a rule admits
///
/// `"*"` admits every caller, guests included. An empty set admits nobody.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleSet {
    roles: HashSet<String>,
    any: bool,
}

impl RoleSet {
    pub fn new<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for role in roles {
            let role = role.as_ref().trim();
            if role == ANY_ROLE {
                set.any = true;
            } else if !role.is_empty() {
                set.roles.insert(role.to_string());
            }
        }
        set
    }

    /// Whether `current` intersects the admitted roles
    pub fn allows(&self, current: &HashSet<String>) -> bool {
        self.any || !self.roles.is_disjoint(current)
    }

    pub fn admits_any(&self) -> bool {
        self.any
    }

    /// Admitted role names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.roles.iter().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

/// Route pattern with its admitted roles
#[derive(Debug, Clone)]
pub struct RouteRule {
    pub pattern: Pattern,
    pub roles: RoleSet,
}

impl RouteRule {
    pub fn compile(config: &RouteRuleConfig) -> Result<Self> {
        Ok(Self {
            pattern: Pattern::parse(&config.pattern, ROUTE_SEPARATOR)?,
            roles: RoleSet::new(&config.roles),
        })
    }

    pub fn matches(&self, route: &str) -> bool {
        self.pattern.matches(route)
    }
}

/// Controller pattern, optional action list and admitted roles
#[derive(Debug, Clone)]
pub struct ControllerRule {
    pub pattern: Pattern,

    /// Lowercased actions; `None` covers the whole controller
    pub actions: Option<HashSet<String>>,

    pub roles: RoleSet,
}

impl ControllerRule {
    pub fn compile(config: &ControllerRuleConfig) -> Result<Self> {
        let actions = config
            .actions
            .as_ref()
            .map(|actions| {
                actions
                    .iter()
                    .map(|action| action.trim().to_lowercase())
                    .filter(|action| !action.is_empty())
                    .collect::<HashSet<_>>()
            })
            .filter(|actions| !actions.is_empty());

        Ok(Self {
            pattern: Pattern::parse(&config.pattern, CONTROLLER_SEPARATOR)?,
            actions,
            roles: RoleSet::new(&config.roles),
        })
    }

    pub fn matches_controller(&self, controller: &str) -> bool {
        self.pattern.matches(controller)
    }

    /// Whether this rule is limited to specific actions
    pub fn is_action_specific(&self) -> bool {
        self.actions.is_some()
    }

    /// Whether this rule names `action`; controller-wide rules name none
    pub fn covers_action(&self, action: &str) -> bool {
        let action = action.trim().to_lowercase();
        self.actions
            .as_ref()
            .is_some_and(|actions| actions.contains(&action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_role_set_intersection() {
        let set = RoleSet::new(["admin", "editor"]);
        assert!(set.allows(&roles(&["editor", "member"])));
        assert!(!set.allows(&roles(&["member"])));
        assert!(!set.allows(&roles(&[])));
    }

    #[test]
    fn test_role_set_any() {
        let set = RoleSet::new(["*"]);
        assert!(set.admits_any());
        assert!(set.allows(&roles(&["anything"])));
        assert!(set.allows(&roles(&[])));
    }

    #[test]
    fn test_empty_role_set_admits_nobody() {
        let set = RoleSet::new(Vec::<String>::new());
        assert!(!set.allows(&roles(&["admin"])));
    }

    #[test]
    fn test_role_set_names_sorted() {
        let set = RoleSet::new(["editor", " admin ", ""]);
        assert_eq!(set.names(), vec!["admin", "editor"]);
    }

    #[test]
    fn test_controller_rule_actions_are_case_insensitive() {
        let config = ControllerRuleConfig::new("App\\Post", ["admin"]).with_actions(["Delete"]);
        let rule = ControllerRule::compile(&config).unwrap();
        assert!(rule.is_action_specific());
        assert!(rule.covers_action("delete"));
        assert!(rule.covers_action("DELETE"));
        assert!(!rule.covers_action("edit"));
    }

    #[test]
    fn test_empty_action_list_covers_controller() {
        let config = ControllerRuleConfig::new("App\\Post", ["admin"]).with_actions(Vec::<String>::new());
        let rule = ControllerRule::compile(&config).unwrap();
        assert!(!rule.is_action_specific());
        assert!(!rule.covers_action("edit"));
    }
}
