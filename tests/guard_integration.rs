//! Guard evaluation through the configuration-driven entry point

mod common;

#[cfg(test)]
mod integration_tests {
    use super::common::{init_tracing, source_with_roles};
    use rbac::guard::{DecisionReason, InterceptionStage, ROUTE_GUARD};
    use rbac::identity::StaticIdentitySource;
    use rbac::{ProtectionPolicy, Rbac, RbacConfig, RequestDescriptor};
    use std::sync::Arc;

    const GUARDED: &str = r#"{
        "roles": {
            "guest":  { "permissions": ["read"] },
            "member": { "parents": ["guest"], "permissions": ["write"] },
            "admin":  { "parents": ["member"], "permissions": ["delete"] }
        },
        "guards": {
            "route": [
                { "route": "login", "roles": ["*"] },
                { "route": "account/*", "roles": ["guest"] },
                { "route": "admin/*", "roles": ["admin"] }
            ],
            "controller": [
                { "controller": "App\\Controller\\Post", "roles": ["member"] },
                { "controller": "App\\Controller\\Post", "actions": ["delete"], "roles": ["admin"] }
            ]
        }
    }"#;

    fn config(policy: ProtectionPolicy) -> RbacConfig {
        let mut config = RbacConfig::from_json_str(GUARDED).unwrap();
        config.protection_policy = policy;
        config
    }

    fn rbac(policy: ProtectionPolicy, roles: &[&str]) -> Rbac {
        init_tracing();
        Rbac::from_config(&config(policy), source_with_roles(roles)).unwrap()
    }

    #[test]
    fn test_route_rules_admit_inherited_roles() {
        let member = rbac(ProtectionPolicy::DenyUnlessDeclared, &["member"]);
        assert!(member.is_request_allowed(&RequestDescriptor::route("account/profile")).unwrap());
        assert!(!member.is_request_allowed(&RequestDescriptor::route("admin/users")).unwrap());

        let admin = rbac(ProtectionPolicy::DenyUnlessDeclared, &["admin"]);
        assert!(admin.is_request_allowed(&RequestDescriptor::route("account/profile")).unwrap());
        assert!(admin.is_request_allowed(&RequestDescriptor::route("admin/users")).unwrap());
    }

    #[test]
    fn test_protection_policy_for_undeclared_routes() {
        let strict = rbac(ProtectionPolicy::DenyUnlessDeclared, &["admin"]);
        assert!(!strict.is_request_allowed(&RequestDescriptor::route("blog/latest")).unwrap());

        let lenient = rbac(ProtectionPolicy::AllowUnlessDeclared, &["guest"]);
        assert!(lenient.is_request_allowed(&RequestDescriptor::route("blog/latest")).unwrap());
        // Declared rules stay binding
        assert!(!lenient.is_request_allowed(&RequestDescriptor::route("admin/users")).unwrap());
    }

    #[test]
    fn test_anonymous_callers() {
        init_tracing();
        let rbac = Rbac::from_config(
            &config(ProtectionPolicy::DenyUnlessDeclared),
            Arc::new(StaticIdentitySource::anonymous()),
        )
        .unwrap();

        assert!(rbac.is_request_allowed(&RequestDescriptor::route("login")).unwrap());
        assert!(!rbac.is_request_allowed(&RequestDescriptor::route("account/profile")).unwrap());
    }

    #[test]
    fn test_delete_action_requires_admin() {
        let post = "App\\Controller\\Post";

        let member = rbac(ProtectionPolicy::DenyUnlessDeclared, &["member"]);
        assert!(member.is_request_allowed(&RequestDescriptor::controller(post, "edit")).unwrap());
        assert!(!member.is_request_allowed(&RequestDescriptor::controller(post, "delete")).unwrap());

        let admin = rbac(ProtectionPolicy::DenyUnlessDeclared, &["admin"]);
        assert!(admin.is_request_allowed(&RequestDescriptor::controller(post, "delete")).unwrap());
        // admin inherits member, so the controller-wide rule admits it too
        assert!(admin.is_request_allowed(&RequestDescriptor::controller(post, "edit")).unwrap());
    }

    #[test]
    fn test_route_denial_stops_before_dispatch() {
        let member = rbac(ProtectionPolicy::DenyUnlessDeclared, &["member"]);
        let request = RequestDescriptor::route("admin/posts")
            .with_controller("App\\Controller\\Post")
            .with_action("edit");

        let decisions = member.evaluate_request(&request).unwrap();
        assert_eq!(decisions.len(), 1);
        assert_eq!(decisions[0].guard, ROUTE_GUARD);
        assert!(matches!(decisions[0].reason, DecisionReason::NoMatchingRoles { .. }));

        let roles = member.effective_roles().unwrap();
        assert!(member
            .guards()
            .is_allowed_at(InterceptionStage::Dispatch, &request, &roles));
    }

    #[test]
    fn test_guard_config_round_trips_through_json() {
        let config = config(ProtectionPolicy::AllowUnlessDeclared);
        let json = serde_json::to_string(&config).unwrap();
        let parsed = RbacConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
        assert!(json.contains("allow_unless_declared"));
    }
}
