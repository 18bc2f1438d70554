//! Shared fixtures for integration tests

#![allow(dead_code)]

use std::sync::{Arc, Once};

use rbac::identity::{StaticIdentity, StaticIdentitySource};
use rbac::RbacConfig;

static TRACING: Once = Once::new();

/// Installs a test subscriber once; filter with `RUST_LOG=rbac=trace`
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// guest ⊂ member ⊂ admin, each owning one permission
pub const HIERARCHY: &str = r#"{
    "roles": {
        "guest":  { "permissions": ["read"] },
        "member": { "parents": ["guest"], "permissions": ["write"] },
        "admin":  { "parents": ["member"], "permissions": ["delete"] }
    }
}"#;

pub fn hierarchy_config() -> RbacConfig {
    RbacConfig::from_json_str(HIERARCHY).expect("fixture config parses")
}

pub fn source_with_roles(roles: &[&str]) -> Arc<StaticIdentitySource> {
    Arc::new(StaticIdentitySource::new(StaticIdentity::new(
        "user",
        roles.iter().copied(),
    )))
}
