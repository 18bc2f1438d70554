use indexmap::IndexMap;
use rbac::config::{ControllerRuleConfig, GuardsConfig, RouteRuleConfig};
use rbac::identity::{StaticIdentity, StaticIdentitySource};
use rbac::types::RoleDefinition;
use rbac::{GuardEngine, ProtectionPolicy, Rbac, RbacConfig, RequestDescriptor, RoleGraph};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::collections::HashSet;
use std::sync::Arc;

/// Linear chain `role0 <- role1 <- ... <- role{depth-1}`, each owning `perm{i}`
fn chain(depth: usize) -> IndexMap<String, RoleDefinition> {
    (0..depth)
        .map(|i| {
            let parents: Vec<String> = if i == 0 {
                Vec::new()
            } else {
                vec![format!("role{}", i - 1)]
            };
            (format!("role{}", i), RoleDefinition::new(parents, [format!("perm{}", i)]))
        })
        .collect()
}

fn bench_has_permission(c: &mut Criterion) {
    let mut group = c.benchmark_group("has_permission");
    for depth in [1usize, 5, 20, 100] {
        let graph = RoleGraph::from_definitions(&chain(depth)).unwrap();
        let leaf = format!("role{}", depth - 1);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, _| {
            b.iter(|| graph.has_permission([black_box(leaf.as_str())], black_box("perm0")));
        });
    }
    group.finish();
}

fn bench_has_permission_cyclic(c: &mut Criterion) {
    let mut definitions = chain(50);
    if let Some(root) = definitions.get_mut("role0") {
        root.parents.push("role49".to_string());
    }
    let graph = RoleGraph::from_definitions(&definitions).unwrap();

    c.bench_function("has_permission_cyclic_miss", |b| {
        b.iter(|| graph.has_permission([black_box("role25")], black_box("missing")));
    });
}

fn bench_is_granted(c: &mut Criterion) {
    let config = RbacConfig {
        roles: chain(10),
        ..Default::default()
    };
    let source = StaticIdentitySource::new(StaticIdentity::new("bench", ["role9"]));
    let rbac = Rbac::from_config(&config, Arc::new(source)).unwrap();

    // Warm up cache
    rbac.is_granted("perm0", None, None).unwrap();

    c.bench_function("is_granted_cached", |b| {
        b.iter(|| rbac.is_granted(black_box("perm0"), None, None).unwrap());
    });
}

fn bench_guards(c: &mut Criterion) {
    let config = GuardsConfig {
        route: Some(
            (0..50)
                .map(|i| RouteRuleConfig::new(format!("section{}/*", i), [format!("role{}", i)]))
                .collect(),
        ),
        controller: Some(vec![
            ControllerRuleConfig::new("App\\Controller\\*", ["member"]),
            ControllerRuleConfig::new("App\\Controller\\Post", ["admin"]).with_actions(["delete"]),
        ]),
    };
    let engine = GuardEngine::new(ProtectionPolicy::DenyUnlessDeclared, &config).unwrap();
    let roles: HashSet<String> = ["role49".to_string(), "member".to_string()].into_iter().collect();

    let mut group = c.benchmark_group("guards");

    let route = RequestDescriptor::route("section49/articles/edit");
    group.bench_function("route_last_rule", |b| {
        b.iter(|| engine.is_allowed(black_box(&route), &roles));
    });

    let dispatch = RequestDescriptor::controller("App\\Controller\\Post", "delete");
    group.bench_function("controller_action", |b| {
        b.iter(|| engine.is_allowed(black_box(&dispatch), &roles));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_has_permission,
    bench_has_permission_cyclic,
    bench_is_granted,
    bench_guards
);
criterion_main!(benches);
