//! Property tests for role graph resolution

use indexmap::IndexMap;
use proptest::prelude::*;
use rbac::guard::{Pattern, ROUTE_SEPARATOR};
use rbac::types::RoleDefinition;
use rbac::RoleGraph;

/// Builds roles `r0..rn` with arbitrary parent edges (cycles included);
/// role `ri` owns permission `pi`.
fn graph_from_edges(size: usize, edges: &[(usize, usize)]) -> RoleGraph {
    let mut definitions: IndexMap<String, RoleDefinition> = (0..size)
        .map(|i| {
            (
                format!("r{}", i),
                RoleDefinition::new(Vec::<String>::new(), [format!("p{}", i)]),
            )
        })
        .collect();

    for &(child, parent) in edges {
        if let Some(def) = definitions.get_mut(&format!("r{}", child % size)) {
            def.parents.push(format!("r{}", parent % size));
        }
    }

    RoleGraph::from_definitions(&definitions).unwrap()
}

/// Reference reachability over the same edges
fn reachable(size: usize, edges: &[(usize, usize)], start: usize) -> Vec<bool> {
    let mut seen = vec![false; size];
    let mut stack = vec![start];
    while let Some(node) = stack.pop() {
        if seen[node] {
            continue;
        }
        seen[node] = true;
        for &(child, parent) in edges {
            if child % size == node {
                stack.push(parent % size);
            }
        }
    }
    seen
}

proptest! {
    #[test]
    fn test_resolution_matches_ancestor_reachability(
        size in 1usize..12,
        edges in prop::collection::vec((0usize..12, 0usize..12), 0..40),
        start in 0usize..12,
    ) {
        let start = start % size;
        let graph = graph_from_edges(size, &edges);
        let expected = reachable(size, &edges, start);

        for (i, owned) in expected.iter().enumerate() {
            let role = format!("r{}", start);
            prop_assert_eq!(graph.has_permission([role.as_str()], &format!("p{}", i)), *owned);
        }
    }

    #[test]
    fn test_inherited_roles_is_closed_under_parents(
        size in 1usize..10,
        edges in prop::collection::vec((0usize..10, 0usize..10), 0..30),
        start in 0usize..10,
    ) {
        let graph = graph_from_edges(size, &edges);
        let closure = graph.inherited_roles([format!("r{}", start % size)]);

        for name in &closure {
            let role = graph.get(name).unwrap();
            for parent in role.parents() {
                prop_assert!(closure.contains(parent));
            }
        }
    }

    #[test]
    fn test_unknown_roles_never_grant(
        permission in "[a-z]{1,8}",
        unknown in "[A-Z]{1,8}",
    ) {
        let graph = graph_from_edges(3, &[(0, 1), (1, 2), (2, 0)]);
        prop_assert!(!graph.has_permission([unknown.as_str()], &permission));
    }

    #[test]
    fn test_trailing_wildcard_matches_any_extension(
        prefix in "[a-z]{1,6}",
        rest in prop::collection::vec("[a-z0-9]{1,6}", 1..4),
    ) {
        let pattern = Pattern::parse(&format!("{}/*", prefix), ROUTE_SEPARATOR).unwrap();
        let route = format!("{}/{}", prefix, rest.join("/"));
        prop_assert!(pattern.matches(&route));
        prop_assert!(!pattern.matches(&prefix));
    }
}

#[test]
fn test_two_role_cycle_terminates() {
    let graph = graph_from_edges(2, &[(0, 1), (1, 0)]);
    assert!(graph.has_permission(["r0"], "p1"));
    assert!(graph.has_permission(["r1"], "p0"));
    assert!(!graph.has_permission(["r0"], "missing"));
    assert!(graph.detect_cycles().is_err());
}
