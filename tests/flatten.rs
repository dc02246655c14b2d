// SPDX-License-Identifier: MPL-2.0

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use depflat::{
    Coordinates, Dependency, DependencyGraph, DependencyNode, GraphError, Map,
    MutableDependencyDataMap, NodeType, Set,
};
use proptest::prelude::*;

fn init_log() {
    let _ = env_logger::builder().is_test(true).try_init();
}

type Node = DependencyNode<&'static str>;

/// Builds dependency maps for the graphs of a test.
#[derive(Default)]
struct Resolver {
    map: Map<&'static str, Arc<Dependency>>,
}

impl Resolver {
    fn add(&mut self, address: &'static str, dependency: Dependency) -> Arc<Dependency> {
        let dependency = Arc::new(dependency);
        self.map.insert(address, Arc::clone(&dependency));
        dependency
    }

    fn jar(&mut self, name: &'static str, version: &str) -> Arc<Dependency> {
        self.add(
            name,
            Dependency::java_library(Coordinates::new("com.example", name, version), name),
        )
    }

    fn aar(&mut self, name: &'static str, version: &str) -> Arc<Dependency> {
        self.add(
            name,
            Dependency::android_library(Coordinates::new("com.example", name, version), name),
        )
    }

    fn graph(
        &self,
        roots: Vec<Node>,
        data_map: &Arc<MutableDependencyDataMap>,
    ) -> DependencyGraph<&'static str> {
        DependencyGraph::new(self.map.clone(), roots, Arc::clone(data_map))
    }
}

fn jar(name: &'static str, children: Vec<Node>) -> Node {
    DependencyNode::new(name, NodeType::JavaLibrary, children)
}

fn aar(name: &'static str, children: Vec<Node>) -> Node {
    DependencyNode::new(name, NodeType::AndroidLibrary, children)
}

fn atom(name: &'static str, children: Vec<Node>) -> Node {
    DependencyNode::new(name, NodeType::Atom, children)
}

fn names(deps: &[Arc<Dependency>]) -> Vec<&str> {
    deps.iter().map(|d| d.coordinates().artifact.as_str()).collect()
}

#[test]
fn shared_transitive_dependency_is_listed_once() {
    init_log();
    let mut r = Resolver::default();
    for n in ["a", "b", "c", "d"] {
        r.jar(n, "1");
    }
    let graph = r.graph(
        vec![jar(
            "a",
            vec![jar("b", vec![jar("d", vec![])]), jar("c", vec![jar("d", vec![])])],
        )],
        &MutableDependencyDataMap::new(),
    );
    assert_eq!(names(&graph.flatten(None).unwrap()), ["a", "b", "c", "d"]);
}

#[test]
fn direct_dependency_reachable_from_earlier_roots() {
    init_log();
    let mut r = Resolver::default();
    for n in ["a", "b", "x"] {
        r.jar(n, "1");
    }
    let graph = r.graph(
        vec![
            jar("a", vec![jar("x", vec![])]),
            jar("b", vec![jar("x", vec![])]),
            jar("x", vec![]),
        ],
        &MutableDependencyDataMap::new(),
    );
    assert_eq!(names(&graph.flatten(None).unwrap()), ["a", "b", "x"]);
}

#[test]
fn same_result_on_repeated_runs() {
    let mut r = Resolver::default();
    for n in ["a", "b", "c", "d", "e"] {
        r.jar(n, "1");
    }
    let graph = r.graph(
        vec![
            jar("e", vec![jar("c", vec![])]),
            jar("a", vec![jar("d", vec![jar("c", vec![])]), jar("b", vec![])]),
            jar("c", vec![]),
        ],
        &MutableDependencyDataMap::new(),
    );
    let one = graph.flatten(None).unwrap();
    assert_eq!(names(&one), ["e", "a", "d", "b", "c"]);
    for _ in 0..10 {
        assert_eq!(one, graph.flatten(None).unwrap());
    }
}

#[test]
fn root_filter_selects_node_types() {
    let mut r = Resolver::default();
    r.aar("lib", "1");
    r.jar("guava", "19.0");
    r.jar("gson", "2.8");
    let graph = r.graph(
        vec![aar("lib", vec![jar("guava", vec![])]), jar("gson", vec![])],
        &MutableDependencyDataMap::new(),
    );

    let jars: depflat::NodeFilter<'_, &'static str> =
        &|n| n.node_type() == NodeType::JavaLibrary;
    assert_eq!(names(&graph.flatten(Some(jars)).unwrap()), ["gson"]);
}

#[test]
fn tested_library_is_placed_first() {
    init_log();
    let mut r = Resolver::default();
    let espresso = r.jar("espresso", "2.2");
    let guava = r.jar("guava", "19.0");
    let library = Arc::new(Dependency::android_library(
        Coordinates::new("com.example", "aar", "1.0"),
        "build/aar",
    ));

    let graph = r.graph(
        vec![jar("espresso", vec![]), jar("guava", vec![])],
        &MutableDependencyDataMap::new(),
    );
    let flat = graph.flatten_for_test(Some(&library), None).unwrap();
    assert_eq!(names(flat.all_dependencies()), ["aar", "espresso", "guava"]);
    assert_eq!(flat.direct_dependencies(), [espresso, guava]);
    assert!(flat.base_atom().is_none());
}

#[test]
fn tested_library_already_in_graph_is_not_duplicated() {
    let mut r = Resolver::default();
    r.jar("espresso", "2.2");
    r.jar("guava", "19.0");
    let library = r.aar("aar", "1.0");

    let graph = r.graph(
        vec![jar("espresso", vec![]), aar("aar", vec![jar("guava", vec![])])],
        &MutableDependencyDataMap::new(),
    );
    let flat = graph.flatten_for_test(Some(&library), None).unwrap();
    assert_eq!(names(flat.all_dependencies()), ["espresso", "aar", "guava"]);
}

#[test]
fn local_jars_of_tested_library_are_excluded() {
    init_log();
    let tested = DependencyGraph::from_local_jars([(
        "libs/util.jar",
        PathBuf::from("libs/util.jar"),
    )])
    .flatten_container()
    .unwrap()
    .filter_skipped_libraries();
    assert_eq!(tested.direct_local_java_dependencies().len(), 1);

    let mut r = Resolver::default();
    r.jar("junit", "4.12");
    r.aar("lib", "1.0");
    r.add("util", Dependency::local_jar("libs/util.jar"));

    let graph = r.graph(
        vec![
            jar("junit", vec![]),
            aar("lib", vec![jar("util", vec![])]),
            jar("util", vec![]),
        ],
        &MutableDependencyDataMap::new(),
    );

    let flat = graph.flatten_for_test(None, Some(&tested)).unwrap();
    assert_eq!(names(flat.all_dependencies()), ["junit", "lib"]);
    assert_eq!(names(flat.direct_dependencies()), ["junit", "lib"]);

    let unfiltered = graph.flatten_container().unwrap();
    assert_eq!(
        names(unfiltered.all_dependencies()),
        ["junit", "lib", "libs/util.jar"]
    );
}

#[test]
fn test_graph_of_a_library_with_local_jars() {
    let tested = DependencyGraph::from_local_jars([(
        "libs/util.jar",
        PathBuf::from("libs/util.jar"),
    )])
    .flatten_container()
    .unwrap()
    .filter_skipped_libraries();

    let mut r = Resolver::default();
    let junit = r.jar("junit", "4.12");
    r.add("util", Dependency::local_jar("libs/util.jar"));
    let library = Arc::new(Dependency::android_library(
        Coordinates::new("com.example", "aar", "1.0"),
        "build/aar",
    ));

    let graph = r.graph(
        vec![jar("junit", vec![jar("util", vec![])]), jar("util", vec![])],
        &MutableDependencyDataMap::new(),
    );
    let flat = graph
        .flatten_for_test(Some(&library), Some(&tested))
        .unwrap();
    assert_eq!(names(flat.all_dependencies()), ["aar", "junit"]);
    assert_eq!(flat.direct_dependencies(), [junit]);
}

#[test]
fn skipped_libraries_are_filtered_into_a_snapshot() {
    let mut r = Resolver::default();
    r.aar("lib", "1.0");
    let guava = r.jar("guava", "19.0");
    let gson = r.jar("gson", "2.8");
    let data_map = MutableDependencyDataMap::new();
    let graph = r.graph(
        vec![aar("lib", vec![jar("guava", vec![])]), jar("gson", vec![])],
        &data_map,
    );

    let flat = graph.flatten_container().unwrap();
    data_map.skip(&guava).unwrap();

    let first = flat.filter_skipped_libraries();
    let second = flat.filter_skipped_libraries();
    assert_eq!(first, second);
    assert_eq!(names(first.all_dependencies()), ["lib", "gson"]);

    data_map.skip(&gson).unwrap();
    assert_eq!(names(first.all_dependencies()), ["lib", "gson"]);
    assert_eq!(names(first.direct_java_dependencies()), ["gson"]);
    assert!(first.is_skipped(&gson));
    assert_eq!(names(flat.filter_skipped_libraries().all_dependencies()), ["lib"]);
}

#[test]
fn base_atom_of_atom_chains() {
    let mut r = Resolver::default();
    for n in ["app", "feature", "base"] {
        r.add(
            n,
            Dependency::atom(Coordinates::new("com.example", n, "1"), n),
        );
    }
    r.add(
        "other",
        Dependency::atom(Coordinates::new("com.example", "other", "1"), "other"),
    );
    let data_map = MutableDependencyDataMap::new();

    let graph = r.graph(
        vec![
            atom("app", vec![atom("feature", vec![atom("base", vec![])])]),
            atom("feature", vec![atom("base", vec![])]),
        ],
        &data_map,
    );
    let flat = graph.flatten_container().unwrap();
    assert_eq!(names(flat.all_dependencies()), ["app", "feature", "base"]);
    let container = flat.filter_skipped_libraries();
    assert_eq!(
        container.base_atom().map(|a| a.coordinates().artifact.as_str()),
        Some("base")
    );
    assert!(container.all_packaged_dependencies().is_empty());

    let disjoint = r.graph(vec![atom("base", vec![]), atom("other", vec![])], &data_map);
    assert!(matches!(
        disjoint.flatten_container(),
        Err(GraphError::MultipleBaseAtoms { .. })
    ));
}

#[test]
fn graphs_sharing_a_data_map_across_threads() {
    let mut r = Resolver::default();
    let shared = r.jar("shared", "1");
    r.jar("compile", "1");
    r.jar("package", "1");
    let data_map = MutableDependencyDataMap::new();
    let compile = r.graph(vec![jar("compile", vec![jar("shared", vec![])])], &data_map);
    let package = r.graph(vec![jar("package", vec![jar("shared", vec![])])], &data_map);

    let (compile, package) = thread::scope(|s| {
        let compile = s.spawn(|| compile.flatten_container());
        let package = s.spawn(|| {
            data_map.skip(&shared)?;
            package.flatten_container()
        });
        (compile.join().unwrap(), package.join().unwrap())
    });

    let compile = compile.unwrap().filter_skipped_libraries();
    let package = package.unwrap().filter_skipped_libraries();
    assert_eq!(names(compile.all_dependencies()), ["compile"]);
    assert_eq!(names(package.all_dependencies()), ["package"]);
}

/// A random DAG over `size` dependencies: edges only go from lower to higher indices.
fn dag_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>, Vec<usize>)> {
    (1usize..9).prop_flat_map(|size| {
        let edges = prop::collection::vec((0..size, 0..size), 0..(size * 2))
            .prop_map(|pairs| {
                let mut edges: Vec<(usize, usize)> = pairs
                    .into_iter()
                    .filter(|(a, b)| a < b)
                    .collect();
                edges.sort_unstable();
                edges.dedup();
                edges
            });
        let roots = prop::collection::vec(0..size, 1..=size);
        (Just(size), edges, roots)
    })
}

fn dag_graph(size: usize, edges: &[(usize, usize)], roots: &[usize]) -> DependencyGraph<usize> {
    fn node(i: usize, edges: &[(usize, usize)]) -> DependencyNode<usize> {
        let children = edges
            .iter()
            .filter(|(from, _)| *from == i)
            .map(|&(_, to)| node(to, edges))
            .collect();
        DependencyNode::new(i, NodeType::JavaLibrary, children)
    }

    let dependencies = (0..size)
        .map(|i| {
            let coordinates = Coordinates::new("dag", i.to_string(), "1");
            (i, Arc::new(Dependency::java_library(coordinates, format!("{i}.jar"))))
        })
        .collect();
    let roots = roots.iter().map(|&r| node(r, edges)).collect();
    DependencyGraph::new(dependencies, roots, MutableDependencyDataMap::new())
}

fn reachable(edges: &[(usize, usize)], roots: &[usize]) -> Set<usize> {
    let mut seen = Set::default();
    let mut stack = roots.to_vec();
    while let Some(i) = stack.pop() {
        if seen.insert(i) {
            stack.extend(edges.iter().filter(|(from, _)| *from == i).map(|&(_, to)| to));
        }
    }
    seen
}

fn position(flat: &[Arc<Dependency>], i: usize) -> Option<usize> {
    let artifact = i.to_string();
    flat.iter().position(|d| d.coordinates().artifact == artifact)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn flattening_keeps_every_reachable_dependency_once(
        (size, edges, roots) in dag_strategy()
    ) {
        let flat = dag_graph(size, &edges, &roots).flatten(None).unwrap();

        let unique: Set<&Dependency> = flat.iter().map(|d| d.as_ref()).collect();
        prop_assert_eq!(unique.len(), flat.len());

        let expected = reachable(&edges, &roots);
        prop_assert_eq!(flat.len(), expected.len());
        for i in expected {
            prop_assert!(position(&flat, i).is_some());
        }
    }

    #[test]
    fn dependents_come_before_their_dependencies(
        (size, edges, roots) in dag_strategy()
    ) {
        let flat = dag_graph(size, &edges, &roots).flatten(None).unwrap();
        for &(from, to) in &edges {
            if let (Some(p), Some(c)) = (position(&flat, from), position(&flat, to)) {
                prop_assert!(p < c, "{} should come before {}", from, to);
            }
        }
    }

    #[test]
    fn removing_one_edge_keeps_dependencies_still_reachable(
        (size, edges, roots) in dag_strategy(),
        pick in any::<prop::sample::Index>(),
    ) {
        prop_assume!(!edges.is_empty());
        let removed = pick.index(edges.len());
        let mut fewer = edges.clone();
        fewer.remove(removed);

        let flat = dag_graph(size, &fewer, &roots).flatten(None).unwrap();
        let target = edges[removed].1;
        let still_reachable = reachable(&fewer, &roots).contains(&target);
        prop_assert_eq!(position(&flat, target).is_some(), still_reachable);
    }

    #[test]
    fn flattening_is_deterministic((size, edges, roots) in dag_strategy()) {
        let graph = dag_graph(size, &edges, &roots);
        prop_assert_eq!(graph.flatten(None).unwrap(), graph.flatten(None).unwrap());
        let rebuilt = dag_graph(size, &edges, &roots);
        prop_assert_eq!(graph.flatten(None).unwrap(), rebuilt.flatten(None).unwrap());
    }
}

#[cfg(feature = "serde")]
#[test]
fn flatten_graph_from_ron() {
    let roots: Vec<DependencyNode<String>> = ron::from_str(
        r#"[
            (address: "lib", node_type: AndroidLibrary, children: [
                (address: "guava", node_type: JavaLibrary),
            ]),
            (address: "gson", node_type: JavaLibrary, children: [
                (address: "guava", node_type: JavaLibrary),
            ]),
        ]"#,
    )
    .unwrap();

    let mut dependencies = Map::default();
    dependencies.insert(
        "lib".to_string(),
        Arc::new(Dependency::android_library(
            Coordinates::new("com.example", "lib", "1.0"),
            "lib",
        )),
    );
    for (address, version) in [("guava", "19.0"), ("gson", "2.8")] {
        dependencies.insert(
            address.to_string(),
            Arc::new(Dependency::java_library(
                Coordinates::new("com.example", address, version),
                format!("{address}.jar"),
            )),
        );
    }

    let graph = DependencyGraph::new(dependencies, roots, MutableDependencyDataMap::new());
    assert_eq!(names(&graph.flatten(None).unwrap()), ["lib", "gson", "guava"]);
}
