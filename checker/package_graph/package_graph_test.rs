use std::collections::BTreeSet;
use std::path::PathBuf;

use checker__package_graph::{ImportEdge, PackageGraph};
use checker__source::Span;

fn edge(source: &str, target: &str) -> ImportEdge {
    ImportEdge {
        source_package_path: source.to_string(),
        target_package_path: target.to_string(),
        source_path: PathBuf::from(format!("{source}/file.go")),
        import_span: Span {
            start: 20,
            end: 30,
            line: 3,
            column: 8,
        },
    }
}

fn packages(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

#[test]
fn orders_dependencies_before_importers() {
    let graph = PackageGraph::new(
        packages(&["m", "m/a", "m/b", "m/c"]),
        &[edge("m", "m/b"), edge("m/b", "m/a"), edge("m", "m/c"), edge("m/c", "m/a")],
    );

    assert_eq!(
        graph.dependency_order().expect("graph is acyclic"),
        vec!["m/a", "m/b", "m/c", "m"]
    );
}

#[test]
fn ignores_imports_outside_the_workspace() {
    let graph = PackageGraph::new(
        packages(&["m", "m/a"]),
        &[edge("m", "fmt"), edge("m", "github.com/x/y"), edge("m", "m/a")],
    );

    assert_eq!(graph.dependency_order().unwrap(), vec!["m/a", "m"]);
    assert_eq!(
        graph.transitive_imports("m"),
        BTreeSet::from(["m/a".to_string()])
    );
}

#[test]
fn collects_transitive_imports() {
    let graph = PackageGraph::new(
        packages(&["m", "m/a", "m/b", "m/c"]),
        &[edge("m", "m/b"), edge("m/b", "m/a")],
    );

    assert_eq!(
        graph.transitive_imports("m"),
        BTreeSet::from(["m/a".to_string(), "m/b".to_string()])
    );
    assert!(graph.transitive_imports("m/a").is_empty());
    assert!(graph.transitive_imports("unknown").is_empty());
}

#[test]
fn reports_import_cycles_with_the_closing_import() {
    let graph = PackageGraph::new(
        packages(&["m/a", "m/b", "m/c"]),
        &[edge("m/a", "m/b"), edge("m/b", "m/c"), edge("m/c", "m/a")],
    );

    let error = graph.dependency_order().expect_err("cycle should be reported");
    assert_eq!(error.cycle, vec!["m/a", "m/b", "m/c", "m/a"]);
    assert_eq!(
        error.to_string(),
        "package import cycle detected: m/a -> m/b -> m/c -> m/a"
    );
    assert_eq!(error.path, Some(PathBuf::from("m/a/file.go")));
    assert_eq!(error.span.map(|span| span.line), Some(3));
}
