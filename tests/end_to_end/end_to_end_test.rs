use checker__cli::{EXIT_CLEAN, EXIT_DIAGNOSTICS, EXIT_FAILURE};
use tests__end_to_end::{FixtureWorkspace, run_fixture};

const GO_MOD: (&str, &str) = ("go.mod", "module example.com/shapes\n\ngo 1.22\n");

const EXAMPLE5: &str = r#"package main

type Iface1 interface {
	Do1() error
}

type Iface2 interface {
	Do2() error
}

type Iface3 interface {
	Do3() error
}

type Ok struct {
}

func (o Ok) Do1() error {
	return nil
}

func (o Ok) Do2() error {
	return nil
}

func (o Ok) Do3() error {
	return nil
}

var _ Iface1 = (*Ok)(nil)
var _ Iface2 = &Ok{}

func main() {
}
"#;

const EXAMPLE9_IFACE: &str = r#"package a

type Iface interface {
	Do()
}

func DoAny(a interface{}) {
	iface, ok := a.(Iface)

	if ok {
		iface.Do()
	}
}
"#;

const EXAMPLE9_MAIN: &str = r#"package main

import (
	"example9/a"
	"fmt"
)

type Ok struct {
}

func (o *Ok) Do() {
	fmt.Println("ok.Do()")
}

func main() {
	o := &Ok{}

	a.DoAny(o)
}
"#;

#[test]
fn complete_coverage_is_clean() {
    let complete = EXAMPLE5.replace(
        "var _ Iface2 = &Ok{}\n",
        "var _ Iface2 = &Ok{}\nvar _ Iface3 = Ok{}\n",
    );
    let workspace = FixtureWorkspace::new(&[GO_MOD, ("main.go", &complete)]);

    let run = run_fixture(workspace.path(), &["-strict"]);
    assert_eq!(run.exit_code, EXIT_CLEAN, "{}", run.stderr);
    assert!(run.lines().is_empty());
}

#[test]
fn unasserted_interface_in_main_needs_strict() {
    let workspace = FixtureWorkspace::new(&[GO_MOD, ("main.go", EXAMPLE5)]);

    let relaxed = run_fixture(workspace.path(), &[]);
    assert_eq!(relaxed.exit_code, EXIT_CLEAN);

    let strict = run_fixture(workspace.path(), &["-strict"]);
    assert_eq!(strict.exit_code, EXIT_DIAGNOSTICS);
    assert_eq!(
        strict.lines(),
        vec!["main.go:15:6: struct Ok doesn't verify interface compliance for main.Iface3"]
    );
}

#[test]
fn observed_interfaces_are_reported_without_strict() {
    let observed = format!("{EXAMPLE5}\nfunc matches(value interface{{}}) bool {{\n\t_, ok := value.(Iface3)\n\treturn ok\n}}\n");
    let workspace = FixtureWorkspace::new(&[GO_MOD, ("cmd/tool/main.go", &observed)]);

    let run = run_fixture(workspace.path(), &["./..."]);
    assert_eq!(run.exit_code, EXIT_DIAGNOSTICS);
    assert_eq!(
        run.lines(),
        vec!["cmd/tool/main.go:15:6: struct Ok doesn't verify interface compliance for main.Iface3"]
    );
}

#[test]
fn gopath_layout_reports_cross_package_implementation() {
    let workspace = FixtureWorkspace::new(&[
        ("src/example9/a/iface.go", EXAMPLE9_IFACE),
        ("src/example9/main.go", EXAMPLE9_MAIN),
    ]);

    let run = run_fixture(&workspace.join("src/example9"), &[]);
    assert_eq!(run.exit_code, EXIT_DIAGNOSTICS, "{}", run.stderr);
    assert_eq!(
        run.lines(),
        vec!["main.go:8:6: struct Ok doesn't verify interface compliance for a.Iface"]
    );

    // Package a only exports the interface; checking it alone is clean.
    let run = run_fixture(&workspace.join("src/example9/a"), &["-strict"]);
    assert_eq!(run.exit_code, EXIT_CLEAN);
}

#[test]
fn cross_package_assertion_verifies_implementation() {
    let verified = EXAMPLE9_MAIN.replace(
        "func main() {",
        "var _ a.Iface = (*Ok)(nil)\n\nfunc main() {",
    );
    let workspace = FixtureWorkspace::new(&[
        ("go.mod", "module example9\n"),
        ("a/iface.go", EXAMPLE9_IFACE),
        ("main.go", &verified),
    ]);

    let run = run_fixture(workspace.path(), &["-strict", "./..."]);
    assert_eq!(run.exit_code, EXIT_CLEAN, "{}", run.stdout);
}

#[test]
fn skip_directive_and_external_files_stay_silent() {
    let marker = "package marker\n\ntype Marker interface {\n\tMark()\n}\n";
    let skipped = "package marker\n\n// #noverifyiface\ntype Thing struct{}\n\nfunc (Thing) Mark() {}\n";
    let vendored = "package dep\n\nimport \"example.com/shapes/marker\"\n\ntype Impl struct{}\n\nfunc (Impl) Mark() {}\n\nvar _ = marker.Marker(nil)\n";
    let workspace = FixtureWorkspace::new(&[
        GO_MOD,
        ("marker/marker.go", marker),
        ("marker/thing.go", skipped),
        ("third_party/pkg/mod/dep/dep.go", vendored),
    ]);

    let run = run_fixture(workspace.path(), &["-strict", "./..."]);
    assert_eq!(run.exit_code, EXIT_CLEAN, "{}", run.stdout);
}

#[test]
fn build_constrained_files_do_not_rename_packages() {
    let lib = "package lib\n\ntype Iface interface {\n\tDo()\n}\n\nfunc DoAny(v interface{}) {\n\tif i, ok := v.(Iface); ok {\n\t\ti.Do()\n\t}\n}\n";
    let main = "package main\n\nimport \"example.com/shapes/lib\"\n\ntype O struct{}\n\nfunc (O) Do() {}\n\nfunc main() { lib.DoAny(O{}) }\n";
    let workspace = FixtureWorkspace::new(&[
        GO_MOD,
        ("lib/a_gen.go", "//go:build ignore\n\npackage main\n\nfunc main() {}\n"),
        ("lib/lib.go", lib),
        ("lib/lib_plan9.go", "package lib\n\ntype Plan9 struct{}\n\nfunc (Plan9) Do() {}\n"),
        ("cmd/main.go", main),
    ]);

    let run = run_fixture(workspace.path(), &["./..."]);
    assert_eq!(run.exit_code, EXIT_DIAGNOSTICS, "{}", run.stderr);
    assert_eq!(
        run.lines(),
        vec!["cmd/main.go:5:6: struct O doesn't verify interface compliance for lib.Iface"]
    );
}

#[test]
fn json_report_lists_every_diagnostic() {
    let workspace = FixtureWorkspace::new(&[
        GO_MOD,
        ("main.go", EXAMPLE5),
        (
            "geometry/square.go",
            "package geometry\n\ntype Shape interface {\n\tArea() float64\n}\n\ntype Square struct{}\n\nfunc (Square) Area() float64 { return 1 }\n",
        ),
    ]);

    let run = run_fixture(workspace.path(), &["-strict", "-format=json", "./..."]);
    assert_eq!(run.exit_code, EXIT_DIAGNOSTICS);
    let diagnostics: serde_json::Value = serde_json::from_str(&run.stdout).unwrap();
    let summary: Vec<(String, u64)> = diagnostics
        .as_array()
        .unwrap()
        .iter()
        .map(|diagnostic| {
            (
                diagnostic["path"].as_str().unwrap().to_string(),
                diagnostic["line"].as_u64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("geometry/square.go".to_string(), 7),
            ("main.go".to_string(), 15)
        ]
    );
}

#[test]
fn repeated_runs_produce_identical_reports() {
    let workspace = FixtureWorkspace::new(&[
        ("src/example9/a/iface.go", EXAMPLE9_IFACE),
        ("src/example9/main.go", EXAMPLE9_MAIN),
    ]);

    let first = run_fixture(&workspace.join("src/example9"), &["./..."]);
    let second = run_fixture(&workspace.join("src/example9"), &["./..."]);
    assert_eq!(first.exit_code, second.exit_code);
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn syntax_errors_fail_the_run() {
    let workspace = FixtureWorkspace::new(&[GO_MOD, ("main.go", "package main\n\nfunc (\n")]);

    let run = run_fixture(workspace.path(), &[]);
    assert_eq!(run.exit_code, EXIT_FAILURE);
    assert!(run.stderr.starts_with("error: failed to parse"), "{}", run.stderr);
    assert!(run.stdout.is_empty());
}

#[test]
fn import_cycles_fail_the_run() {
    let workspace = FixtureWorkspace::new(&[
        GO_MOD,
        ("a/a.go", "package a\n\nimport \"example.com/shapes/b\"\n\nvar _ = b.B\n"),
        ("b/b.go", "package b\n\nimport \"example.com/shapes/a\"\n\nvar B = a.A\n"),
    ]);

    let run = run_fixture(workspace.path(), &["-format=json", "./..."]);
    assert_eq!(run.exit_code, EXIT_FAILURE);
    let failure: serde_json::Value = serde_json::from_str(&run.stderr).unwrap();
    assert_eq!(failure["kind"], "import_cycle");
    assert_eq!(
        failure["message"],
        "package import cycle detected: example.com/shapes/a -> example.com/shapes/b -> example.com/shapes/a"
    );
}
