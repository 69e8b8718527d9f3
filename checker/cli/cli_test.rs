use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use checker__cli::{CommandLine, normalize_arguments};
use checker__reports::ReportFormat;
use tempfile::TempDir;

const MARKER_PACKAGE: &str = r#"package marker

type Marker interface {
	Mark()
}

type Thing struct{}

func (Thing) Mark() {}
"#;

fn write_workspace(files: &[(&str, &str)]) -> TempDir {
    let root = tempfile::tempdir().expect("workspace root should be created");
    for (relative_file, contents) in files {
        let path = root.path().join(relative_file);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent directory should be created");
        }
        fs::write(path, contents).expect("test file should be written");
    }
    root
}

fn verifyiface(working_directory: &Path, arguments: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_verifyiface"))
        .args(arguments)
        .current_dir(working_directory)
        .env_remove("RUST_LOG")
        .output()
        .expect("verifyiface should start")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn accepts_single_dash_long_flags() {
    assert_eq!(
        normalize_arguments(["verifyiface", "-strict", "-format=json", "-v", "./...", "--", "-verbose"]),
        vec!["verifyiface", "--strict", "--format=json", "-v", "./...", "--", "-verbose"]
    );

    let command_line = CommandLine::try_parse_arguments(["verifyiface", "-verbose", "-format", "json"])
        .expect("arguments should parse");
    assert!(command_line.verbose);
    assert!(!command_line.strict);
    assert_eq!(command_line.format, ReportFormat::Json);
    assert_eq!(command_line.patterns, vec!["."]);
    assert!(!command_line.config().strict_check);
    assert!(command_line.load_options().include_tests);
}

#[test]
fn test_files_are_checked_unless_disabled() {
    assert_eq!(
        normalize_arguments(["verifyiface", "-test=false", "./..."]),
        vec!["verifyiface", "--test=false", "./..."]
    );
    let command_line = CommandLine::try_parse_arguments(["verifyiface", "-test=false", "./..."])
        .expect("arguments should parse");
    assert!(!command_line.test);
    assert_eq!(command_line.patterns, vec!["./..."]);
    let command_line = CommandLine::try_parse_arguments(["verifyiface", "-test", "./..."])
        .expect("arguments should parse");
    assert!(command_line.test);
    assert_eq!(command_line.patterns, vec!["./..."]);

    let marker_test = "package marker\n\nfunc check(value any) bool {\n\t_, ok := value.(Marker)\n\treturn ok\n}\n";
    let workspace = write_workspace(&[
        ("go.mod", "module example.com/m\n"),
        ("marker/marker.go", MARKER_PACKAGE),
        ("marker/marker_test.go", marker_test),
    ]);

    let output = verifyiface(workspace.path(), &["./..."]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(
        stdout(&output),
        "marker/marker.go:7:6: struct Thing doesn't verify interface compliance for marker.Marker\n"
    );

    let output = verifyiface(workspace.path(), &["-test=false", "./..."]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "");
}

#[test]
fn exits_clean_without_diagnostics() {
    let workspace = write_workspace(&[("go.mod", "module example.com/m\n"), ("marker/marker.go", MARKER_PACKAGE)]);

    let output = verifyiface(workspace.path(), &["./..."]);
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout(&output), "");
}

#[test]
fn exits_with_three_when_reporting() {
    let workspace = write_workspace(&[("go.mod", "module example.com/m\n"), ("marker/marker.go", MARKER_PACKAGE)]);

    let output = verifyiface(workspace.path(), &["-strict", "./..."]);
    assert_eq!(output.status.code(), Some(3));
    assert_eq!(
        stdout(&output),
        "marker/marker.go:7:6: struct Thing doesn't verify interface compliance for marker.Marker\n"
    );

    let output = verifyiface(&workspace.path().join("marker"), &["--strict", "--format", "json"]);
    assert_eq!(output.status.code(), Some(3));
    let diagnostics: serde_json::Value =
        serde_json::from_str(&stdout(&output)).expect("output should be JSON");
    assert_eq!(diagnostics[0]["path"], "marker.go");
    assert_eq!(diagnostics[0]["line"], 7);
    assert_eq!(diagnostics[0]["analyzer"], "verifyiface");
}

#[test]
fn exits_with_one_on_failures() {
    let workspace = write_workspace(&[("go.mod", "module example.com/m\n"), ("broken/broken.go", "package broken\n\ntype {\n")]);

    let output = verifyiface(workspace.path(), &["./..."]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("broken/broken.go"), "{stderr}");

    let outside = tempfile::tempdir().unwrap();
    let output = verifyiface(outside.path(), &[]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn exits_with_two_on_usage_errors() {
    let workspace = write_workspace(&[("go.mod", "module example.com/m\n")]);

    assert_eq!(verifyiface(workspace.path(), &["--format", "xml"]).status.code(), Some(2));
    assert_eq!(verifyiface(workspace.path(), &["--bogus"]).status.code(), Some(2));
    assert_eq!(verifyiface(workspace.path(), &["--help"]).status.code(), Some(0));
}
