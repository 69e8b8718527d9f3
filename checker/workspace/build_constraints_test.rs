use std::path::Path;

use checker__workspace::BuildContext;

fn linux() -> BuildContext {
    BuildContext::new("linux", "amd64")
}

#[test]
fn file_name_suffixes_select_the_target() {
    let context = linux();
    assert!(!context.matches_file_name("poll_windows.go"));
    assert!(!context.matches_file_name("sys_linux_arm64.go"));
    assert!(!context.matches_file_name("sys_windows_test.go"));
    assert!(context.matches_file_name("linux.go"));
    assert!(context.matches_file_name("lib.go"));
    assert!(context.matches_file_name("poll_linux.go"));
    assert!(context.matches_file_name("sys_linux_amd64.go"));
    assert!(context.matches_file_name("sys_linux_test.go"));
    assert!(context.matches_file_name("word_amd64.go"));
    assert!(context.matches_file_name("zz_generated.go"));

    let android = BuildContext::new("android", "arm64");
    assert!(android.matches_file_name("poll_linux.go"));
    assert!(!android.matches_file_name("poll_darwin.go"));
}

#[test]
fn go_build_expressions() {
    let context = linux().with_tags(["integration"]);
    let matches = |header: &str| {
        context
            .matches_header(&format!("{header}\n\npackage lib\n"))
            .expect("constraint should parse")
    };

    assert!(!matches("//go:build ignore"));
    assert!(matches("//go:build linux && amd64"));
    assert!(matches("//go:build !windows"));
    assert!(matches("//go:build (darwin || linux) && !cgo"));
    assert!(matches("//go:build unix && go1.21"));
    assert!(matches("//go:build integration"));
    assert!(!matches("//go:build windows || (linux && arm64)"));
    assert!(matches("// Copyright line.\n\n//go:build gc"));
}

#[test]
fn go_build_line_overrides_plus_build_lines() {
    let context = linux();
    let source = "//go:build linux\n// +build windows\n\npackage lib\n";
    assert_eq!(context.matches_header(source), Ok(true));
}

#[test]
fn plus_build_lines_need_a_blank_line_before_the_package_clause() {
    let context = linux();
    assert_eq!(
        context.matches_header("// +build ignore\n\npackage main\n"),
        Ok(false)
    );
    assert_eq!(
        context.matches_header("// +build darwin,amd64 linux,!arm\n// +build gc\n\npackage lib\n"),
        Ok(true)
    );
    // Attached to the package clause, the line is documentation.
    assert_eq!(
        context.matches_header("// +build ignore\npackage main\n"),
        Ok(true)
    );
}

#[test]
fn constraints_stop_at_the_package_clause() {
    let context = linux();
    let source = "package lib\n\n//go:build ignore\n";
    assert_eq!(context.matches_header(source), Ok(true));
    assert_eq!(
        context.matches_header("/* generated\n   file */\n//go:build ignore\n\npackage lib\n"),
        Ok(false)
    );
}

#[test]
fn malformed_expressions_exclude_the_file() {
    let context = linux();
    let error = context
        .matches_header("//go:build linux &&\n\npackage lib\n")
        .expect_err("dangling operator should not parse");
    assert_eq!(error.line, "//go:build linux &&");
    assert!(context.matches_header("//go:build (linux\n\npackage lib\n").is_err());

    assert!(!context.includes(Path::new("lib/bad.go"), "//go:build (linux\n\npackage lib\n"));
}

#[test]
fn includes_combines_names_and_headers() {
    let context = linux();
    assert!(context.includes(Path::new("lib/lib.go"), "package lib\n"));
    assert!(!context.includes(Path::new("lib/lib_windows.go"), "package lib\n"));
    assert!(!context.includes(
        Path::new("lib/a_gen.go"),
        "//go:build ignore\n\npackage main\n"
    ));
}
