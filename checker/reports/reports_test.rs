use checker__reports::{
    CheckFailure, CheckFailureDetail, CheckFailureKind, RenderedDiagnostic, ReportFormat,
    render_failure_json, render_failure_text, render_json, render_text,
};

fn diagnostic(path: &str, line: usize) -> RenderedDiagnostic {
    RenderedDiagnostic {
        analyzer: "verifyiface".to_string(),
        path: path.to_string(),
        line,
        column: 6,
        message: "struct Ok doesn't verify interface compliance for pkg.Iface3".to_string(),
    }
}

#[test]
fn parses_report_formats() {
    assert_eq!("text".parse::<ReportFormat>(), Ok(ReportFormat::Text));
    assert_eq!("JSON".parse::<ReportFormat>(), Ok(ReportFormat::Json));
    assert_eq!(
        "xml".parse::<ReportFormat>(),
        Err("unknown report format 'xml' (expected one of: text, json)".to_string())
    );
    assert_eq!(ReportFormat::default().to_string(), "text");
}

#[test]
fn renders_text_one_diagnostic_per_line() {
    let rendered = render_text(&[diagnostic("a/impl.go", 7), diagnostic("main.go", 12)]);
    assert_eq!(
        rendered,
        "a/impl.go:7:6: struct Ok doesn't verify interface compliance for pkg.Iface3\n\
         main.go:12:6: struct Ok doesn't verify interface compliance for pkg.Iface3\n"
    );
    assert_eq!(render_text(&[]), "");
}

#[test]
fn renders_json_array_of_diagnostics() {
    let rendered = render_json(&[diagnostic("main.go", 12)]).unwrap();
    let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{
            "analyzer": "verifyiface",
            "path": "main.go",
            "line": 12,
            "column": 6,
            "message": "struct Ok doesn't verify interface compliance for pkg.Iface3",
        }])
    );
    assert_eq!(render_json(&[]).unwrap(), "[]");
}

#[test]
fn renders_failures_with_details() {
    let mut failure = CheckFailure::new(
        CheckFailureKind::ParseFailed,
        "failed to parse 1 file",
        None,
    );
    failure.details.push(CheckFailureDetail {
        message: "3:1: expected 'package'".to_string(),
        path: Some("broken.go".to_string()),
    });

    assert_eq!(
        render_failure_text(&failure),
        "error: failed to parse 1 file\n  broken.go: 3:1: expected 'package'\n"
    );
    let value: serde_json::Value =
        serde_json::from_str(&render_failure_json(&failure).unwrap()).unwrap();
    assert_eq!(value["kind"], "parse_failed");
    assert!(value.get("path").is_none());
    assert_eq!(value["details"][0]["path"], "broken.go");
}

#[test]
fn formats_render_their_own_reports() {
    let diagnostics = [diagnostic("main.go", 12)];
    assert_eq!(
        ReportFormat::Text.render_diagnostics(&diagnostics).unwrap(),
        render_text(&diagnostics)
    );
    let json = ReportFormat::Json.render_diagnostics(&diagnostics).unwrap();
    assert!(json.ends_with("]\n"));
    assert_eq!(ReportFormat::Json.render_diagnostics(&[]).unwrap(), "[]\n");

    let failure = CheckFailure::new(
        CheckFailureKind::PackageClauseMismatch,
        "conflicting package clauses in 1 package(s)",
        None,
    );
    assert_eq!(
        ReportFormat::Text.render_failure(&failure),
        "error: conflicting package clauses in 1 package(s)\n"
    );
    let value: serde_json::Value =
        serde_json::from_str(&ReportFormat::Json.render_failure(&failure)).unwrap();
    assert_eq!(value["kind"], "package_clause_mismatch");
}
