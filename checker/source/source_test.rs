use std::path::Path;

use checker__source::{FileId, FileRole, Position, Span, display_relative_to};

#[test]
fn classifies_go_files_by_suffix() {
    assert_eq!(
        FileRole::from_path(Path::new("pkg/iface.go")),
        Some(FileRole::Source)
    );
    assert_eq!(
        FileRole::from_path(Path::new("pkg/iface_test.go")),
        Some(FileRole::Test)
    );
    assert_eq!(FileRole::from_path(Path::new("pkg/go.mod")), None);
    assert_eq!(FileRole::from_path(Path::new("pkg/.hidden.go")), None);
    assert_eq!(FileRole::from_path(Path::new("pkg/_ignored.go")), None);
}

#[test]
fn span_union_keeps_first_line_and_column() {
    let left = Span {
        start: 10,
        end: 14,
        line: 2,
        column: 3,
    };
    let right = Span {
        start: 2,
        end: 5,
        line: 1,
        column: 3,
    };

    let joined = left.to(&right);
    assert_eq!(joined.start, 2);
    assert_eq!(joined.end, 14);
    assert_eq!(joined.line, 1);
}

#[test]
fn positions_order_by_file_then_offset() {
    let span = |start| Span {
        start,
        end: start + 1,
        line: 1,
        column: start + 1,
    };
    let mut positions = vec![
        Position::new(FileId(1), span(0)),
        Position::new(FileId(0), span(7)),
        Position::new(FileId(0), span(3)),
    ];
    positions.sort();

    assert_eq!(
        positions
            .iter()
            .map(|position| (position.file.0, position.span.start))
            .collect::<Vec<_>>(),
        vec![(0, 3), (0, 7), (1, 0)]
    );
}

#[test]
fn relative_display_falls_back_to_full_path() {
    assert_eq!(
        display_relative_to(Path::new("/work/mod/a/iface.go"), Path::new("/work/mod")),
        "a/iface.go"
    );
    assert_eq!(
        display_relative_to(Path::new("/elsewhere/b.go"), Path::new("/work/mod")),
        "/elsewhere/b.go"
    );
}
