use checker__parsing::parse_file;
use checker__syntax::{
    Declaration, DeclarationToken, Expression, InterfaceElement, ParsedFile, Spec,
    TypeExpression, UnaryOperator, for_each_type_assertion,
};

fn parse(source: &str) -> ParsedFile {
    match parse_file(source) {
        Ok(file) => file,
        Err(diagnostics) => panic!("expected source to parse, got {diagnostics:?}"),
    }
}

fn type_names(file: &ParsedFile) -> Vec<String> {
    file.generic_declarations()
        .flat_map(|declaration| &declaration.specs)
        .filter_map(|spec| match spec {
            Spec::Type(type_spec) => Some(type_spec.name.name.clone()),
            Spec::Value(_) => None,
        })
        .collect()
}

#[test]
fn parses_package_clause_and_imports() {
    let file = parse(
        r#"package shapes

import "fmt"

import (
	stdio "io"
	. "strings"
)
"#,
    );

    assert_eq!(file.package_name.name, "shapes");
    let paths: Vec<&str> = file.imports.iter().map(|spec| spec.path.as_str()).collect();
    assert_eq!(paths, vec!["fmt", "io", "strings"]);
    let names: Vec<Option<&str>> = file
        .imports
        .iter()
        .map(|spec| spec.name.as_ref().map(|name| name.name.as_str()))
        .collect();
    assert_eq!(names, vec![None, Some("stdio"), Some(".")]);
}

#[test]
fn parses_structs_interfaces_and_methods() {
    let file = parse(
        r#"package shapes

type Shape interface {
	Area() float64
	Scale(factor float64) (Shape, error)
}

type Named interface {
	Shape
	fmt.Stringer
	Name() string
}

type Square struct {
	side, margin float64
	*Base
	util.Mixin `json:"mixin"`
	Generic[int]
	cells [4]int
}

func (s *Square) Area() float64 { return s.side * s.side }
"#,
    );

    assert_eq!(type_names(&file), vec!["Shape", "Named", "Square"]);

    let Spec::Type(named) = &file.generic_declarations().nth(1).unwrap().specs[0] else {
        panic!("expected type spec");
    };
    let TypeExpression::Interface(interface) = &named.type_expression else {
        panic!("expected interface type");
    };
    let embedded = interface
        .elements
        .iter()
        .filter(|element| matches!(element, InterfaceElement::Embedded { .. }))
        .count();
    assert_eq!(embedded, 2);
    assert_eq!(interface.elements.len(), 3);

    let Spec::Type(square) = &file.generic_declarations().nth(2).unwrap().specs[0] else {
        panic!("expected type spec");
    };
    let TypeExpression::Struct(structure) = &square.type_expression else {
        panic!("expected struct type");
    };
    let embedded: Vec<bool> = structure
        .fields
        .iter()
        .map(|field| field.is_embedded())
        .collect();
    assert_eq!(embedded, vec![false, true, true, true, false]);
    assert_eq!(structure.fields[0].names.len(), 2);
    assert_eq!(structure.fields[2].tag.as_deref(), Some(r#"json:"mixin""#));

    let method = file.function_declarations().next().unwrap();
    let receiver = method.receiver.as_ref().unwrap();
    assert!(receiver.pointer);
    assert_eq!(receiver.base_type_name.name, "Square");
    assert_eq!(method.signature.results.len(), 1);
}

#[test]
fn groups_parameter_names_with_the_following_type() {
    let file = parse(
        r#"package p

func Join(a, b string, rest ...string) (joined string, err error) { return }

func Pair(int, string) {}
"#,
    );

    let mut functions = file.function_declarations();
    let join = functions.next().unwrap();
    let names: Vec<&str> = join
        .signature
        .parameters
        .iter()
        .map(|parameter| parameter.name.as_ref().unwrap().name.as_str())
        .collect();
    assert_eq!(names, vec!["a", "b", "rest"]);
    assert!(join.signature.parameters[2].variadic);
    assert_eq!(join.signature.results.len(), 2);

    let pair = functions.next().unwrap();
    assert!(
        pair.signature
            .parameters
            .iter()
            .all(|parameter| parameter.name.is_none())
    );
}

#[test]
fn parses_compliance_assertion_forms() {
    let file = parse(
        r#"package p

var _ Shape = Square{}
var _ Shape = &Square{}
var _ Shape = (*Square)(nil)
var (
	_ io.Reader = (*Buffer)(nil)
	_, _ Shape  = Circle{}, &Square{side: 1}
)
"#,
    );

    let values: Vec<&Expression> = file
        .generic_declarations()
        .flat_map(|declaration| &declaration.specs)
        .flat_map(|spec| match spec {
            Spec::Value(value) => value.values.iter(),
            Spec::Type(_) => [].iter(),
        })
        .collect();
    assert_eq!(values.len(), 6);

    assert!(matches!(
        values[0],
        Expression::CompositeLiteral {
            type_expression: Some(TypeExpression::Name { .. }),
            ..
        }
    ));
    assert!(matches!(
        values[1],
        Expression::Unary {
            operator: UnaryOperator::Address,
            ..
        }
    ));
    let Expression::Call { function, .. } = values[2] else {
        panic!("expected conversion call");
    };
    assert!(matches!(
        function.as_type_expression(),
        Some(TypeExpression::Parenthesized { .. })
    ));

    let grouped = file.generic_declarations().nth(3).unwrap();
    assert!(grouped.grouped);
    assert_eq!(grouped.token, DeclarationToken::Var);
    let Spec::Value(pair) = &grouped.specs[1] else {
        panic!("expected value spec");
    };
    assert_eq!(pair.names.len(), 2);
    assert!(pair.names.iter().all(|name| name.is_blank()));
}

#[test]
fn attaches_doc_comments_to_declarations_and_grouped_specs() {
    let file = parse(
        r#"package p

// Hidden is skipped.
// #noverifyiface
type Hidden struct{}

type (
	// Inner is documented.
	Inner struct{}
	Bare struct{} // trailing comments are not docs
)

// detached comment

type Loose struct{}
"#,
    );

    let declarations: Vec<_> = file.generic_declarations().collect();
    let hidden_doc = declarations[0].doc.as_ref().unwrap();
    assert!(hidden_doc.contains("#noverifyiface"));
    assert_eq!(hidden_doc.text(), "Hidden is skipped.\n#noverifyiface\n");

    assert!(declarations[1].doc.is_none());
    let Spec::Type(inner) = &declarations[1].specs[0] else {
        panic!("expected type spec");
    };
    assert!(inner.doc.is_some());
    let Spec::Type(bare) = &declarations[1].specs[1] else {
        panic!("expected type spec");
    };
    assert!(bare.doc.is_none());

    assert!(declarations[2].doc.is_none());
}

#[test]
fn records_type_assertions_in_function_bodies() {
    let file = parse(
        r#"package p

func check(value any) {
	if _, ok := value.(Shape); ok {
		switch value.(type) {
		case *Square:
		}
	}
	handler := func() { _ = value.(io.Reader) }
	_ = handler
	_ = value.(*Square).side
}

var guard = func(v any) bool { _, ok := v.(fmt.Stringer); return ok }
"#,
    );

    let mut asserted = Vec::new();
    for_each_type_assertion(&file, &mut |assertion| {
        asserted.push(match &assertion.asserted_type {
            None => "type".to_string(),
            Some(TypeExpression::Name {
                qualifier, name, ..
            }) => match qualifier {
                Some(qualifier) => format!("{}.{}", qualifier.name, name.name),
                None => name.name.clone(),
            },
            Some(TypeExpression::Pointer { .. }) => "pointer".to_string(),
            Some(_) => "other".to_string(),
        });
    });
    assert_eq!(
        asserted,
        vec!["Shape", "type", "io.Reader", "pointer", "fmt.Stringer"]
    );
}

#[test]
fn parses_generic_declarations() {
    let file = parse(
        r#"package p

type Number interface {
	~int | ~float64
}

type List[T any] struct {
	items []T
}

type Table [4]int

func (l *List[T]) Len() int { return len(l.items) }

func Map[K comparable, V any](m map[K]V) []K { return nil }
"#,
    );

    assert_eq!(type_names(&file), vec!["Number", "List", "Table"]);
    let Spec::Type(list) = &file.generic_declarations().nth(1).unwrap().specs[0] else {
        panic!("expected type spec");
    };
    assert_eq!(list.type_parameters.len(), 1);
    let Spec::Type(table) = &file.generic_declarations().nth(2).unwrap().specs[0] else {
        panic!("expected type spec");
    };
    assert!(table.type_parameters.is_empty());
    assert!(matches!(
        &table.type_expression,
        TypeExpression::Array { length: Some(length), .. } if length == "4"
    ));

    let functions: Vec<_> = file.function_declarations().collect();
    assert_eq!(
        functions[0].receiver.as_ref().unwrap().type_arguments.len(),
        1
    );
    assert_eq!(functions[1].type_parameters.len(), 2);
}

#[test]
fn reports_syntax_errors() {
    let Err(diagnostics) = parse_file("package p\n\ntype Broken struct {\n\tfield\n") else {
        panic!("expected parse failure");
    };
    assert!(!diagnostics.is_empty());

    let Err(diagnostics) = parse_file("type T struct{}\n") else {
        panic!("expected missing package clause to fail");
    };
    assert_eq!(diagnostics[0].message, "expected 'package'");
}

#[test]
fn ignores_function_declarations_without_bodies() {
    let file = parse("package p\n\nfunc external(x int) int\n");
    let function = file.function_declarations().next().unwrap();
    assert!(function.body.is_none());
    assert!(matches!(
        file.declarations[0],
        Declaration::Function(_)
    ));
}
