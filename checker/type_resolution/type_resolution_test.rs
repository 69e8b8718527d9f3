use std::collections::HashMap;

use checker__parsing::parse_file;
use checker__source::FileId;
use checker__syntax::{ParsedFile, Spec, TypeExpression};
use checker__type_resolution::{PackageTypeInfo, resolve_package};
use checker__types::{Type, TypeUniverse};

const SHAPES: &str = r#"package shapes

type Shape interface {
	Area() float64
}

type Named interface {
	Shape
	Name() string
}

type Square struct {
	side float64
}

func (s Square) Area() float64 { return s.side * s.side }

func (s *Square) Name() string { return "square" }

type Alias = Square

type Defined Square

type Wrapper struct {
	*Square
}
"#;

const CONSUMER: &str = r#"package consumer

import (
	geo "example.com/shapes"
	"gopkg.in/yaml.v3"
)

type Circle struct{}

func (c Circle) Area() float64 { return 0 }

type Node = yaml.Node

var _ geo.Shape = Circle{}
"#;

fn parse(source: &str) -> ParsedFile {
    parse_file(source).unwrap_or_else(|diagnostics| panic!("parse failed: {diagnostics:?}"))
}

fn resolve(
    universe: &mut TypeUniverse,
    package_path: &str,
    file: FileId,
    parsed: &ParsedFile,
) -> PackageTypeInfo {
    let package_names = HashMap::from([(
        "example.com/shapes".to_string(),
        "shapes".to_string(),
    )]);
    resolve_package(universe, package_path, &[(file, parsed)], &package_names)
}

fn object_type(info: &PackageTypeInfo, universe: &TypeUniverse, name: &str) -> Type {
    info.object_of(universe, FileId(0), None, name)
        .unwrap_or_else(|| panic!("type {name} should resolve"))
        .object_type
}

fn interface(universe: &TypeUniverse, value_type: &Type) -> checker__types::InterfaceType {
    match universe.underlying(value_type) {
        Type::Interface(interface) => interface,
        other => panic!("expected interface, got {}", other.display()),
    }
}

#[test]
fn resolves_methods_and_implementations() {
    let parsed = parse(SHAPES);
    let mut universe = TypeUniverse::new();
    let info = resolve(&mut universe, "example.com/shapes", FileId(0), &parsed);

    let shape = interface(&universe, &object_type(&info, &universe, "Shape"));
    let named = interface(&universe, &object_type(&info, &universe, "Named"));
    let square = object_type(&info, &universe, "Square");

    assert!(universe.implements(&square, &shape));
    assert!(!universe.implements(&square, &named));
    assert!(universe.implements(&Type::pointer_to(square.clone()), &named));

    let wrapper = object_type(&info, &universe, "Wrapper");
    assert!(universe.implements(&wrapper, &named));

    let alias = info
        .object_of(&universe, FileId(0), None, "Alias")
        .unwrap();
    assert!(alias.is_alias);
    assert_eq!(alias.object_type, square);

    // A defined type shares the struct but not the methods.
    let defined = object_type(&info, &universe, "Defined");
    assert_eq!(universe.underlying(&defined), universe.underlying(&square));
    assert!(!universe.implements(&defined, &shape));
}

#[test]
fn resolves_qualified_names_through_imports() {
    let shapes = parse(SHAPES);
    let consumer = parse(CONSUMER);
    let mut universe = TypeUniverse::new();
    resolve(&mut universe, "example.com/shapes", FileId(0), &shapes);
    let info = resolve(&mut universe, "example.com/consumer", FileId(1), &consumer);

    let shape = info
        .object_of(&universe, FileId(1), Some("geo"), "Shape")
        .expect("imported interface should resolve");
    assert_eq!(shape.position.file, FileId(0));
    let circle = info
        .object_of(&universe, FileId(1), None, "Circle")
        .unwrap()
        .object_type;
    assert!(universe.implements(&circle, &interface(&universe, &shape.object_type)));

    let node = info
        .object_of(&universe, FileId(1), None, "Node")
        .unwrap()
        .object_type;
    assert_eq!(node.display(), "gopkg.in/yaml.v3.Node");
    assert!(universe.underlying(&node).is_invalid());

    let declared_type = consumer
        .generic_declarations()
        .flat_map(|declaration| &declaration.specs)
        .find_map(|spec| match spec {
            Spec::Value(value) => value.type_expression.clone(),
            Spec::Type(_) => None,
        })
        .unwrap();
    assert!(matches!(declared_type, TypeExpression::Name { .. }));
    assert_eq!(
        info.type_of(&universe, FileId(1), &declared_type),
        shape.object_type
    );
}

#[test]
fn literal_handles_are_stable_across_lookups() {
    let parsed = parse(SHAPES);
    let mut universe = TypeUniverse::new();
    let info = resolve(&mut universe, "example.com/shapes", FileId(0), &parsed);

    let Spec::Type(shape_spec) = &parsed.generic_declarations().next().unwrap().specs[0] else {
        panic!("expected type spec");
    };
    let from_syntax = info.type_of(&universe, FileId(0), &shape_spec.type_expression);
    let from_object = universe.underlying(&object_type(&info, &universe, "Shape"));
    assert_eq!(from_syntax, from_object);
}

#[test]
fn resolves_generic_receivers_and_unknown_names() {
    let parsed = parse(
        r#"package lists

type Getter interface {
	Get() string
}

type List[T any] struct {
	items []T
}

func (l List[E]) Get() E { var zero E; return zero }

type Broken struct {
	missing Unknown
}
"#,
    );
    let mut universe = TypeUniverse::new();
    let info = resolve(&mut universe, "example.com/lists", FileId(0), &parsed);

    let getter = interface(&universe, &object_type(&info, &universe, "Getter"));
    let Type::Named(list) = object_type(&info, &universe, "List") else {
        panic!("expected named type");
    };
    let list_of = |argument: &str| {
        Type::Named(checker__types::NamedType {
            id: list.id.clone(),
            type_arguments: vec![universe.lookup("", argument).unwrap()],
        })
    };
    assert!(universe.implements(&list_of("string"), &getter));
    assert!(!universe.implements(&list_of("int"), &getter));

    let Type::Struct(broken) = universe.underlying(&object_type(&info, &universe, "Broken")) else {
        panic!("expected struct");
    };
    assert!(broken.fields[0].field_type.is_invalid());
}
