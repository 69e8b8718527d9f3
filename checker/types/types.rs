use std::fmt;

use checker__source::FileId;
use serde::{Deserialize, Serialize};

/// Identity of a defined (named) type. Predeclared types such as `error`
/// live in the package with the empty path.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NamedTypeId {
    pub package_path: String,
    pub name: String,
}

impl NamedTypeId {
    pub fn new(package_path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            package_path: package_path.into(),
            name: name.into(),
        }
    }

    #[must_use]
    pub fn predeclared(name: &str) -> Self {
        Self::new("", name)
    }
}

impl fmt::Display for NamedTypeId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.package_path.is_empty() {
            write!(formatter, "{}", self.name)
        } else {
            write!(formatter, "{}.{}", self.package_path, self.name)
        }
    }
}

/// Identity of a struct or interface literal: where it was written. Two
/// literals are the same type handle only if they come from the same place.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LiteralId {
    Source { file: FileId, offset: usize },
    Predeclared(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicKind {
    // keep-sorted start
    Bool,
    Complex128,
    Complex64,
    Float32,
    Float64,
    Int,
    Int16,
    Int32,
    Int64,
    Int8,
    String,
    Uint,
    Uint16,
    Uint32,
    Uint64,
    Uint8,
    Uintptr,
    UnsafePointer,
    // keep-sorted end
}

impl BasicKind {
    /// Resolves a predeclared basic type name, including the `byte` and
    /// `rune` aliases.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let kind = match name {
            "bool" => BasicKind::Bool,
            "byte" | "uint8" => BasicKind::Uint8,
            "complex64" => BasicKind::Complex64,
            "complex128" => BasicKind::Complex128,
            "float32" => BasicKind::Float32,
            "float64" => BasicKind::Float64,
            "int" => BasicKind::Int,
            "int8" => BasicKind::Int8,
            "int16" => BasicKind::Int16,
            "int32" | "rune" => BasicKind::Int32,
            "int64" => BasicKind::Int64,
            "string" => BasicKind::String,
            "uint" => BasicKind::Uint,
            "uint16" => BasicKind::Uint16,
            "uint32" => BasicKind::Uint32,
            "uint64" => BasicKind::Uint64,
            "uintptr" => BasicKind::Uintptr,
            _ => return None,
        };
        Some(kind)
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            BasicKind::Bool => "bool",
            BasicKind::Complex128 => "complex128",
            BasicKind::Complex64 => "complex64",
            BasicKind::Float32 => "float32",
            BasicKind::Float64 => "float64",
            BasicKind::Int => "int",
            BasicKind::Int16 => "int16",
            BasicKind::Int32 => "int32",
            BasicKind::Int64 => "int64",
            BasicKind::Int8 => "int8",
            BasicKind::String => "string",
            BasicKind::Uint => "uint",
            BasicKind::Uint16 => "uint16",
            BasicKind::Uint32 => "uint32",
            BasicKind::Uint64 => "uint64",
            BasicKind::Uint8 => "uint8",
            BasicKind::Uintptr => "uintptr",
            BasicKind::UnsafePointer => "unsafe.Pointer",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelDirection {
    Both,
    Send,
    Receive,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    Basic(BasicKind),
    Named(NamedType),
    TypeParameter(String),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    Array {
        /// Length expression as written; constants are not evaluated.
        length: Option<String>,
        element: Box<Type>,
    },
    Map {
        key: Box<Type>,
        value: Box<Type>,
    },
    Channel {
        direction: ChannelDirection,
        element: Box<Type>,
    },
    Signature(Signature),
    Struct(StructType),
    Interface(InterfaceType),
    /// A type that could not be resolved.
    Invalid,
}

impl Type {
    #[must_use]
    pub fn pointer_to(element: Type) -> Self {
        Type::Pointer(Box::new(element))
    }

    #[must_use]
    pub fn is_invalid(&self) -> bool {
        matches!(self, Type::Invalid)
    }

    #[must_use]
    pub fn as_named(&self) -> Option<&NamedType> {
        match self {
            Type::Named(named) => Some(named),
            _ => None,
        }
    }

    #[must_use]
    pub fn display(&self) -> String {
        match self {
            Type::Basic(kind) => kind.name().to_string(),
            Type::Named(named) => named.display(),
            Type::TypeParameter(name) => name.clone(),
            Type::Pointer(element) => format!("*{}", element.display()),
            Type::Slice(element) => format!("[]{}", element.display()),
            Type::Array { length, element } => format!(
                "[{}]{}",
                length.as_deref().unwrap_or("..."),
                element.display()
            ),
            Type::Map { key, value } => format!("map[{}]{}", key.display(), value.display()),
            Type::Channel { direction, element } => match direction {
                ChannelDirection::Both => format!("chan {}", element.display()),
                ChannelDirection::Send => format!("chan<- {}", element.display()),
                ChannelDirection::Receive => format!("<-chan {}", element.display()),
            },
            Type::Signature(signature) => format!("func{}", signature.display()),
            Type::Struct(struct_type) => {
                let fields = struct_type
                    .fields
                    .iter()
                    .map(|field| {
                        if field.embedded {
                            field.field_type.display()
                        } else {
                            format!("{} {}", field.name, field.field_type.display())
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("; ");
                format!("struct{{{fields}}}")
            }
            Type::Interface(interface) => {
                let mut elements = interface
                    .methods
                    .iter()
                    .map(|method| format!("{}{}", method.name, method.signature.display()))
                    .collect::<Vec<_>>();
                elements.extend(interface.embedded.iter().map(EmbeddedElement::display));
                format!("interface{{{}}}", elements.join("; "))
            }
            Type::Invalid => "<invalid>".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedType {
    pub id: NamedTypeId,
    pub type_arguments: Vec<Type>,
}

impl NamedType {
    #[must_use]
    pub fn new(id: NamedTypeId) -> Self {
        Self {
            id,
            type_arguments: Vec::new(),
        }
    }

    #[must_use]
    pub fn display(&self) -> String {
        if self.type_arguments.is_empty() {
            return self.id.to_string();
        }
        let arguments = self
            .type_arguments
            .iter()
            .map(Type::display)
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}[{arguments}]", self.id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub parameters: Vec<Type>,
    pub results: Vec<Type>,
    pub variadic: bool,
}

impl Signature {
    #[must_use]
    pub fn display(&self) -> String {
        let last = self.parameters.len().saturating_sub(1);
        let parameters = self
            .parameters
            .iter()
            .enumerate()
            .map(|(index, parameter)| {
                if self.variadic && index == last {
                    format!("...{}", parameter.display())
                } else {
                    parameter.display()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");
        let results = self
            .results
            .iter()
            .map(Type::display)
            .collect::<Vec<_>>()
            .join(", ");
        match self.results.len() {
            0 => format!("({parameters})"),
            1 => format!("({parameters}) {results}"),
            _ => format!("({parameters}) ({results})"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructType {
    pub id: LiteralId,
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// For embedded fields, the type name without qualifier or pointer.
    pub name: String,
    pub field_type: Type,
    pub embedded: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceType {
    pub id: LiteralId,
    pub methods: Vec<Method>,
    pub embedded: Vec<EmbeddedElement>,
}

impl InterfaceType {
    /// Number of elements written in the literal: explicit methods plus
    /// embedded elements.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.methods.len() + self.embedded.len()
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    pub signature: Signature,
}

/// An embedded interface element: a single type (usually an interface) or a
/// union of type terms.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedElement {
    pub terms: Vec<TypeTerm>,
}

impl EmbeddedElement {
    #[must_use]
    pub fn single(element_type: Type) -> Self {
        Self {
            terms: vec![TypeTerm {
                tilde: false,
                term_type: element_type,
            }],
        }
    }

    /// The embedded type when the element is a single plain term.
    #[must_use]
    pub fn as_single(&self) -> Option<&Type> {
        match self.terms.as_slice() {
            [term] if !term.tilde => Some(&term.term_type),
            _ => None,
        }
    }

    fn display(&self) -> String {
        self.terms
            .iter()
            .map(|term| {
                if term.tilde {
                    format!("~{}", term.term_type.display())
                } else {
                    term.term_type.display()
                }
            })
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeTerm {
    pub tilde: bool,
    pub term_type: Type,
}
