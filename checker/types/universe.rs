use std::collections::{HashMap, HashSet};

use checker__source::Position;

use crate::types::{
    BasicKind, EmbeddedElement, Field, InterfaceType, LiteralId, Method, NamedType, NamedTypeId,
    Signature, StructType, Type, TypeTerm,
};

#[derive(Clone, Debug)]
pub struct TypeDefinition {
    pub type_parameters: Vec<String>,
    pub underlying: Type,
    pub methods: Vec<MethodDefinition>,
    /// `None` for predeclared types.
    pub position: Option<Position>,
}

#[derive(Clone, Debug)]
pub struct MethodDefinition {
    pub name: String,
    pub signature: Signature,
    pub pointer_receiver: bool,
}

/// Workspace-wide registry of defined types. Packages register their
/// definitions in dependency order; later packages only read what earlier
/// ones registered.
#[derive(Clone, Debug)]
pub struct TypeUniverse {
    definitions: HashMap<NamedTypeId, TypeDefinition>,
    aliases: HashMap<NamedTypeId, Type>,
}

impl Default for TypeUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeUniverse {
    #[must_use]
    pub fn new() -> Self {
        let mut universe = Self {
            definitions: HashMap::new(),
            aliases: HashMap::new(),
        };
        universe.define(
            NamedTypeId::predeclared("error"),
            TypeDefinition {
                type_parameters: Vec::new(),
                underlying: Type::Interface(InterfaceType {
                    id: LiteralId::Predeclared("error".to_string()),
                    methods: vec![Method {
                        name: "Error".to_string(),
                        signature: Signature {
                            parameters: Vec::new(),
                            results: vec![Type::Basic(BasicKind::String)],
                            variadic: false,
                        },
                    }],
                    embedded: Vec::new(),
                }),
                methods: Vec::new(),
                position: None,
            },
        );
        universe.define(
            NamedTypeId::predeclared("comparable"),
            TypeDefinition {
                type_parameters: Vec::new(),
                underlying: Type::Interface(InterfaceType {
                    id: LiteralId::Predeclared("comparable".to_string()),
                    methods: Vec::new(),
                    embedded: Vec::new(),
                }),
                methods: Vec::new(),
                position: None,
            },
        );
        universe.define_alias(
            NamedTypeId::predeclared("any"),
            Type::Interface(InterfaceType {
                id: LiteralId::Predeclared("any".to_string()),
                methods: Vec::new(),
                embedded: Vec::new(),
            }),
        );
        universe
    }

    pub fn define(&mut self, id: NamedTypeId, definition: TypeDefinition) {
        self.definitions.insert(id, definition);
    }

    pub fn define_alias(&mut self, id: NamedTypeId, target: Type) {
        self.aliases.insert(id, target);
    }

    #[must_use]
    pub fn definition(&self, id: &NamedTypeId) -> Option<&TypeDefinition> {
        self.definitions.get(id)
    }

    #[must_use]
    pub fn alias(&self, id: &NamedTypeId) -> Option<&Type> {
        self.aliases.get(id)
    }

    /// Resolves a name of a package (or of the predeclared scope when the
    /// path is empty) to the type it denotes.
    #[must_use]
    pub fn lookup(&self, package_path: &str, name: &str) -> Option<Type> {
        if package_path.is_empty()
            && let Some(kind) = BasicKind::from_name(name)
        {
            return Some(Type::Basic(kind));
        }
        let id = NamedTypeId::new(package_path, name);
        if let Some(target) = self.aliases.get(&id) {
            return Some(target.clone());
        }
        self.definitions
            .contains_key(&id)
            .then(|| Type::Named(NamedType::new(id)))
    }

    /// The underlying type. Named types from packages outside the universe
    /// are opaque and have an invalid underlying type.
    #[must_use]
    pub fn underlying(&self, value_type: &Type) -> Type {
        let mut current = value_type.clone();
        let mut seen = HashSet::new();
        while let Type::Named(named) = &current {
            if !seen.insert(named.id.clone()) {
                return Type::Invalid;
            }
            let Some(definition) = self.definitions.get(&named.id) else {
                return Type::Invalid;
            };
            current = instantiate(
                &definition.underlying,
                &definition.type_parameters,
                &named.type_arguments,
            );
        }
        current
    }

    /// Declared methods of a named type, with type arguments substituted.
    #[must_use]
    pub fn declared_methods(&self, named: &NamedType) -> Vec<MethodDefinition> {
        let Some(definition) = self.definitions.get(&named.id) else {
            return Vec::new();
        };
        definition
            .methods
            .iter()
            .map(|method| MethodDefinition {
                name: method.name.clone(),
                signature: instantiate_signature(
                    &method.signature,
                    &definition.type_parameters,
                    &named.type_arguments,
                ),
                pointer_receiver: method.pointer_receiver,
            })
            .collect()
    }
}

fn instantiate(value_type: &Type, parameters: &[String], arguments: &[Type]) -> Type {
    if parameters.is_empty() || arguments.is_empty() {
        return value_type.clone();
    }
    let substitution: HashMap<&str, &Type> = parameters
        .iter()
        .map(String::as_str)
        .zip(arguments)
        .collect();
    substitute(value_type, &substitution)
}

fn instantiate_signature(
    signature: &Signature,
    parameters: &[String],
    arguments: &[Type],
) -> Signature {
    match instantiate(
        &Type::Signature(signature.clone()),
        parameters,
        arguments,
    ) {
        Type::Signature(signature) => signature,
        _ => signature.clone(),
    }
}

fn substitute(value_type: &Type, substitution: &HashMap<&str, &Type>) -> Type {
    let recurse = |inner: &Type| Box::new(substitute(inner, substitution));
    match value_type {
        Type::TypeParameter(name) => substitution
            .get(name.as_str())
            .map_or_else(|| value_type.clone(), |argument| (*argument).clone()),
        Type::Basic(_) | Type::Invalid => value_type.clone(),
        Type::Named(named) => Type::Named(NamedType {
            id: named.id.clone(),
            type_arguments: named
                .type_arguments
                .iter()
                .map(|argument| substitute(argument, substitution))
                .collect(),
        }),
        Type::Pointer(element) => Type::Pointer(recurse(element)),
        Type::Slice(element) => Type::Slice(recurse(element)),
        Type::Array { length, element } => Type::Array {
            length: length.clone(),
            element: recurse(element),
        },
        Type::Map { key, value } => Type::Map {
            key: recurse(key),
            value: recurse(value),
        },
        Type::Channel { direction, element } => Type::Channel {
            direction: *direction,
            element: recurse(element),
        },
        Type::Signature(signature) => Type::Signature(Signature {
            parameters: signature
                .parameters
                .iter()
                .map(|parameter| substitute(parameter, substitution))
                .collect(),
            results: signature
                .results
                .iter()
                .map(|result| substitute(result, substitution))
                .collect(),
            variadic: signature.variadic,
        }),
        Type::Struct(struct_type) => Type::Struct(StructType {
            id: struct_type.id.clone(),
            fields: struct_type
                .fields
                .iter()
                .map(|field| Field {
                    name: field.name.clone(),
                    field_type: substitute(&field.field_type, substitution),
                    embedded: field.embedded,
                })
                .collect(),
        }),
        Type::Interface(interface) => Type::Interface(InterfaceType {
            id: interface.id.clone(),
            methods: interface
                .methods
                .iter()
                .map(|method| {
                    let Type::Signature(signature) =
                        substitute(&Type::Signature(method.signature.clone()), substitution)
                    else {
                        return method.clone();
                    };
                    Method {
                        name: method.name.clone(),
                        signature,
                    }
                })
                .collect(),
            embedded: interface
                .embedded
                .iter()
                .map(|element| EmbeddedElement {
                    terms: element
                        .terms
                        .iter()
                        .map(|term| TypeTerm {
                            tilde: term.tilde,
                            term_type: substitute(&term.term_type, substitution),
                        })
                        .collect(),
                })
                .collect(),
        }),
    }
}
