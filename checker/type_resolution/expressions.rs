use std::collections::HashMap;

use checker__source::FileId;
use checker__syntax::{
    self as syntax, FieldDeclaration, FunctionType, InterfaceElement, TypeExpression,
};
use checker__types::{
    ChannelDirection, EmbeddedElement, Field, InterfaceType, LiteralId, Method, NamedType,
    NamedTypeId, Signature, StructType, Type, TypeTerm, TypeUniverse,
};

use crate::TypeObject;
use crate::scope::FileScope;

/// Type parameters in scope, mapped to the type they stand for.
pub(crate) type TypeParameterScope = HashMap<String, Type>;

/// Resolves type expressions written in one file of a package.
pub(crate) struct TypeExpressionResolver<'a> {
    pub(crate) package_path: &'a str,
    pub(crate) file: FileId,
    pub(crate) objects: &'a HashMap<String, TypeObject>,
    pub(crate) scope: &'a FileScope,
    pub(crate) universe: &'a TypeUniverse,
}

impl TypeExpressionResolver<'_> {
    pub(crate) fn resolve(
        &self,
        expression: &TypeExpression,
        type_parameters: &TypeParameterScope,
    ) -> Type {
        match expression {
            TypeExpression::Name {
                qualifier,
                name,
                type_arguments,
                ..
            } => {
                let base = match qualifier {
                    Some(qualifier) => self.resolve_qualified(&qualifier.name, &name.name),
                    None => self.resolve_unqualified(&name.name, type_parameters),
                };
                self.instantiate(base, type_arguments, type_parameters)
            }
            TypeExpression::Pointer { element, .. } => {
                Type::pointer_to(self.resolve(element, type_parameters))
            }
            TypeExpression::Slice { element, .. } => {
                Type::Slice(Box::new(self.resolve(element, type_parameters)))
            }
            TypeExpression::Array {
                length, element, ..
            } => Type::Array {
                length: length.clone(),
                element: Box::new(self.resolve(element, type_parameters)),
            },
            TypeExpression::Map { key, value, .. } => Type::Map {
                key: Box::new(self.resolve(key, type_parameters)),
                value: Box::new(self.resolve(value, type_parameters)),
            },
            TypeExpression::Channel {
                direction, element, ..
            } => Type::Channel {
                direction: match direction {
                    syntax::ChannelDirection::Both => ChannelDirection::Both,
                    syntax::ChannelDirection::Send => ChannelDirection::Send,
                    syntax::ChannelDirection::Receive => ChannelDirection::Receive,
                },
                element: Box::new(self.resolve(element, type_parameters)),
            },
            TypeExpression::Function(function) => {
                Type::Signature(self.resolve_signature(function, type_parameters))
            }
            TypeExpression::Struct(struct_type) => Type::Struct(StructType {
                id: self.literal_id(struct_type.span.start),
                fields: struct_type
                    .fields
                    .iter()
                    .flat_map(|field| self.resolve_fields(field, type_parameters))
                    .collect(),
            }),
            TypeExpression::Interface(interface) => {
                let mut methods = Vec::new();
                let mut embedded = Vec::new();
                for element in &interface.elements {
                    match element {
                        InterfaceElement::Method {
                            name, signature, ..
                        } => methods.push(Method {
                            name: name.name.clone(),
                            signature: self.resolve_signature(signature, type_parameters),
                        }),
                        InterfaceElement::Embedded { terms, .. } => {
                            embedded.push(EmbeddedElement {
                                terms: terms
                                    .iter()
                                    .map(|term| TypeTerm {
                                        tilde: term.tilde,
                                        term_type: self
                                            .resolve(&term.type_expression, type_parameters),
                                    })
                                    .collect(),
                            });
                        }
                    }
                }
                Type::Interface(InterfaceType {
                    id: self.literal_id(interface.span.start),
                    methods,
                    embedded,
                })
            }
            TypeExpression::Parenthesized { inner, .. } => self.resolve(inner, type_parameters),
        }
    }

    pub(crate) fn resolve_signature(
        &self,
        function: &FunctionType,
        type_parameters: &TypeParameterScope,
    ) -> Signature {
        let mut variadic = false;
        let parameters = function
            .parameters
            .iter()
            .map(|parameter| {
                let parameter_type = self.resolve(&parameter.type_expression, type_parameters);
                if parameter.variadic {
                    variadic = true;
                    return Type::Slice(Box::new(parameter_type));
                }
                parameter_type
            })
            .collect();
        let results = function
            .results
            .iter()
            .map(|result| self.resolve(&result.type_expression, type_parameters))
            .collect();
        Signature {
            parameters,
            results,
            variadic,
        }
    }

    fn resolve_fields(
        &self,
        field: &FieldDeclaration,
        type_parameters: &TypeParameterScope,
    ) -> Vec<Field> {
        let field_type = self.resolve(&field.type_expression, type_parameters);
        if field.is_embedded() {
            return vec![Field {
                name: embedded_field_name(&field.type_expression).unwrap_or_default(),
                field_type,
                embedded: true,
            }];
        }
        field
            .names
            .iter()
            .map(|name| Field {
                name: name.name.clone(),
                field_type: field_type.clone(),
                embedded: false,
            })
            .collect()
    }

    fn resolve_unqualified(&self, name: &str, type_parameters: &TypeParameterScope) -> Type {
        if let Some(parameter) = type_parameters.get(name) {
            return parameter.clone();
        }
        if let Some(object) = self.objects.get(name) {
            return object.object_type.clone();
        }
        for path in self.scope.dot_imports() {
            if let Some(found) = self.universe.lookup(path, name) {
                return found;
            }
        }
        self.universe.lookup("", name).unwrap_or(Type::Invalid)
    }

    /// Names from packages the universe does not know keep their identity
    /// but stay opaque.
    fn resolve_qualified(&self, qualifier: &str, name: &str) -> Type {
        let Some(path) = self.scope.import_path(qualifier) else {
            return Type::Invalid;
        };
        if path == "unsafe" && name == "Pointer" {
            return Type::Basic(checker__types::BasicKind::UnsafePointer);
        }
        self.universe
            .lookup(path, name)
            .unwrap_or_else(|| Type::Named(NamedType::new(NamedTypeId::new(path, name))))
    }

    fn instantiate(
        &self,
        base: Type,
        type_arguments: &[TypeExpression],
        type_parameters: &TypeParameterScope,
    ) -> Type {
        if type_arguments.is_empty() {
            return base;
        }
        match base {
            Type::Named(named) if named.type_arguments.is_empty() => Type::Named(NamedType {
                id: named.id,
                type_arguments: type_arguments
                    .iter()
                    .map(|argument| self.resolve(argument, type_parameters))
                    .collect(),
            }),
            other => other,
        }
    }

    fn literal_id(&self, offset: usize) -> LiteralId {
        LiteralId::Source {
            file: self.file,
            offset,
        }
    }

    pub(crate) fn named_type_id(&self, name: &str) -> NamedTypeId {
        NamedTypeId::new(self.package_path, name)
    }
}

/// The implicit name of an embedded field: its type name without pointer,
/// qualifier or type arguments.
fn embedded_field_name(expression: &TypeExpression) -> Option<String> {
    match expression {
        TypeExpression::Name { name, .. } => Some(name.name.clone()),
        TypeExpression::Pointer { element, .. } => embedded_field_name(element),
        TypeExpression::Parenthesized { inner, .. } => embedded_field_name(inner),
        _ => None,
    }
}
