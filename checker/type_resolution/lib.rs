mod expressions;
mod scope;

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use checker__source::{FileId, Position};
use checker__syntax::{InterfaceElement, ParsedFile, Spec, TypeExpression, TypeSpec};
use checker__types::{
    MethodDefinition, NamedType, NamedTypeId, Type, TypeDefinition, TypeUniverse,
};
use tracing::{debug, warn};

use expressions::{TypeExpressionResolver, TypeParameterScope};
pub use scope::FileScope;

/// A package-level type name.
#[derive(Clone, Debug)]
pub struct TypeObject {
    pub name: String,
    pub position: Position,
    /// The named type for a definition, the target type for an alias.
    pub object_type: Type,
    pub is_alias: bool,
}

/// What a pass needs to know about the types of its package.
#[derive(Debug)]
pub struct PackageTypeInfo {
    package_path: String,
    objects: HashMap<String, TypeObject>,
    file_scopes: HashMap<FileId, FileScope>,
}

impl PackageTypeInfo {
    #[must_use]
    pub fn package_path(&self) -> &str {
        &self.package_path
    }

    /// Resolves a type expression written in `file`. Names that do not
    /// resolve give [`Type::Invalid`].
    #[must_use]
    pub fn type_of(
        &self,
        universe: &TypeUniverse,
        file: FileId,
        expression: &TypeExpression,
    ) -> Type {
        self.resolver(universe, file)
            .resolve(expression, &TypeParameterScope::new())
    }

    /// The type name `name`, or `qualifier.name` through the file's imports.
    #[must_use]
    pub fn object_of(
        &self,
        universe: &TypeUniverse,
        file: FileId,
        qualifier: Option<&str>,
        name: &str,
    ) -> Option<TypeObject> {
        let Some(qualifier) = qualifier else {
            return self.objects.get(name).cloned();
        };
        let path = self.file_scopes.get(&file)?.import_path(qualifier)?;
        let object_type = universe.lookup(path, name)?;
        let position = universe
            .definition(&object_type.as_named()?.id)?
            .position
            .clone()?;
        Some(TypeObject {
            name: name.to_string(),
            position,
            is_alias: universe.alias(&NamedTypeId::new(path, name)).is_some(),
            object_type,
        })
    }

    fn resolver<'a>(
        &'a self,
        universe: &'a TypeUniverse,
        file: FileId,
    ) -> TypeExpressionResolver<'a> {
        resolver_for(
            &self.package_path,
            file,
            &self.objects,
            self.file_scopes.get(&file),
            universe,
        )
    }
}

static EMPTY_SCOPE: LazyLock<FileScope> = LazyLock::new(FileScope::default);

fn resolver_for<'a>(
    package_path: &'a str,
    file: FileId,
    objects: &'a HashMap<String, TypeObject>,
    scope: Option<&'a FileScope>,
    universe: &'a TypeUniverse,
) -> TypeExpressionResolver<'a> {
    TypeExpressionResolver {
        package_path,
        file,
        objects,
        scope: scope.unwrap_or(&EMPTY_SCOPE),
        universe,
    }
}

struct DeclaredType<'a> {
    file: FileId,
    spec: &'a TypeSpec,
}

/// Resolves the package-level types of one package and registers them in
/// the universe. Packages must be resolved after the packages they import.
pub fn resolve_package(
    universe: &mut TypeUniverse,
    package_path: &str,
    files: &[(FileId, &ParsedFile)],
    package_names: &HashMap<String, String>,
) -> PackageTypeInfo {
    let file_scopes: HashMap<FileId, FileScope> = files
        .iter()
        .map(|(file, parsed)| (*file, FileScope::from_imports(parsed, package_names)))
        .collect();

    let mut definitions = Vec::new();
    let mut aliases = Vec::new();
    let mut objects = HashMap::new();
    for (file, parsed) in files {
        for declaration in parsed.generic_declarations() {
            for spec in &declaration.specs {
                let Spec::Type(spec) = spec else {
                    continue;
                };
                let name = &spec.name.name;
                if spec.name.is_blank() {
                    continue;
                }
                if objects.contains_key(name) {
                    warn!(package = package_path, name = %name, "ignoring redeclared type name");
                    continue;
                }
                let declared = DeclaredType { file: *file, spec };
                if spec.is_alias {
                    aliases.push(declared);
                    continue;
                }
                objects.insert(
                    name.clone(),
                    TypeObject {
                        name: name.clone(),
                        position: Position::new(*file, spec.name.span.clone()),
                        object_type: Type::Named(NamedType::new(NamedTypeId::new(
                            package_path,
                            name.clone(),
                        ))),
                        is_alias: false,
                    },
                );
                definitions.push(declared);
            }
        }
    }

    resolve_aliases(
        universe,
        package_path,
        &aliases,
        &mut objects,
        &file_scopes,
    );

    // Right-hand sides first; the underlying types can only be computed once
    // every local definition is known to the universe.
    let mut right_hand_sides = Vec::new();
    for declared in &definitions {
        let resolver = resolver_for(
            package_path,
            declared.file,
            &objects,
            file_scopes.get(&declared.file),
            universe,
        );
        let type_parameters = definition_type_parameters(declared.spec);
        let right_hand_side =
            resolver.resolve(&declared.spec.type_expression, &type_parameters);
        right_hand_sides.push((resolver.named_type_id(&declared.spec.name.name), right_hand_side));
    }
    for ((id, right_hand_side), declared) in right_hand_sides.iter().zip(&definitions) {
        universe.define(
            id.clone(),
            TypeDefinition {
                type_parameters: type_parameter_names(declared.spec),
                underlying: right_hand_side.clone(),
                methods: Vec::new(),
                position: Some(Position::new(declared.file, declared.spec.name.span.clone())),
            },
        );
    }
    let underlying_types: Vec<Type> = right_hand_sides
        .iter()
        .map(|(_, right_hand_side)| match right_hand_side {
            Type::Named(_) => universe.underlying(right_hand_side),
            other => other.clone(),
        })
        .collect();

    let mut methods_by_type = collect_methods(
        universe,
        package_path,
        files,
        &objects,
        &file_scopes,
    );

    for ((id, _), (declared, underlying)) in right_hand_sides
        .into_iter()
        .zip(definitions.iter().zip(underlying_types))
    {
        let methods = methods_by_type.remove(&id.name).unwrap_or_default();
        debug!(
            type_name = %id,
            underlying = %underlying.display(),
            methods = methods.len(),
            "resolved type definition"
        );
        universe.define(
            id,
            TypeDefinition {
                type_parameters: type_parameter_names(declared.spec),
                underlying,
                methods,
                position: Some(Position::new(declared.file, declared.spec.name.span.clone())),
            },
        );
    }

    PackageTypeInfo {
        package_path: package_path.to_string(),
        objects,
        file_scopes,
    }
}

/// Aliases may refer to each other in any order; each is resolved once the
/// aliases it mentions are. Cyclic aliases stay invalid.
fn resolve_aliases(
    universe: &mut TypeUniverse,
    package_path: &str,
    aliases: &[DeclaredType<'_>],
    objects: &mut HashMap<String, TypeObject>,
    file_scopes: &HashMap<FileId, FileScope>,
) {
    let alias_names: HashSet<&str> = aliases
        .iter()
        .map(|declared| declared.spec.name.name.as_str())
        .collect();
    let mut pending: Vec<&DeclaredType<'_>> = aliases.iter().collect();

    loop {
        let before = pending.len();
        let mut still_pending = Vec::new();
        for declared in pending {
            let mut mentioned = Vec::new();
            collect_unqualified_names(&declared.spec.type_expression, &mut mentioned);
            let ready = mentioned.iter().all(|name| {
                !alias_names.contains(name.as_str()) || objects.contains_key(name.as_str())
            });
            if !ready {
                still_pending.push(declared);
                continue;
            }
            let target = resolver_for(
                package_path,
                declared.file,
                objects,
                file_scopes.get(&declared.file),
                universe,
            )
            .resolve(&declared.spec.type_expression, &TypeParameterScope::new());
            insert_alias(universe, package_path, declared, target, objects);
        }
        pending = still_pending;
        if pending.is_empty() || pending.len() == before {
            break;
        }
    }

    for declared in pending {
        warn!(
            package = package_path,
            name = %declared.spec.name.name,
            "alias cycle"
        );
        insert_alias(universe, package_path, declared, Type::Invalid, objects);
    }
}

fn insert_alias(
    universe: &mut TypeUniverse,
    package_path: &str,
    declared: &DeclaredType<'_>,
    target: Type,
    objects: &mut HashMap<String, TypeObject>,
) {
    let name = declared.spec.name.name.clone();
    universe.define_alias(NamedTypeId::new(package_path, name.clone()), target.clone());
    objects.insert(
        name.clone(),
        TypeObject {
            name,
            position: Position::new(declared.file, declared.spec.name.span.clone()),
            object_type: target,
            is_alias: true,
        },
    );
}

fn collect_methods(
    universe: &TypeUniverse,
    package_path: &str,
    files: &[(FileId, &ParsedFile)],
    objects: &HashMap<String, TypeObject>,
    file_scopes: &HashMap<FileId, FileScope>,
) -> HashMap<String, Vec<MethodDefinition>> {
    let mut methods_by_type: HashMap<String, Vec<MethodDefinition>> = HashMap::new();
    for (file, parsed) in files {
        let resolver = resolver_for(
            package_path,
            *file,
            objects,
            file_scopes.get(file),
            universe,
        );
        for function in parsed.function_declarations() {
            let Some(receiver) = &function.receiver else {
                continue;
            };
            // Methods declared through a local alias belong to its target.
            let Some(receiver_type) = objects
                .get(&receiver.base_type_name.name)
                .and_then(|object| object.object_type.as_named())
                .filter(|named| named.id.package_path == package_path)
            else {
                continue;
            };
            let definition_parameters = universe
                .definition(&receiver_type.id)
                .map(|definition| definition.type_parameters.clone())
                .unwrap_or_default();
            let type_parameters: TypeParameterScope = receiver
                .type_arguments
                .iter()
                .zip(&definition_parameters)
                .map(|(local, declared)| {
                    (local.name.clone(), Type::TypeParameter(declared.clone()))
                })
                .collect();
            methods_by_type
                .entry(receiver_type.id.name.clone())
                .or_default()
                .push(MethodDefinition {
                    name: function.name.name.clone(),
                    signature: resolver.resolve_signature(&function.signature, &type_parameters),
                    pointer_receiver: receiver.pointer,
                });
        }
    }
    methods_by_type
}

fn type_parameter_names(spec: &TypeSpec) -> Vec<String> {
    spec.type_parameters
        .iter()
        .map(|parameter| parameter.name.name.clone())
        .collect()
}

fn definition_type_parameters(spec: &TypeSpec) -> TypeParameterScope {
    spec.type_parameters
        .iter()
        .map(|parameter| {
            (
                parameter.name.name.clone(),
                Type::TypeParameter(parameter.name.name.clone()),
            )
        })
        .collect()
}

fn collect_unqualified_names(expression: &TypeExpression, names: &mut Vec<String>) {
    match expression {
        TypeExpression::Name {
            qualifier,
            name,
            type_arguments,
            ..
        } => {
            if qualifier.is_none() {
                names.push(name.name.clone());
            }
            for argument in type_arguments {
                collect_unqualified_names(argument, names);
            }
        }
        TypeExpression::Pointer { element, .. }
        | TypeExpression::Slice { element, .. }
        | TypeExpression::Array { element, .. }
        | TypeExpression::Channel { element, .. } => collect_unqualified_names(element, names),
        TypeExpression::Map { key, value, .. } => {
            collect_unqualified_names(key, names);
            collect_unqualified_names(value, names);
        }
        TypeExpression::Parenthesized { inner, .. } => collect_unqualified_names(inner, names),
        TypeExpression::Function(function) => {
            for parameter in function.parameters.iter().chain(&function.results) {
                collect_unqualified_names(&parameter.type_expression, names);
            }
        }
        TypeExpression::Struct(struct_type) => {
            for field in &struct_type.fields {
                collect_unqualified_names(&field.type_expression, names);
            }
        }
        TypeExpression::Interface(interface) => {
            for element in &interface.elements {
                match element {
                    InterfaceElement::Method { signature, .. } => collect_unqualified_names(
                        &TypeExpression::Function(signature.clone()),
                        names,
                    ),
                    InterfaceElement::Embedded { terms, .. } => {
                        for term in terms {
                            collect_unqualified_names(&term.type_expression, names);
                        }
                    }
                }
            }
        }
    }
}
