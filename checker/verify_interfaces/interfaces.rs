use checker__analysis_framework::Pass;
use checker__source::Position;
use checker__syntax::{DeclarationToken, Spec, TypeExpression, is_exported};
use checker__types::Type;
use tracing::debug;

use crate::descriptors::InterfaceDescriptor;

/// Exported interface declarations of the package that list at least one
/// element, in declaration order. Only package-level type declarations are
/// considered.
pub(crate) fn collect_interfaces(pass: &Pass<'_>) -> Vec<InterfaceDescriptor> {
    let mut descriptors = Vec::new();
    for file in pass.files() {
        debug!(file = %file.absolute_path.display(), "looking for interfaces");
        for declaration in file.parsed.generic_declarations() {
            if declaration.token != DeclarationToken::Type {
                continue;
            }
            for spec in &declaration.specs {
                let Spec::Type(spec) = spec else {
                    continue;
                };
                let TypeExpression::Interface(literal) = &spec.type_expression else {
                    continue;
                };
                if literal.elements.is_empty() || !is_exported(&spec.name.name) {
                    continue;
                }
                let Type::Interface(interface) =
                    pass.type_info()
                        .type_of(pass.universe(), file.id, &spec.type_expression)
                else {
                    continue;
                };
                debug!(interface = %spec.name.name, "found interface");
                descriptors.push(InterfaceDescriptor {
                    name: format!("{}.{}", pass.package_name(), spec.name.name),
                    interface,
                    position: Position::new(file.id, spec.name.span.clone()),
                    has_assertion: false,
                });
            }
        }
    }
    descriptors
}
