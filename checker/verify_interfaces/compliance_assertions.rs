use checker__analysis_framework::Pass;
use checker__source::FileId;
use checker__syntax::{DeclarationToken, Expression, Spec, TypeExpression, UnaryOperator};
use checker__types::{InterfaceType, LiteralId, Type};
use tracing::debug;

use crate::descriptors::{ImplementationBinding, InterfaceDescriptor};

/// Marks bindings verified by top-level assertions of the forms
///
/// ```go
/// var _ I = T{}
/// var _ I = &T{}
/// var _ I = (*T)(nil)
/// ```
///
/// where `I` is a known interface. Either name may be package-qualified
/// (`pkg.I`, `pkg.T`) and `T` may be an instantiation such as `T[int]`, so
/// neither has to be a bare identifier.
/// Anything else is ignored.
pub(crate) fn verify_compliance_assertions(
    pass: &Pass<'_>,
    descriptors: &[InterfaceDescriptor],
    bindings: &mut [ImplementationBinding],
) {
    for file in pass.files() {
        for declaration in file.parsed.generic_declarations() {
            if declaration.token != DeclarationToken::Var {
                continue;
            }
            for spec in &declaration.specs {
                let Spec::Value(spec) = spec else {
                    continue;
                };
                let Some(declared) = &spec.type_expression else {
                    continue;
                };
                if !matches!(declared, TypeExpression::Name { .. }) {
                    continue;
                }
                let Some(interface) = known_interface(pass, file.id, declared, descriptors) else {
                    continue;
                };

                for (name, value) in spec.names.iter().zip(&spec.values) {
                    if !name.is_blank() {
                        continue;
                    }
                    let Some(record) = asserted_record(pass, file.id, value) else {
                        continue;
                    };
                    for binding in bindings.iter_mut() {
                        if binding.record == record
                            && descriptors[binding.descriptor].is_same_interface(interface)
                        {
                            debug!(
                                record = %binding.record_name,
                                interface = %descriptors[binding.descriptor].name,
                                "compliance assertion found"
                            );
                            binding.verified = true;
                        }
                    }
                }
            }
        }
    }
}

fn known_interface<'d>(
    pass: &Pass<'_>,
    file: FileId,
    declared: &TypeExpression,
    descriptors: &'d [InterfaceDescriptor],
) -> Option<&'d InterfaceType> {
    let declared = pass.type_info().type_of(pass.universe(), file, declared);
    let Type::Interface(interface) = pass.universe().underlying(&declared) else {
        return None;
    };
    descriptors
        .iter()
        .find(|descriptor| descriptor.is_same_interface(&interface))
        .map(|descriptor| &descriptor.interface)
}

/// The struct literal named by the initializer of an assertion.
fn asserted_record(pass: &Pass<'_>, file: FileId, value: &Expression) -> Option<LiteralId> {
    let record_type = match value {
        Expression::CompositeLiteral {
            type_expression, ..
        } => type_expression.clone()?,
        Expression::Unary {
            operator: UnaryOperator::Address,
            operand,
            ..
        } => {
            let Expression::CompositeLiteral {
                type_expression, ..
            } = operand.as_ref()
            else {
                return None;
            };
            type_expression.clone()?
        }
        Expression::Call {
            function,
            arguments,
            ..
        } => {
            let [Expression::Identifier(argument)] = arguments.as_slice() else {
                return None;
            };
            if argument.name != "nil" {
                return None;
            }
            let TypeExpression::Parenthesized { inner, .. } = function.as_type_expression()? else {
                return None;
            };
            let TypeExpression::Pointer { element, .. } = *inner else {
                return None;
            };
            *element
        }
        _ => return None,
    };
    if !matches!(record_type, TypeExpression::Name { .. }) {
        return None;
    }

    let resolved = pass.type_info().type_of(pass.universe(), file, &record_type);
    match pass.universe().underlying(&resolved) {
        Type::Struct(record) => Some(record.id),
        _ => None,
    }
}
