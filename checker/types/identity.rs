use crate::types::{Signature, Type};
use crate::universe::TypeUniverse;

impl TypeUniverse {
    /// Go type identity. Named types are identical only to themselves (with
    /// identical type arguments); unnamed types compare structurally.
    #[must_use]
    pub fn identical(&self, left: &Type, right: &Type) -> bool {
        match (left, right) {
            (Type::Basic(left), Type::Basic(right)) => left == right,
            (Type::Named(left), Type::Named(right)) => {
                left.id == right.id
                    && left.type_arguments.len() == right.type_arguments.len()
                    && left
                        .type_arguments
                        .iter()
                        .zip(&right.type_arguments)
                        .all(|(left, right)| self.identical(left, right))
            }
            (Type::TypeParameter(left), Type::TypeParameter(right)) => left == right,
            (Type::Pointer(left), Type::Pointer(right))
            | (Type::Slice(left), Type::Slice(right)) => self.identical(left, right),
            (
                Type::Array {
                    length: left_length,
                    element: left_element,
                },
                Type::Array {
                    length: right_length,
                    element: right_element,
                },
            ) => left_length == right_length && self.identical(left_element, right_element),
            (
                Type::Map {
                    key: left_key,
                    value: left_value,
                },
                Type::Map {
                    key: right_key,
                    value: right_value,
                },
            ) => self.identical(left_key, right_key) && self.identical(left_value, right_value),
            (
                Type::Channel {
                    direction: left_direction,
                    element: left_element,
                },
                Type::Channel {
                    direction: right_direction,
                    element: right_element,
                },
            ) => left_direction == right_direction && self.identical(left_element, right_element),
            (Type::Signature(left), Type::Signature(right)) => {
                self.identical_signatures(left, right)
            }
            (Type::Struct(left), Type::Struct(right)) => {
                left.fields.len() == right.fields.len()
                    && left.fields.iter().zip(&right.fields).all(|(left, right)| {
                        left.name == right.name
                            && left.embedded == right.embedded
                            && self.identical(&left.field_type, &right.field_type)
                    })
            }
            (Type::Interface(left), Type::Interface(right)) => {
                if left.id == right.id {
                    return true;
                }
                let left_methods = self.interface_method_set(left);
                let right_methods = self.interface_method_set(right);
                left_methods.len() == right_methods.len()
                    && left_methods.iter().all(|(name, signature)| {
                        right_methods
                            .get(name)
                            .is_some_and(|other| self.identical_signatures(signature, other))
                    })
            }
            _ => false,
        }
    }

    /// Parameter names do not take part in signature identity.
    #[must_use]
    pub fn identical_signatures(&self, left: &Signature, right: &Signature) -> bool {
        left.variadic == right.variadic
            && left.parameters.len() == right.parameters.len()
            && left.results.len() == right.results.len()
            && left
                .parameters
                .iter()
                .zip(&right.parameters)
                .all(|(left, right)| self.identical(left, right))
            && left
                .results
                .iter()
                .zip(&right.results)
                .all(|(left, right)| self.identical(left, right))
    }
}
