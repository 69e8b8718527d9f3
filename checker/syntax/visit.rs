use crate::ast::{Declaration, Expression, ParsedFile, Spec, TypeAssertion};

/// Go's export rule: the first character is an upper-case letter.
#[must_use]
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}

/// Calls `visit` for every type-assertion expression in the file, in source
/// order within each declaration: top-level initializers, function bodies
/// and the bodies of function literals nested in initializers.
pub fn for_each_type_assertion(file: &ParsedFile, visit: &mut dyn FnMut(&TypeAssertion)) {
    for declaration in &file.declarations {
        match declaration {
            Declaration::Generic(generic) => {
                for spec in &generic.specs {
                    let Spec::Value(value_spec) = spec else {
                        continue;
                    };
                    for value in &value_spec.values {
                        visit_expression(value, visit);
                    }
                }
            }
            Declaration::Function(function) => {
                if let Some(body) = &function.body {
                    for assertion in &body.type_assertions {
                        visit(assertion);
                    }
                }
            }
        }
    }
}

fn visit_expression(expression: &Expression, visit: &mut dyn FnMut(&TypeAssertion)) {
    match expression {
        Expression::Identifier(_) | Expression::BasicLiteral { .. } | Expression::Type(_) => {}
        Expression::CompositeLiteral { elements, .. } => {
            for element in elements {
                visit_expression(element, visit);
            }
        }
        Expression::KeyValue { key, value, .. } => {
            visit_expression(key, visit);
            visit_expression(value, visit);
        }
        Expression::FunctionLiteral { body, .. } => {
            for assertion in &body.type_assertions {
                visit(assertion);
            }
        }
        Expression::Parenthesized { inner, .. } => visit_expression(inner, visit),
        Expression::Selector { operand, .. }
        | Expression::Star { operand, .. }
        | Expression::Unary { operand, .. } => visit_expression(operand, visit),
        Expression::Index {
            operand, indices, ..
        } => {
            visit_expression(operand, visit);
            for index in indices {
                visit_expression(index, visit);
            }
        }
        Expression::Slice {
            operand, bounds, ..
        } => {
            visit_expression(operand, visit);
            for bound in bounds.iter().flatten() {
                visit_expression(bound, visit);
            }
        }
        Expression::TypeAssertion { operand, assertion } => {
            visit_expression(operand, visit);
            visit(assertion);
        }
        Expression::Call {
            function,
            arguments,
            ..
        } => {
            visit_expression(function, visit);
            for argument in arguments {
                visit_expression(argument, visit);
            }
        }
        Expression::Binary { left, right, .. } => {
            visit_expression(left, visit);
            visit_expression(right, visit);
        }
    }
}
