mod ast;
mod visit;

pub use ast::*;
pub use visit::{for_each_type_assertion, is_exported};
