mod identity;
mod method_sets;
mod types;
mod universe;

pub use method_sets::MethodSet;
pub use types::{
    BasicKind, ChannelDirection, EmbeddedElement, Field, InterfaceType, LiteralId, Method,
    NamedType, NamedTypeId, Signature, StructType, Type, TypeTerm,
};
pub use universe::{MethodDefinition, TypeDefinition, TypeUniverse};
