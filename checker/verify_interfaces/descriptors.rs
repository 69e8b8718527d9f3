use checker__analysis_framework::PackageFact;
use checker__source::Position;
use checker__types::{InterfaceType, LiteralId};
use serde::{Deserialize, Serialize};

/// An exported, non-empty interface declared by some package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDescriptor {
    /// `<package name>.<type name>`, as it appears in diagnostics.
    pub name: String,
    pub interface: InterfaceType,
    pub position: Position,
    /// Set once a type assertion against this interface is seen in the
    /// declaring package. Never cleared.
    pub has_assertion: bool,
}

impl InterfaceDescriptor {
    #[must_use]
    pub fn is_same_interface(&self, interface: &InterfaceType) -> bool {
        self.interface.id == interface.id
    }
}

/// The fact a package exports: its own descriptors, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceVerifierFact {
    pub interfaces: Vec<InterfaceDescriptor>,
}

impl PackageFact for InterfaceVerifierFact {}

/// A struct type that implements a known interface, by value or through a
/// pointer.
#[derive(Clone, Debug)]
pub(crate) struct ImplementationBinding {
    /// Identity of the struct literal underlying the record type.
    pub(crate) record: LiteralId,
    pub(crate) record_name: String,
    pub(crate) record_position: Position,
    /// Index into the pass's list of known descriptors.
    pub(crate) descriptor: usize,
    pub(crate) verified: bool,
}
