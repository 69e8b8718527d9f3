use checker__analysis_framework::Pass;
use checker__syntax::for_each_type_assertion;
use checker__types::Type;
use tracing::debug;

use crate::descriptors::InterfaceDescriptor;

/// Marks the local descriptors whose interface is the asserted type of some
/// `x.(I)` expression in the package.
pub(crate) fn mark_asserted_interfaces(pass: &Pass<'_>, descriptors: &mut [InterfaceDescriptor]) {
    let type_info = pass.type_info();
    let universe = pass.universe();
    for file in pass.files() {
        for_each_type_assertion(file.parsed, &mut |assertion| {
            // `x.(type)` names no type.
            let Some(asserted_type) = &assertion.asserted_type else {
                return;
            };
            let asserted = type_info.type_of(universe, file.id, asserted_type);
            let Type::Interface(interface) = universe.underlying(&asserted) else {
                return;
            };
            for descriptor in descriptors.iter_mut() {
                if descriptor.is_same_interface(&interface) && !descriptor.has_assertion {
                    debug!(interface = %descriptor.name, "interface is asserted");
                    descriptor.has_assertion = true;
                }
            }
        });
    }
}
