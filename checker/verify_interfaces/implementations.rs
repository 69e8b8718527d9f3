use std::collections::HashSet;
use std::sync::LazyLock;

use checker__analysis_framework::Pass;
use checker__source::{Position, path_to_key};
use checker__syntax::{DocComment, Spec};
use checker__types::Type;
use regex::Regex;
use tracing::debug;

use crate::descriptors::{ImplementationBinding, InterfaceDescriptor};

pub(crate) const SKIP_DIRECTIVE: &str = "#noverifyiface";

/// Files from the module cache, the toolchain and the build cache.
static EXTERNAL_FILES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(/pkg/mod/|/libexec/|/go-build/)").expect("external file pattern must compile")
});

fn has_skip_directive(doc: Option<&DocComment>) -> bool {
    doc.is_some_and(|doc| doc.contains(SKIP_DIRECTIVE))
}

/// Tests every package-level struct type against every known interface,
/// by value and by pointer. A struct type counts once however many names
/// refer to it.
pub(crate) fn find_implementations(
    pass: &Pass<'_>,
    descriptors: &[InterfaceDescriptor],
) -> Vec<ImplementationBinding> {
    let type_info = pass.type_info();
    let universe = pass.universe();
    let mut bindings = Vec::new();
    let mut visited: HashSet<Position> = HashSet::new();

    for file in pass.files() {
        let path = path_to_key(file.absolute_path);
        if EXTERNAL_FILES.is_match(&path) {
            debug!(file = %path, "skipping external file");
            continue;
        }
        debug!(file = %path, "looking for structs");

        for declaration in file.parsed.generic_declarations() {
            if has_skip_directive(declaration.doc.as_ref()) {
                continue;
            }
            for spec in &declaration.specs {
                let Spec::Type(spec) = spec else {
                    continue;
                };
                if has_skip_directive(spec.doc.as_ref()) {
                    continue;
                }
                let Some(object) = type_info.object_of(universe, file.id, None, &spec.name.name)
                else {
                    continue;
                };
                if !visited.insert(object.position.clone()) {
                    continue;
                }
                let Type::Struct(record) = universe.underlying(&object.object_type) else {
                    continue;
                };

                debug!(
                    record = %object.name,
                    interfaces = descriptors.len(),
                    "verifying struct"
                );
                let pointer = Type::pointer_to(object.object_type.clone());
                for (index, descriptor) in descriptors.iter().enumerate() {
                    let implemented = universe.implements(&object.object_type, &descriptor.interface)
                        || universe.implements(&pointer, &descriptor.interface);
                    debug!(
                        record = %object.name,
                        interface = %descriptor.name,
                        implemented,
                        "implementation check"
                    );
                    if implemented {
                        bindings.push(ImplementationBinding {
                            record: record.id.clone(),
                            record_name: object.name.clone(),
                            record_position: object.position.clone(),
                            descriptor: index,
                            verified: false,
                        });
                    }
                }
            }
        }
    }
    bindings
}
