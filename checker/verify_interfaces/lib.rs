mod compliance_assertions;
mod descriptors;
mod implementations;
mod interfaces;
mod type_assertions;

use checker__analysis_framework::{AnalysisError, Analyzer, Pass};
use tracing::debug;

use compliance_assertions::verify_compliance_assertions;
pub use descriptors::{InterfaceDescriptor, InterfaceVerifierFact};
use implementations::find_implementations;
use interfaces::collect_interfaces;
use type_assertions::mark_asserted_interfaces;

pub const ANALYZER_NAME: &str = "verifyiface";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VerifyInterfacesConfig {
    /// Report every unverified implementation, not only those of interfaces
    /// that some type assertion uses.
    pub strict_check: bool,
}

/// Requires every struct type implementing an exported interface to carry a
/// compile-time compliance assertion such as `var _ I = (*T)(nil)`.
#[derive(Clone, Debug, Default)]
pub struct VerifyInterfaces {
    config: VerifyInterfacesConfig,
}

impl VerifyInterfaces {
    #[must_use]
    pub fn new(config: VerifyInterfacesConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> VerifyInterfacesConfig {
        self.config
    }
}

impl Analyzer for VerifyInterfaces {
    fn name(&self) -> &'static str {
        ANALYZER_NAME
    }

    fn doc(&self) -> &'static str {
        "check that a interface implementation is verified"
    }

    fn run(&self, pass: &mut Pass<'_>) -> Result<(), AnalysisError> {
        if pass.package_name() == "fmt" {
            debug!(package = pass.package_path(), "skipping package fmt");
            return Ok(());
        }

        let mut local_interfaces = collect_interfaces(pass);
        mark_asserted_interfaces(pass, &mut local_interfaces);

        let mut known_interfaces = local_interfaces.clone();
        for (_, fact) in pass.all_package_facts::<InterfaceVerifierFact>()? {
            known_interfaces.extend(fact.interfaces);
        }
        debug!(
            package = pass.package_path(),
            local = local_interfaces.len(),
            total = known_interfaces.len(),
            "collected interfaces"
        );

        let mut bindings = find_implementations(pass, &known_interfaces);
        verify_compliance_assertions(pass, &known_interfaces, &mut bindings);

        for binding in bindings {
            let interface = &known_interfaces[binding.descriptor];
            if binding.verified || !(self.config.strict_check || interface.has_assertion) {
                continue;
            }
            pass.report(
                binding.record_position,
                format!(
                    "struct {} doesn't verify interface compliance for {}",
                    binding.record_name, interface.name
                ),
            );
        }

        if !local_interfaces.is_empty() && pass.package_name() != "main" {
            pass.export_package_fact(&InterfaceVerifierFact {
                interfaces: local_interfaces,
            })?;
        }
        Ok(())
    }
}
