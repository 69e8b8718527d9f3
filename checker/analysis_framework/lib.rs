mod facts;
mod pass;

use checker__diagnostics::AnalysisDiagnostic;
use tracing::debug;

pub use facts::{FactStore, PackageFact};
pub use pass::{Pass, PassFile, PassInput};

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("malformed {analyzer} fact for package {package_path}: {source}")]
    MalformedFact {
        analyzer: &'static str,
        package_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode {analyzer} fact for package {package_path}: {source}")]
    FactEncoding {
        analyzer: &'static str,
        package_path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A check that runs once per package. Packages are visited in dependency
/// order, so facts exported by a package are visible to its importers.
pub trait Analyzer {
    fn name(&self) -> &'static str;

    fn doc(&self) -> &'static str;

    fn run(&self, pass: &mut Pass<'_>) -> Result<(), AnalysisError>;
}

/// Runs `analyzer` over one package and returns what it reported.
pub fn run_analyzer(
    analyzer: &dyn Analyzer,
    input: PassInput<'_>,
    fact_store: &mut FactStore,
) -> Result<Vec<AnalysisDiagnostic>, AnalysisError> {
    let mut pass = Pass::new(analyzer.name(), input, fact_store);
    debug!(
        analyzer = analyzer.name(),
        package = pass.package_path(),
        files = pass.files().len(),
        "running analyzer"
    );
    analyzer.run(&mut pass)?;
    Ok(pass.into_diagnostics())
}
