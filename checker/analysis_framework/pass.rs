use std::path::Path;

use checker__diagnostics::AnalysisDiagnostic;
use checker__source::{FileId, Position};
use checker__syntax::ParsedFile;
use checker__type_resolution::PackageTypeInfo;
use checker__types::TypeUniverse;

use crate::AnalysisError;
use crate::facts::{FactStore, PackageFact};

#[derive(Clone, Copy, Debug)]
pub struct PassFile<'a> {
    pub id: FileId,
    pub absolute_path: &'a Path,
    pub parsed: &'a ParsedFile,
}

/// Everything the driver knows about one package when it runs an analyzer.
pub struct PassInput<'a> {
    pub package_name: String,
    pub package_path: String,
    pub files: Vec<PassFile<'a>>,
    pub type_info: &'a PackageTypeInfo,
    pub universe: &'a TypeUniverse,
    /// Workspace packages reachable through imports, dependencies first.
    pub imported_package_paths: Vec<String>,
}

/// One analyzer applied to one package.
pub struct Pass<'a> {
    analyzer: &'static str,
    input: PassInput<'a>,
    fact_store: &'a mut FactStore,
    diagnostics: Vec<AnalysisDiagnostic>,
}

impl<'a> Pass<'a> {
    pub fn new(
        analyzer: &'static str,
        input: PassInput<'a>,
        fact_store: &'a mut FactStore,
    ) -> Self {
        Self {
            analyzer,
            input,
            fact_store,
            diagnostics: Vec::new(),
        }
    }

    /// The name from the package clause, not the import path.
    #[must_use]
    pub fn package_name(&self) -> &str {
        &self.input.package_name
    }

    #[must_use]
    pub fn package_path(&self) -> &str {
        &self.input.package_path
    }

    #[must_use]
    pub fn files(&self) -> &[PassFile<'a>] {
        &self.input.files
    }

    #[must_use]
    pub fn type_info(&self) -> &'a PackageTypeInfo {
        self.input.type_info
    }

    #[must_use]
    pub fn universe(&self) -> &'a TypeUniverse {
        self.input.universe
    }

    pub fn report(&mut self, position: Position, message: impl Into<String>) {
        self.diagnostics
            .push(AnalysisDiagnostic::new(self.analyzer, position, message));
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[AnalysisDiagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn into_diagnostics(self) -> Vec<AnalysisDiagnostic> {
        self.diagnostics
    }

    /// Facts this analyzer exported for the packages this one imports,
    /// directly or not, dependencies first.
    pub fn all_package_facts<F: PackageFact>(&self) -> Result<Vec<(String, F)>, AnalysisError> {
        let mut facts = Vec::new();
        for package_path in &self.input.imported_package_paths {
            if let Some(fact) = self.fact_store.import(self.analyzer, package_path)? {
                facts.push((package_path.clone(), fact));
            }
        }
        Ok(facts)
    }

    pub fn export_package_fact<F: PackageFact>(&mut self, fact: &F) -> Result<(), AnalysisError> {
        self.fact_store
            .export(self.analyzer, &self.input.package_path, fact)
    }
}
