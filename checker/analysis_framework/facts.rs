use std::collections::BTreeMap;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::AnalysisError;

/// Data an analyzer attaches to a package for the packages that import it.
pub trait PackageFact: Serialize + DeserializeOwned {}

/// Encoded package facts, keyed by analyzer name and package import path.
/// Facts cross package boundaries only in encoded form.
#[derive(Clone, Debug, Default)]
pub struct FactStore {
    encoded_by_key: BTreeMap<(String, String), String>,
}

impl FactStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn export<F: PackageFact>(
        &mut self,
        analyzer: &'static str,
        package_path: &str,
        fact: &F,
    ) -> Result<(), AnalysisError> {
        let encoded =
            serde_json::to_string(fact).map_err(|source| AnalysisError::FactEncoding {
                analyzer,
                package_path: package_path.to_string(),
                source,
            })?;
        self.insert_encoded(analyzer, package_path, encoded);
        Ok(())
    }

    /// Stores an already encoded fact, replacing any earlier one.
    pub fn insert_encoded(&mut self, analyzer: &str, package_path: &str, encoded: String) {
        self.encoded_by_key
            .insert((analyzer.to_string(), package_path.to_string()), encoded);
    }

    #[must_use]
    pub fn encoded(&self, analyzer: &str, package_path: &str) -> Option<&str> {
        self.encoded_by_key
            .get(&(analyzer.to_string(), package_path.to_string()))
            .map(String::as_str)
    }

    pub fn import<F: PackageFact>(
        &self,
        analyzer: &'static str,
        package_path: &str,
    ) -> Result<Option<F>, AnalysisError> {
        let Some(encoded) = self.encoded(analyzer, package_path) else {
            return Ok(None);
        };
        serde_json::from_str(encoded)
            .map(Some)
            .map_err(|source| AnalysisError::MalformedFact {
                analyzer,
                package_path: package_path.to_string(),
                source,
            })
    }

    /// Package paths holding a fact from `analyzer`, sorted.
    pub fn packages_with_facts<'a>(
        &'a self,
        analyzer: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.encoded_by_key
            .keys()
            .filter(move |(fact_analyzer, _)| fact_analyzer == analyzer)
            .map(|(_, package_path)| package_path.as_str())
    }
}
