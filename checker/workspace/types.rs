use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use checker__source::SourceFile;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId(pub usize);

/// A directory of Go files, `_test.go` files included. Build constraints
/// are applied later, once contents are read.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiscoveredPackage {
    pub id: PackageId,
    pub import_path: String,
    /// Relative to the workspace root; empty for the root itself.
    pub directory: PathBuf,
    pub source_files: Vec<SourceFile>,
}

/// Where import paths are anchored: a module root or a GOPATH `src`
/// directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceRoot {
    pub directory: PathBuf,
    /// The `module` path from `go.mod`; `None` under GOPATH, where import
    /// paths are directories relative to `src`.
    pub module_path: Option<String>,
}

impl WorkspaceRoot {
    #[must_use]
    pub fn import_path_for(&self, relative_directory: &Path) -> String {
        let key = checker__source::path_to_key(relative_directory);
        let key = if key == "." { String::new() } else { key };
        match (&self.module_path, key.is_empty()) {
            (Some(module_path), true) => module_path.clone(),
            (Some(module_path), false) => format!("{module_path}/{key}"),
            (None, _) => key,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Workspace {
    root: WorkspaceRoot,
    packages: Vec<DiscoveredPackage>,
    package_id_by_import_path: BTreeMap<String, PackageId>,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DiscoveryError {
    pub message: String,
    pub path: Option<PathBuf>,
}

impl DiscoveryError {
    #[must_use]
    pub fn new(message: impl Into<String>, path: Option<PathBuf>) -> Self {
        Self {
            message: message.into(),
            path,
        }
    }
}

impl Workspace {
    pub(crate) fn new(
        root: WorkspaceRoot,
        packages: Vec<DiscoveredPackage>,
    ) -> Result<Self, DiscoveryError> {
        let mut package_id_by_import_path = BTreeMap::new();
        for package in &packages {
            if package_id_by_import_path
                .insert(package.import_path.clone(), package.id)
                .is_some()
            {
                return Err(DiscoveryError::new(
                    format!("duplicate import path '{}'", package.import_path),
                    Some(package.directory.clone()),
                ));
            }
        }
        Ok(Self {
            root,
            packages,
            package_id_by_import_path,
        })
    }

    #[must_use]
    pub fn root(&self) -> &WorkspaceRoot {
        &self.root
    }

    #[must_use]
    pub fn root_directory(&self) -> &Path {
        &self.root.directory
    }

    #[must_use]
    pub fn packages(&self) -> &[DiscoveredPackage] {
        &self.packages
    }

    #[must_use]
    pub fn package(&self, id: PackageId) -> Option<&DiscoveredPackage> {
        self.packages.get(id.0)
    }

    #[must_use]
    pub fn package_by_import_path(&self, import_path: &str) -> Option<&DiscoveredPackage> {
        let package_id = self.package_id_by_import_path.get(import_path)?;
        self.packages.get(package_id.0)
    }

    /// Absolute path of a workspace-relative file.
    #[must_use]
    pub fn absolute_path(&self, relative_path: &Path) -> PathBuf {
        self.root.directory.join(relative_path)
    }
}
