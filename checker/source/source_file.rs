use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct FileId(pub usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileRole {
    Source,
    Test,
}

impl FileRole {
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let file_name = path.file_name()?.to_str()?;
        if file_name.starts_with('.') || file_name.starts_with('_') {
            return None;
        }
        if file_name.ends_with("_test.go") {
            return Some(Self::Test);
        }
        if file_name.ends_with(".go") {
            return Some(Self::Source);
        }
        None
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    pub id: FileId,
    pub workspace_relative_path: PathBuf,
    pub role: FileRole,
}
