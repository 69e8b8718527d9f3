use std::path::{Component, Path, PathBuf};

use globset::{Glob, GlobSetBuilder};
use tracing::warn;

use crate::types::{DiscoveryError, PackageId, Workspace};

/// Selects the packages named by go-tool style patterns: `./...`, `./dir`,
/// `dir/...`, or import paths. Relative patterns are taken from
/// `working_directory`. A pattern that matches nothing is only a warning.
pub fn select_packages(
    workspace: &Workspace,
    working_directory: &Path,
    patterns: &[String],
) -> Result<Vec<PackageId>, DiscoveryError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let import_pattern = import_path_pattern(workspace, working_directory, pattern)?;
        let glob = Glob::new(&glob_for_import_pattern(&import_pattern)).map_err(|error| {
            DiscoveryError::new(format!("invalid package pattern '{pattern}': {error}"), None)
        })?;
        builder.add(glob);
    }
    let glob_set = builder.build().map_err(|error| {
        DiscoveryError::new(format!("invalid package patterns: {error}"), None)
    })?;

    let mut matched_patterns = vec![false; patterns.len()];
    let mut selected = Vec::new();
    for package in workspace.packages() {
        let matches = glob_set.matches(&package.import_path);
        if matches.is_empty() {
            continue;
        }
        for index in matches {
            matched_patterns[index] = true;
        }
        selected.push(package.id);
    }

    for (pattern, matched) in patterns.iter().zip(matched_patterns) {
        if !matched {
            warn!(pattern = %pattern, "pattern matched no packages");
        }
    }
    Ok(selected)
}

fn is_filesystem_pattern(pattern: &str) -> bool {
    pattern == "."
        || pattern == ".."
        || pattern.starts_with("./")
        || pattern.starts_with("../")
        || Path::new(pattern).is_absolute()
}

/// Rewrites a filesystem pattern into the import path pattern of the
/// directories it names.
fn import_path_pattern(
    workspace: &Workspace,
    working_directory: &Path,
    pattern: &str,
) -> Result<String, DiscoveryError> {
    if !is_filesystem_pattern(pattern) {
        return Ok(pattern.to_string());
    }
    let (directory, recursive) = match pattern.strip_suffix("...") {
        Some(prefix) => (prefix.trim_end_matches('/'), true),
        None => (pattern, false),
    };
    let directory = normalize(&working_directory.join(directory));
    let Ok(relative) = directory.strip_prefix(workspace.root_directory()) else {
        return Err(DiscoveryError::new(
            format!("directory '{pattern}' is outside the workspace"),
            Some(directory),
        ));
    };
    let import_path = workspace.root().import_path_for(relative);
    Ok(match (recursive, import_path.is_empty()) {
        (false, _) => import_path,
        (true, true) => "...".to_string(),
        (true, false) => format!("{import_path}/..."),
    })
}

/// `...` matches any string, and `p/...` also matches `p` itself.
fn glob_for_import_pattern(pattern: &str) -> String {
    match pattern.strip_suffix("/...") {
        Some(prefix) if !prefix.is_empty() => {
            let prefix = prefix.replace("...", "*");
            format!("{{{prefix},{prefix}/*}}")
        }
        _ => pattern.replace("...", "*"),
    }
}

/// Lexical normalization; symlinks are not resolved.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}
