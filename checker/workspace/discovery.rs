use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use checker__source::{FileId, FileRole, SourceFile, compare_paths};
use tracing::debug;

use crate::types::{DiscoveredPackage, DiscoveryError, PackageId, Workspace, WorkspaceRoot};

const MODULE_FILE: &str = "go.mod";

/// Finds the workspace enclosing `start`: the nearest ancestor holding a
/// `go.mod`, or else the nearest ancestor named `src` (GOPATH layout).
pub fn find_workspace_root(start: &Path) -> Result<WorkspaceRoot, DiscoveryError> {
    for directory in start.ancestors() {
        let module_file = directory.join(MODULE_FILE);
        if !module_file.is_file() {
            continue;
        }
        let contents = fs::read_to_string(&module_file).map_err(|error| {
            DiscoveryError::new(
                format!("failed to read {MODULE_FILE}: {error}"),
                Some(module_file.clone()),
            )
        })?;
        let Some(module_path) = module_path_from_go_mod(&contents) else {
            return Err(DiscoveryError::new(
                "missing module directive",
                Some(module_file),
            ));
        };
        debug!(root = %directory.display(), module = %module_path, "found module root");
        return Ok(WorkspaceRoot {
            directory: directory.to_path_buf(),
            module_path: Some(module_path),
        });
    }

    for directory in start.ancestors() {
        if directory.file_name().is_some_and(|name| name == "src") {
            debug!(root = %directory.display(), "found GOPATH source root");
            return Ok(WorkspaceRoot {
                directory: directory.to_path_buf(),
                module_path: None,
            });
        }
    }

    Err(DiscoveryError::new(
        format!("no {MODULE_FILE} or GOPATH src directory encloses this directory"),
        Some(start.to_path_buf()),
    ))
}

/// Reads the `module` directive; the path may be quoted.
fn module_path_from_go_mod(contents: &str) -> Option<String> {
    contents.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or(line).trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let path = rest.trim().trim_matches('"');
        (!path.is_empty()).then(|| path.to_string())
    })
}

pub fn discover_workspace(root: &WorkspaceRoot) -> Result<Workspace, Vec<DiscoveryError>> {
    let mut source_paths = Vec::new();
    let mut errors = Vec::new();

    if let Err(error) = collect_source_paths(&root.directory, Path::new(""), &mut source_paths) {
        errors.push(DiscoveryError::new(
            format!("failed to walk workspace: {error}"),
            None,
        ));
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    source_paths.sort_by(|left, right| compare_paths(left, right));

    let mut source_paths_by_directory: BTreeMap<PathBuf, Vec<PathBuf>> = BTreeMap::new();
    for source_path in source_paths {
        let directory = source_path.parent().unwrap_or(Path::new("")).to_path_buf();
        source_paths_by_directory
            .entry(directory)
            .or_default()
            .push(source_path);
    }

    let mut file_id_counter = 0usize;
    let mut packages = Vec::new();
    for (package_index, (directory, paths)) in source_paths_by_directory.into_iter().enumerate()
    {
        let source_files = paths
            .into_iter()
            .filter_map(|path| {
                let role = FileRole::from_path(&path)?;
                let source_file = SourceFile {
                    id: FileId(file_id_counter),
                    workspace_relative_path: path,
                    role,
                };
                file_id_counter += 1;
                Some(source_file)
            })
            .collect();
        packages.push(DiscoveredPackage {
            id: PackageId(package_index),
            import_path: root.import_path_for(&directory),
            directory,
            source_files,
        });
    }

    Workspace::new(root.clone(), packages).map_err(|error| vec![error])
}

fn collect_source_paths(
    workspace_root: &Path,
    relative_directory: &Path,
    source_paths: &mut Vec<PathBuf>,
) -> io::Result<()> {
    let absolute_directory = workspace_root.join(relative_directory);
    let mut entries = Vec::new();
    for entry in fs::read_dir(absolute_directory)? {
        entries.push(entry?);
    }
    entries.sort_by(|left, right| compare_paths(&left.path(), &right.path()));

    for entry in entries {
        let mut file_type = entry.file_type()?;
        if file_type.is_symlink() {
            let metadata = match fs::metadata(entry.path()) {
                Ok(metadata) => metadata,
                Err(error) if error.kind() == ErrorKind::NotFound => {
                    // Ignore dangling symlinks while walking the workspace tree.
                    continue;
                }
                Err(error) => {
                    return Err(error);
                }
            };
            file_type = metadata.file_type();
        }

        let file_name = entry.file_name();
        let child_relative_path = relative_directory.join(&file_name);

        if file_type.is_dir() {
            if is_ignored_directory(&file_name.to_string_lossy())
                || entry.path().join(MODULE_FILE).is_file()
            {
                debug!(directory = %child_relative_path.display(), "skipping directory");
                continue;
            }
            collect_source_paths(workspace_root, &child_relative_path, source_paths)?;
            continue;
        }

        if file_type.is_file() && FileRole::from_path(&child_relative_path).is_some() {
            source_paths.push(child_relative_path);
        }
    }
    Ok(())
}

/// Directories the go tool never treats as part of the package tree.
fn is_ignored_directory(name: &str) -> bool {
    name == "vendor" || name == "testdata" || name.starts_with('.') || name.starts_with('_')
}
