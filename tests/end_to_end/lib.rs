use std::fs;
use std::path::{Path, PathBuf};

use checker__cli::{CommandLine, run};
use tempfile::TempDir;

/// A Go workspace written to a temporary directory.
pub struct FixtureWorkspace {
    root: TempDir,
}

impl FixtureWorkspace {
    #[must_use]
    pub fn new(files: &[(&str, &str)]) -> Self {
        let root = tempfile::tempdir().expect("fixture root should be created");
        for (relative_file, contents) in files {
            let path = root.path().join(relative_file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("fixture directory should be created");
            }
            fs::write(&path, contents).unwrap_or_else(|error| {
                panic!("failed to write fixture file {}: {error}", path.display())
            });
        }
        Self { root }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        self.root.path()
    }

    #[must_use]
    pub fn join(&self, relative_directory: &str) -> PathBuf {
        self.root.path().join(relative_directory)
    }
}

pub struct FixtureRun {
    pub exit_code: u8,
    pub stdout: String,
    pub stderr: String,
}

impl FixtureRun {
    /// Non-empty stdout lines.
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        self.stdout.lines().filter(|line| !line.is_empty()).collect()
    }
}

/// Runs the checker in-process as if started in `working_directory` with
/// `arguments` after the program name.
#[must_use]
pub fn run_fixture(working_directory: &Path, arguments: &[&str]) -> FixtureRun {
    let command_line = CommandLine::try_parse_arguments(
        std::iter::once("verifyiface").chain(arguments.iter().copied()),
    )
    .unwrap_or_else(|error| panic!("invalid fixture arguments {arguments:?}: {error}"));
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let exit_code = run(&command_line, working_directory, &mut stdout, &mut stderr);
    FixtureRun {
        exit_code,
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
    }
}
