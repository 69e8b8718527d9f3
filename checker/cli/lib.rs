use std::io::Write;
use std::path::Path;

use checker__driver::{LoadOptions, check_patterns};
use checker__reports::ReportFormat;
use checker__verify_interfaces::{VerifyInterfaces, VerifyInterfacesConfig};
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

// keep-sorted start
pub const EXIT_CLEAN: u8 = 0;
pub const EXIT_DIAGNOSTICS: u8 = 3;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_USAGE: u8 = 2;
// keep-sorted end

/// Long flags the go tool spells with a single dash.
const LONG_FLAGS: [&str; 4] = ["verbose", "strict", "format", "test"];

#[derive(Debug, Parser)]
#[command(
    name = "verifyiface",
    version,
    about = "check that a interface implementation is verified"
)]
pub struct CommandLine {
    /// Trace each analysis stage on stderr.
    #[arg(long)]
    pub verbose: bool,

    /// Report every unverified implementation, even of interfaces no type
    /// assertion uses.
    #[arg(long)]
    pub strict: bool,

    #[arg(long, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    /// Also check `_test.go` files; `-test=false` turns this off.
    #[arg(
        long,
        default_value_t = true,
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        action = clap::ArgAction::Set
    )]
    pub test: bool,

    /// Packages to check: `./...`, `./dir`, `dir/...` or import paths.
    #[arg(default_value = ".")]
    pub patterns: Vec<String>,
}

impl CommandLine {
    /// Parses process arguments, accepting `-strict` as well as `--strict`.
    pub fn try_parse_arguments<I, T>(arguments: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self::try_parse_from(normalize_arguments(arguments))
    }

    #[must_use]
    pub fn config(&self) -> VerifyInterfacesConfig {
        VerifyInterfacesConfig {
            strict_check: self.strict,
        }
    }

    /// Files are selected for the host `GOOS`/`GOARCH`.
    #[must_use]
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            include_tests: self.test,
            ..LoadOptions::default()
        }
    }
}

/// Rewrites `-flag` and `-flag=value` to their double-dash form for the
/// known long flags. Everything after `--` is left alone.
pub fn normalize_arguments<I, T>(arguments: I) -> Vec<String>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut normalized = Vec::new();
    let mut literal = false;
    for argument in arguments {
        let argument: String = argument.into();
        if literal {
            normalized.push(argument);
            continue;
        }
        if argument == "--" {
            literal = true;
            normalized.push(argument);
            continue;
        }
        let rewritten = argument
            .strip_prefix('-')
            .filter(|rest| !rest.starts_with('-'))
            .filter(|rest| {
                let name = rest.split_once('=').map_or(*rest, |(name, _)| name);
                LONG_FLAGS.contains(&name)
            })
            .map(|rest| format!("--{rest}"));
        normalized.push(rewritten.unwrap_or(argument));
    }
    normalized
}

/// `debug` when verbose; otherwise `RUST_LOG`, falling back to `warn`.
pub fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    // A subscriber may already be installed when running in-process.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Exit status for an argument parsing error: help and version output are
/// not failures.
#[must_use]
pub fn usage_exit_code(error: &clap::Error) -> u8 {
    if error.use_stderr() {
        EXIT_USAGE
    } else {
        EXIT_CLEAN
    }
}

/// Checks the packages named on the command line and writes the report.
/// Returns the process exit status.
pub fn run(
    command_line: &CommandLine,
    working_directory: &Path,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> u8 {
    let analyzer = VerifyInterfaces::new(command_line.config());
    debug!(
        patterns = ?command_line.patterns,
        strict = command_line.strict,
        tests = command_line.test,
        "checking packages"
    );

    let checked = match check_patterns(
        &analyzer,
        &command_line.load_options(),
        working_directory,
        &command_line.patterns,
    ) {
        Ok(checked) => checked,
        Err(failure) => {
            let rendered = command_line.format.render_failure(&failure);
            let _ = stderr.write_all(rendered.as_bytes());
            return EXIT_FAILURE;
        }
    };

    let written = match command_line.format.render_diagnostics(&checked.diagnostics) {
        Ok(rendered) => stdout.write_all(rendered.as_bytes()),
        Err(error) => {
            let _ = writeln!(stderr, "error: failed to render diagnostics: {error}");
            return EXIT_FAILURE;
        }
    };
    if let Err(error) = written {
        let _ = writeln!(stderr, "error: failed to write diagnostics: {error}");
        return EXIT_FAILURE;
    }

    if checked.diagnostics.is_empty() {
        EXIT_CLEAN
    } else {
        EXIT_DIAGNOSTICS
    }
}
