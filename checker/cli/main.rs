use std::env;
use std::io;
use std::process::ExitCode;

use checker__cli::{CommandLine, EXIT_FAILURE, init_tracing, run, usage_exit_code};

fn main() -> ExitCode {
    let command_line = match CommandLine::try_parse_arguments(env::args()) {
        Ok(command_line) => command_line,
        Err(error) => {
            let _ = error.print();
            return ExitCode::from(usage_exit_code(&error));
        }
    };
    init_tracing(command_line.verbose);

    let working_directory = match env::current_dir() {
        Ok(directory) => directory,
        Err(error) => {
            eprintln!("error: failed to read the working directory: {error}");
            return ExitCode::from(EXIT_FAILURE);
        }
    };
    ExitCode::from(run(
        &command_line,
        &working_directory,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    ))
}
