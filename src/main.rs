//! Pixelize - Command-line tool for converting images into pixel art

use std::process::ExitCode;

use pixelize::cli;

fn main() -> ExitCode {
    cli::run()
}
