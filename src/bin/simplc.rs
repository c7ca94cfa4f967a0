//! `simplc <source-file>` — compiles a SIMPL-2021 source file to Jasmin
//! assembly and assembles it, the one place in the program allowed to print
//! a diagnostic and exit non-zero.

use clap::Parser as _;
use simplc::error::DriverError;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(clap::Parser)]
#[command(name = "simplc", about = "A compiler for SIMPL-2021", disable_help_flag = true, disable_version_flag = true)]
struct Args {
    /// Source file to compile.
    filename: PathBuf,
}

fn main() -> ExitCode {
    env_logger::init();

    // clap's own usage banner is deliberately not used for the arity-
    // mismatch case: the fixed `usage: simplc <filename>` text is part of
    // the diagnostic contract.
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(_) => {
            eprintln!("{}", DriverError::Usage);
            return ExitCode::FAILURE;
        }
    };

    match simplc::compile_file(&args.filename, std::env::var("JASMIN_JAR").ok().as_deref()) {
        Ok(outcome) => {
            log::info!(
                "wrote {} (assembled: {})",
                outcome.class_file.display(),
                outcome.assembled
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", format_driver_error(&args.filename, &err));
            ExitCode::FAILURE
        }
    }
}

fn format_driver_error(source: &std::path::Path, err: &DriverError) -> String {
    match err {
        DriverError::Compile(compile_err) => {
            let pos = compile_err.pos();
            format!("{}:{}:{}: {compile_err}", source.display(), pos.line, pos.col)
        }
        other => other.to_string(),
    }
}
