//! dedoopsie - Safe Duplicate File Relocator
//!
//! Entry point for the dedoopsie CLI application.

use clap::Parser;
use dedoopsie::{
    cli::Cli,
    error::{error_code_for, exit_code_for, StructuredError},
};

fn main() {
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    match dedoopsie::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = exit_code_for(&err);
            let code = error_code_for(&err, exit_code);

            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                if let Ok(json) = serde_json::to_string_pretty(&structured) {
                    eprintln!("{}", json);
                } else {
                    eprintln!("[{}] Error: {:#}", code, err);
                }
            } else {
                eprintln!("[{}] Error: {:#}", code, err);
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
