//! dashbook - export analytics dashboards as notebook documents

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = dashbook::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
