use std::process::ExitCode;

fn main() -> ExitCode {
    promptpack::cli::main(std::env::args_os())
}
