use std::process::ExitCode;

fn main() -> ExitCode {
    jarvis_cli::run()
}
