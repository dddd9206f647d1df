use std::process::ExitCode;

fn main() -> ExitCode {
    stayquote_cli::run()
}
