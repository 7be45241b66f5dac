use std::process::ExitCode;

fn main() -> ExitCode {
    pazaryeri_cli::run()
}
