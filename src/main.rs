use std::process::ExitCode;

fn main() -> ExitCode {
    asyncqueue::app::startup::run()
}
