use std::process::ExitCode;

use seedline::ui::output;

fn main() -> ExitCode {
    match seedline::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(format!("{err:#}"));
            ExitCode::FAILURE
        }
    }
}
