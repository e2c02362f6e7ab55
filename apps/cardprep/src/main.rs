use std::process::ExitCode;

fn main() -> ExitCode {
    match cardprep::run() {
        Ok(code) => code,
        Err(error) => {
            eprintln!("cardprep error: {error:#}");
            ExitCode::FAILURE
        }
    }
}
