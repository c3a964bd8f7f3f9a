use std::process::ExitCode;

fn main() -> ExitCode {
    match md_outline_cli::run() {
        Ok(code) => code.into(),
        Err(err) => {
            eprintln!("md-to-outline error: {err:#}");
            journal_tools_core::ExitCode::for_error(err.as_ref()).into()
        }
    }
}
