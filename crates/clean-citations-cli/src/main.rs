use std::process::ExitCode;

fn main() -> ExitCode {
    match clean_citations_cli::run() {
        Ok(code) => code.into(),
        Err(err) => {
            eprintln!("clean-citations error: {err:#}");
            journal_tools_core::ExitCode::for_error(err.as_ref()).into()
        }
    }
}
