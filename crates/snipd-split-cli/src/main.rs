use std::process::ExitCode;

fn main() -> ExitCode {
    match snipd_split_cli::run() {
        Ok(code) => code.into(),
        Err(err) => {
            eprintln!("snipd-split error: {err:#}");
            journal_tools_core::ExitCode::for_error(err.as_ref()).into()
        }
    }
}
