use std::process::ExitCode;

fn main() -> ExitCode {
    match econ_dash::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprint!("{}", econ_dash::report::format_notices(err.notices()));
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
