use findhelp::app;
use findhelp::app::error::SearchError;
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{:#}", err);
            // Bad arguments exit with 2, failures during the search with 1.
            let setup = err
                .downcast_ref::<SearchError>()
                .is_some_and(SearchError::is_setup_error);
            ExitCode::from(if setup { 2 } else { 1 })
        }
    }
}
