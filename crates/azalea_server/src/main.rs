use azalea_core::{init_logging, LogSettings};
use azalea_server::{run, ServerConfig};
use log::error;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("azalea-server: {err}");
            return ExitCode::FAILURE;
        }
    };

    let settings = LogSettings::new(config.log_level.clone(), config.log_dir.clone())
        .echo_to_stderr(true);
    if let Err(err) = init_logging(&settings) {
        eprintln!("azalea-server: failed to initialize logging: {err}");
        return ExitCode::FAILURE;
    }

    match run(&config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=server_exit module=server status=error error={err}");
            eprintln!("azalea-server: {err}");
            ExitCode::FAILURE
        }
    }
}
