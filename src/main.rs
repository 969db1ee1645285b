use std::process::ExitCode;

use patient_registry_lib::config::ServerConfig;

#[tokio::main]
async fn main() -> ExitCode {
    patient_registry_lib::init_tracing();

    match patient_registry_lib::run(ServerConfig::from_env()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Unable to start server: {e}");
            ExitCode::FAILURE
        }
    }
}
