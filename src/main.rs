use std::process::ExitCode;

use colored::Colorize;

use shortly::config::{AppConfig, validate_config};
use shortly::errors::ShortlyError;
use shortly::runtime::run_server;
use shortly::system::init_logging;

#[actix_web::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    let config = AppConfig::load();
    if let Err(e) = validate_config(&config) {
        eprintln!("{} {}", "Invalid configuration:".red().bold(), e);
        return ExitCode::FAILURE;
    }

    // guard 必须存活到进程结束，否则日志不会刷新
    let _log_guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{} {:#}", "Failed to initialize logging:".red().bold(), e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run_server(&config).await {
        match e.downcast_ref::<ShortlyError>() {
            Some(err) => eprintln!("{}", err.format_colored()),
            None => eprintln!("{} {:#}", "[ERROR]".red().bold(), e),
        }
        tracing::error!("Server exited with error: {:#}", e);
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
