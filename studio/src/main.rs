//! Sheetify Studio client - Entry Point
//!
//! Publishes Streamlit tools to a Sheetify backend, builds and runs them,
//! and follows their status from the command line.

use std::collections::HashMap;
use std::env;
use std::process::ExitCode;

use sheetify::app::command::{Command, PASSWORD_ENV, USAGE};
use sheetify::app::options::AppOptions;
use sheetify::app::run::run;
use sheetify::app::state::AppState;
use sheetify::logs::{init_logging, LogOptions};
use sheetify::storage::layout::StorageLayout;
use sheetify::storage::settings::Settings;
use sheetify::utils::version_info;

use tracing::{debug, error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    let mut cli_args: HashMap<String, String> = HashMap::new();
    let mut command_name: Option<String> = None;

    for arg in args.iter().skip(1) {
        if let Some(flag) = arg.strip_prefix("--") {
            if let Some((key, value)) = flag.split_once('=') {
                // Handle --key=value format
                cli_args.insert(key.to_string(), value.to_string());
            } else {
                // Handle standalone flags like --version
                cli_args.insert(flag.to_string(), "true".to_string());
            }
        } else if command_name.is_none() {
            command_name = Some(arg.clone());
        }
    }

    // Print version and exit
    if cli_args.contains_key("version") {
        match serde_json::to_string_pretty(&version_info()) {
            Ok(version) => println!("{}", version),
            Err(e) => {
                eprintln!("Unable to print version info: {e}");
                return ExitCode::FAILURE;
            }
        }
        return ExitCode::SUCCESS;
    }

    if cli_args.contains_key("help") {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }

    // Retrieve the settings file
    let layout = StorageLayout::default();
    let settings = match Settings::load(&layout.settings_file()).await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Unable to read settings file: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize logging
    let log_options = LogOptions {
        log_level: settings.log_level.clone(),
        json_format: settings.json_logs,
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let command = match Command::parse(
        command_name.as_deref(),
        &cli_args,
        env::var(PASSWORD_ENV).ok(),
    ) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}", e.user_message("Invalid arguments"));
            return ExitCode::FAILURE;
        }
    };

    let options = AppOptions::from_settings(layout, &settings);
    info!("Running Sheetify client with options: {:?}", options);

    let state = match AppState::init(options).await {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize: {e}");
            eprintln!("Failed to initialize: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run(&state, command, await_shutdown_signal()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Exiting after failure: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn await_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = match signal(SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(e) => {
                error!("Unable to listen for SIGTERM: {e}");
                let _ = tokio::signal::ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = sigterm.recv() => {
                info!("SIGTERM received, shutting down...");
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Unable to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Ctrl+C received, shutting down...");
    }
}
