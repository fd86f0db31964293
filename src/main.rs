//! Schoology Photos - CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use schoology_photos::{
    api::SchoologyApi,
    cli::Args,
    config::{validate_config, Config},
    error::{exit_codes, Error, Result},
    output::{
        print_banner, print_config_summary, print_error, print_info, print_run_stats,
        print_success, print_warning,
    },
    state::JsonFileStore,
    sync::{EngineOptions, SyncEngine},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::TomlParse(_)
                | Error::UrlParse(_)
                | Error::StateLocked(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::Authentication(_) | Error::Network(_) | Error::Api(_) => {
                    ExitCode::from(exit_codes::API_ERROR as u8)
                }
                Error::Download(_) | Error::Io(_) => {
                    ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8)
                }
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<()> {
    // Credentials usually live in a .env file next to the state
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration
    let config_path = args.config.clone();
    let mut config = if config_path.exists() {
        Config::load(&config_path)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            config_path.display()
        ));
        print_info("Using defaults with environment and CLI arguments");
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    validate_config(&config)?;

    print_config_summary(
        &config.options.photos_directory,
        &config.options.state_file,
        &config.options.api_base,
    );

    let api = SchoologyApi::new(
        config.api_credentials(),
        &config.options.api_base,
        config.request_timeout(),
    )?;

    // Held for the whole run; released on exit
    let store = JsonFileStore::open(&config.options.state_file)?;

    let engine = SyncEngine::new(
        &api,
        &store,
        EngineOptions {
            photos_root: config.options.photos_directory.clone(),
            show_progress: config.options.show_downloads,
        },
    );

    print_info("Connecting to Schoology...");
    let report = engine.run().await?;

    print_run_stats(&report);
    print_success(&format!("Sync complete for {}", report.user_name));

    Ok(())
}
