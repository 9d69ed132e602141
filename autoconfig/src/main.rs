//! Nagios Autoconfig CLI

use clap::{Arg, Command};
use nagios_autoconfig::{
    driver,
    ec2::Ec2,
    emit::{sink::Filesystem, templates::TemplateDir, Emitter},
    Error, DEFAULT_CONFIG_PATH, DEFAULT_REGION, FETCH_TIMEOUT, TEMPLATES_DIR,
};
use std::{path::PathBuf, process::ExitCode};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Returns the version of the crate.
pub const fn crate_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Flag for the region to discover
const REGION_FLAG: &str = "region";

/// Flag for the Nagios configuration root
const CONFIG_PATH_FLAG: &str = "nagios-config-path";

/// Entrypoint for the Nagios Autoconfig CLI
#[tokio::main]
async fn main() -> ExitCode {
    // Define application
    let matches = Command::new("nagios-autoconfig")
        .version(crate_version())
        .about("Generate Nagios host and service configuration from the tags of running EC2 instances.")
        .arg(
            Arg::new(REGION_FLAG)
                .long(REGION_FLAG)
                .default_value(DEFAULT_REGION)
                .help("Region whose running instances are discovered")
                .value_parser(clap::value_parser!(String)),
        )
        .arg(
            Arg::new(CONFIG_PATH_FLAG)
                .long(CONFIG_PATH_FLAG)
                .default_value(DEFAULT_CONFIG_PATH)
                .help("Nagios configuration root (hosts/ and services/ are rewritten)")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .get_matches();

    // Create logger (RUST_LOG overrides the default level)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Parse arguments
    let region = matches.get_one::<String>(REGION_FLAG).unwrap();
    let config_path = matches.get_one::<PathBuf>(CONFIG_PATH_FLAG).unwrap();
    info!(region, path = ?config_path, "generating configuration");

    // Load templates before contacting AWS
    let templates = match TemplateDir::load(TEMPLATES_DIR) {
        Ok(templates) => templates,
        Err(e) => {
            error!(error = ?e, dir = TEMPLATES_DIR, "failed to load templates");
            return ExitCode::from(e.exit_code());
        }
    };
    let emitter = Emitter::new(templates, Filesystem, config_path);

    // Regenerate configuration
    let source = Ec2::new().await;
    match driver::run(&source, region, &emitter, FETCH_TIMEOUT).await {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            if let Error::AuthFailure { .. } = e {
                error!(error = ?e, region, "authorization failed when connecting to AWS");
            } else {
                error!(error = ?e, region, "failed to generate configuration");
            }
            ExitCode::from(e.exit_code())
        }
    }
}
