use accel_upgrade::{Invocation, RunOutcome};
use accel_upgrade_config::RuntimeConfig;
use accel_upgrade_core::Operation;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

/// Convert an accelerator configuration document to the newer schema, or
/// load its CIDRs into the assignment tables
#[derive(Parser)]
#[command(name = "accel-upgrade")]
#[command(version)]
#[command(about = "Upgrade accelerator configuration documents and CIDR assignment tables", long_about = None)]
struct Cli {
    /// Accelerator configuration document (JSON)
    #[arg(long, alias = "ConfigFile", value_name = "FILE")]
    config_file: PathBuf,

    /// Home region of the accelerator installation
    #[arg(long, alias = "Region", value_name = "REGION")]
    region: Option<String>,

    /// Resource prefix of the installation [default: ASEA-]
    #[arg(long, alias = "AcceleratorPrefix", value_name = "PREFIX")]
    accelerator_prefix: Option<String>,

    /// Key of the OU renamed to Security [default: core]
    #[arg(long, alias = "CoreOU", value_name = "OU")]
    core_ou: Option<String>,

    /// Load existing CIDRs into the DynamoDB assignment tables
    #[arg(long, alias = "LoadDB")]
    load_db: bool,

    /// Convert the configuration document to the newer schema
    #[arg(long, alias = "LoadConfig")]
    load_config: bool,

    /// Plan the table load without writing to DynamoDB
    #[arg(long)]
    dry_run: bool,

    /// Where the converted document is written [default: update-config.json]
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Skip the pretty-printed copy of the input document
    #[arg(long)]
    no_original_copy: bool,

    /// Tool settings file (TOML)
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short = 'v', long, value_name = "LEVEL")]
    log_level: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Conflicting operation flags fail before any file is touched
    Operation::from_flags(cli.load_db, cli.load_config)?;

    // Step 1: Load base settings
    let mut config = if let Some(path) = &cli.settings {
        RuntimeConfig::load_from_path(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?
    } else {
        RuntimeConfig::load().context("Failed to load settings")?
    };

    // Step 2: Apply CLI overrides (highest priority)
    apply_cli_overrides(&mut config, &cli);
    config.validate().context("Invalid settings")?;

    // Step 3: Initialize tracing
    accel_upgrade::init_tracing(&config.log);

    let invocation = Invocation {
        config_file: cli.config_file,
        load_to_table: cli.load_db,
        convert_schema: cli.load_config,
        dry_run: cli.dry_run,
    };

    // Step 4: Run; the runtime only drives the DynamoDB calls
    let outcome = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to build tokio runtime")?
        .block_on(accel_upgrade::run(&config, &invocation))?;

    match outcome {
        RunOutcome::Converted { report, output } => {
            info!(
                vpcs_converted = report.vpcs_converted,
                vpcs_already_current = report.vpcs_already_current,
                "Converted configuration written to {}",
                output.display()
            );
            Ok(())
        }
        RunOutcome::Loaded(summary) if summary.is_complete() => {
            info!(written = summary.written(), "All CIDR records loaded");
            Ok(())
        }
        RunOutcome::Loaded(summary) => {
            error!(
                written = summary.written(),
                failed = summary.failed(),
                "Some CIDR records were not loaded"
            );
            anyhow::bail!(
                "{} of {} CIDR records failed to load",
                summary.failed(),
                summary.written() + summary.failed()
            )
        }
    }
}

fn apply_cli_overrides(config: &mut RuntimeConfig, cli: &Cli) {
    if let Some(region) = &cli.region {
        config.accelerator.region = Some(region.clone());
    }
    if let Some(prefix) = &cli.accelerator_prefix {
        config.accelerator.prefix = prefix.clone();
    }
    if let Some(core_ou) = &cli.core_ou {
        config.accelerator.core_ou = core_ou.clone();
    }
    if let Some(output) = &cli.output {
        config.output.path = output.to_string_lossy().to_string();
    }
    if cli.no_original_copy {
        config.output.write_original_copy = false;
    }
    if let Some(level) = &cli.log_level {
        config.log.level = level.clone();
    }
}
