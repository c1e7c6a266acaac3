// accel-upgrade - Accelerator configuration upgrade tool
//
// Reads a configuration document and performs exactly one operation:
// - Convert: rewrite the document to the newer schema and write it out
// - Load: replicate its VPC and subnet CIDRs into the assignment tables
//
// The pure work lives in accel-upgrade-core; this crate owns file I/O,
// the AWS client and the process-level settings.

mod init;

pub use init::init_tracing;

use accel_upgrade_config::RuntimeConfig;
use accel_upgrade_core::{
    migrate_config, ConfigDocument, ConversionReport, MigrateOptions, MigrationOutcome, Operation,
};
use accel_upgrade_writer::{load_plan, DynamoDbStore, LoadSummary, MemoryStore, TableNames};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// What the caller asked for on this run
#[derive(Debug, Clone)]
pub struct Invocation {
    pub config_file: PathBuf,
    pub load_to_table: bool,
    pub convert_schema: bool,
    /// Plan the table load and log it without contacting DynamoDB
    pub dry_run: bool,
}

#[derive(Debug)]
pub enum RunOutcome {
    Converted {
        report: ConversionReport,
        output: PathBuf,
    },
    Loaded(LoadSummary),
}

/// Run one invocation with fully resolved settings.
///
/// Flags are checked before any file is read. The converted document is
/// only written once the whole conversion succeeded.
pub async fn run(config: &RuntimeConfig, invocation: &Invocation) -> Result<RunOutcome> {
    let operation = Operation::from_flags(invocation.load_to_table, invocation.convert_schema)?;
    let region = config
        .accelerator
        .region
        .clone()
        .context("A region is required: pass --region or set accelerator.region")?;

    let mut document = read_document(&invocation.config_file)?;
    if config.output.write_original_copy {
        write_file(
            Path::new(&config.output.original_copy_path),
            &document.to_pretty_json(),
        )?;
    }

    let options = MigrateOptions {
        load_to_table: operation == Operation::LoadToTable,
        convert_schema: operation == Operation::ConvertSchema,
        prefix: config.accelerator.prefix.clone(),
        region: region.clone(),
        core_ou_name: config.accelerator.core_ou.clone(),
    };

    match migrate_config(&mut document, &options)? {
        MigrationOutcome::Converted(report) => {
            let output = PathBuf::from(&config.output.path);
            write_file(&output, &document.to_pretty_json())?;
            info!(path = %output.display(), "Wrote converted configuration");
            Ok(RunOutcome::Converted { report, output })
        }
        MigrationOutcome::LoadPlanned(plan) => {
            let tables = TableNames::for_prefix(&options.prefix)?;
            let summary = if invocation.dry_run {
                info!(records = plan.len(), "Dry run; nothing is written to DynamoDB");
                let store = MemoryStore::new();
                load_plan(&store, &tables, &plan).await
            } else {
                let store = DynamoDbStore::connect(&region).await?;
                load_plan(&store, &tables, &plan).await
            };
            Ok(RunOutcome::Loaded(summary))
        }
    }
}

fn read_document(path: &Path) -> Result<ConfigDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    ConfigDocument::from_json_str(&text)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents)
        .with_context(|| format!("Failed to write {}", path.display()))
}
