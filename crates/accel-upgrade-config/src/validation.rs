// Configuration validation
//
// Validates that values are present and sensible. The region is optional
// here because the binary may still supply it from a flag.

use crate::*;
use anyhow::{bail, Result};
use tracing::warn;

pub fn validate_config(config: &RuntimeConfig) -> Result<()> {
    validate_accelerator_config(&config.accelerator)?;
    validate_output_config(&config.output)?;
    validate_log_config(&config.log)?;
    Ok(())
}

fn validate_accelerator_config(config: &AcceleratorConfig) -> Result<()> {
    if config.prefix.chars().any(char::is_whitespace) {
        bail!("accelerator.prefix must not contain whitespace");
    }
    if config.prefix.is_empty() {
        warn!("accelerator.prefix is empty; table names will be unprefixed");
    }

    if config.core_ou.trim().is_empty() {
        bail!("accelerator.core_ou must not be empty");
    }

    if let Some(ref region) = config.region {
        if region.trim().is_empty() {
            bail!("accelerator.region must not be empty when set");
        }
        if !region.contains('-') {
            bail!(
                "accelerator.region '{}' does not look like an AWS region (e.g. ca-central-1)",
                region
            );
        }
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<()> {
    if config.path.is_empty() {
        bail!("output.path must not be empty");
    }

    if config.write_original_copy {
        if config.original_copy_path.is_empty() {
            bail!("output.original_copy_path must not be empty when write_original_copy is set");
        }
        if config.original_copy_path == config.path {
            bail!("output.original_copy_path must differ from output.path");
        }
    }

    Ok(())
}

fn validate_log_config(config: &LogConfig) -> Result<()> {
    if config.level.trim().is_empty() {
        bail!("log.level must not be empty");
    }
    Ok(())
}
