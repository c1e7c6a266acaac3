use crate::{LogFormat, RuntimeConfig};
use anyhow::{anyhow, Context, Result};

pub const ENV_PREFIX: &str = "ACCEL_UPGRADE_";

/// Abstraction over environment-variable lookups so tests can supply
/// their own source of overrides.
pub trait EnvSource {
    fn get(&self, key: &str) -> Option<String>;

    /// Get an environment variable WITHOUT the ACCEL_UPGRADE_ prefix
    /// Used for AWS standard variables (AWS_REGION, etc.)
    fn get_raw(&self, key: &str) -> Option<String>;
}

/// Apply environment-variable overrides to the runtime config.
pub fn apply_env_overrides<E: EnvSource>(config: &mut RuntimeConfig, env: &E) -> Result<()> {
    // Accelerator installation
    if let Some(prefix) = get_env_string(env, "PREFIX") {
        config.accelerator.prefix = prefix;
    }
    if let Some(core_ou) = get_env_string(env, "CORE_OU") {
        config.accelerator.core_ou = core_ou;
    }
    if let Some(region) = get_env_string(env, "REGION") {
        config.accelerator.region = Some(region);
    } else if config.accelerator.region.is_none() {
        // Fall back to the SDK's own region variables
        config.accelerator.region = env
            .get_raw("AWS_REGION")
            .or_else(|| env.get_raw("AWS_DEFAULT_REGION"));
    }

    // Output files
    if let Some(path) = get_env_string(env, "OUTPUT") {
        config.output.path = path;
    }
    if let Some(path) = get_env_string(env, "ORIGINAL_COPY") {
        config.output.original_copy_path = path;
    }
    if let Some(enabled) = get_env_bool(env, "WRITE_ORIGINAL_COPY")? {
        config.output.write_original_copy = enabled;
    }

    // Logging
    if let Some(level) = get_env_string(env, "LOG_LEVEL") {
        config.log.level = level;
    }
    if let Some(format) = get_env_string(env, "LOG_FORMAT") {
        config.log.format = format
            .parse::<LogFormat>()
            .context("Invalid ACCEL_UPGRADE_LOG_FORMAT value")?;
    }

    Ok(())
}

/// Empty values count as unset
fn get_env_string<E: EnvSource>(env: &E, key: &str) -> Option<String> {
    env.get(key).filter(|value| !value.trim().is_empty())
}

fn get_env_bool<E: EnvSource>(env: &E, key: &str) -> Result<Option<bool>> {
    match get_env_string(env, key) {
        Some(val) => {
            let parsed = val.parse::<bool>().map_err(|e| {
                anyhow!(
                    "Failed to parse {}{} (expected bool): {}",
                    ENV_PREFIX,
                    key,
                    e
                )
            })?;
            Ok(Some(parsed))
        }
        None => Ok(None),
    }
}
