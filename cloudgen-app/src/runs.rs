//! Turning a preset name and command-line overrides into a [`RunConfig`].

use crate::Result;
use cloudgen_launch::{LaunchError, PresetRegistry, RunConfig, RunMode, RunOverrides};
use std::path::Path;
use tracing::debug;

/// Built-in presets, plus those in `presets_file` when given.
pub fn load_registry(presets_file: Option<&Path>) -> Result<PresetRegistry> {
    let mut registry = PresetRegistry::builtin();
    if let Some(path) = presets_file {
        registry.load_file(path)?;
    }
    Ok(registry)
}

/// Start from `preset` (or the mode defaults when there is none) and layer
/// `overrides` on top.
pub fn resolve_run(
    registry: &PresetRegistry,
    mode: RunMode,
    preset: Option<&str>,
    overrides: &RunOverrides,
) -> Result<RunConfig> {
    let mut config = match preset {
        Some(name) => {
            let config = registry.get(name)?.clone();
            if config.mode != mode {
                return Err(LaunchError::InvalidConfig(format!(
                    "preset '{name}' is a {} preset, not {mode}",
                    config.mode
                ))
                .into());
            }
            config
        }
        None => {
            let cates = overrides.cates.clone().ok_or_else(|| {
                LaunchError::InvalidConfig("either a preset or --cates is required".into())
            })?;
            RunConfig::defaults(mode, cates)
        }
    };
    config.apply(overrides);
    debug!("Resolved {} run for {}", config.mode, config.cates);
    Ok(config)
}
