//! Named run presets: built-in ones plus presets loaded from TOML.
//!
//! ```toml
//! [presets.train-car-wide]
//! mode = "train"
//! base = "train-car"
//! dims = "1024-1024-1024"
//! batch_size = 32
//! ```

use crate::{LaunchError, Result, RunConfig, RunMode, RunOverrides};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct PresetFile {
    #[serde(default)]
    presets: BTreeMap<String, PresetEntry>,
}

#[derive(Debug, Deserialize)]
struct PresetEntry {
    /// Mode for a preset without a base; inherited otherwise.
    mode: Option<RunMode>,
    /// Existing preset to start from.
    base: Option<String>,
    #[serde(flatten)]
    overrides: RunOverrides,
}

#[derive(Debug, Clone, Default)]
pub struct PresetRegistry {
    presets: BTreeMap<String, RunConfig>,
}

impl PresetRegistry {
    /// The presets this project ships with.
    pub fn builtin() -> Self {
        let mut registry = Self::default();

        for cates in ["airplane", "chair"] {
            registry.insert(format!("train-{cates}"), RunConfig::defaults(RunMode::Train, cates));
        }

        let mut car = RunConfig::defaults(RunMode::Train, "car_new");
        car.distributed = true;
        car.batch_size = Some(32);
        car.log_name = Some("gen/shapenet15k-catecar".to_string());
        registry.insert("train-car", car);

        let mut animal = RunConfig::defaults(RunMode::Train, "animal");
        animal.data_dir = Some("data/animals".into());
        animal.dataset_type = None;
        animal.batch_size = Some(8);
        animal.epochs = Some(2000);
        animal.train_t = Some(false);
        animal.log_name = Some("gen/animal".to_string());
        registry.insert("train-animal", animal);

        for (name, cates) in [("test-car", "car"), ("test-chair", "chair")] {
            let mut test = RunConfig::defaults(RunMode::Test, cates);
            test.resume_checkpoint = Some(format!("pretrained_models/gen/{cates}/checkpoint.pt").into());
            registry.insert(name, test);
        }

        registry
    }

    pub fn insert(&mut self, name: impl Into<String>, config: RunConfig) {
        self.presets.insert(name.into(), config);
    }

    pub fn get(&self, name: &str) -> Result<&RunConfig> {
        self.presets
            .get(name)
            .ok_or_else(|| LaunchError::UnknownPreset(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RunConfig)> {
        self.presets.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }

    /// Add presets from a TOML file on top of this registry.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let file: PresetFile = toml::from_str(&text).map_err(|source| LaunchError::PresetFile {
            path: path.to_path_buf(),
            source,
        })?;
        let count = file.presets.len();
        self.merge(file)?;
        info!("Loaded {} presets from {}", count, path.display());
        Ok(())
    }

    /// Resolve every entry of `file` before touching the registry, so a
    /// failing file adds nothing.
    fn merge(&mut self, file: PresetFile) -> Result<()> {
        let mut resolved = BTreeMap::new();
        for name in file.presets.keys() {
            self.resolve_named(name, &file.presets, &mut resolved, &mut Vec::new())?;
        }
        for (name, config) in resolved {
            debug!("Preset {} ({})", name, config.mode);
            self.insert(name, config);
        }
        Ok(())
    }

    /// A base names another entry of the same file when there is one. An
    /// entry based on its own name extends the registry's preset of that
    /// name.
    fn resolve_named(
        &self,
        name: &str,
        entries: &BTreeMap<String, PresetEntry>,
        resolved: &mut BTreeMap<String, RunConfig>,
        chain: &mut Vec<String>,
    ) -> Result<RunConfig> {
        if let Some(config) = resolved.get(name) {
            return Ok(config.clone());
        }
        if chain.iter().any(|n| n == name) {
            return Err(LaunchError::InvalidConfig(format!(
                "preset '{}' has a circular base: {} -> {}",
                name,
                chain.join(" -> "),
                name
            )));
        }
        let entry = entries
            .get(name)
            .ok_or_else(|| LaunchError::UnknownPreset(name.to_string()))?;

        chain.push(name.to_string());
        let base = match entry.base.as_deref() {
            Some(base) if base != name && entries.contains_key(base) => {
                Some(self.resolve_named(base, entries, resolved, chain)?)
            }
            Some(base) => Some(self.presets.get(base).cloned().ok_or_else(|| {
                LaunchError::InvalidConfig(format!("preset '{name}' has unknown base '{base}'"))
            })?),
            None => None,
        };
        chain.pop();

        let config = Self::build(entry, base)?;
        resolved.insert(name.to_string(), config.clone());
        Ok(config)
    }

    fn build(entry: &PresetEntry, base: Option<RunConfig>) -> Result<RunConfig> {
        let mut config = match (base, entry.mode) {
            (Some(base), _) => base,
            (None, Some(mode)) => {
                let cates = entry.overrides.cates.clone().ok_or_else(|| {
                    LaunchError::InvalidConfig("preset without base needs cates".into())
                })?;
                RunConfig::defaults(mode, cates)
            }
            (None, None) => {
                return Err(LaunchError::InvalidConfig(
                    "preset needs either mode or base".into(),
                ));
            }
        };
        if let Some(mode) = entry.mode {
            config.mode = mode;
        }
        config.apply(&entry.overrides);
        Ok(config)
    }
}
