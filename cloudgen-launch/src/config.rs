//! Run configuration for the external `train.py` / `test.py` programs.

use crate::{Dims, LaunchError, Result};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    Train,
    Test,
}

impl RunMode {
    pub fn default_script(self) -> &'static str {
        match self {
            RunMode::Train => "train.py",
            RunMode::Test => "test.py",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RunMode::Train => "train",
            RunMode::Test => "test",
        })
    }
}

impl FromStr for RunMode {
    type Err = LaunchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "train" => Ok(RunMode::Train),
            "test" => Ok(RunMode::Test),
            other => Err(LaunchError::InvalidConfig(format!("unknown mode '{other}'"))),
        }
    }
}

/// One invocation of the external program. Unset options are not passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub mode: RunMode,
    /// Dataset category filter, e.g. `car_new`, `animal`, `chair`.
    pub cates: String,
    pub dims: Option<Dims>,
    pub latent_dims: Option<Dims>,
    pub num_blocks: Option<u32>,
    pub latent_num_blocks: Option<u32>,
    pub zdim: Option<u32>,
    pub batch_size: Option<u32>,
    pub lr: Option<f64>,
    pub epochs: Option<u32>,
    pub save_freq: Option<u32>,
    pub viz_freq: Option<u32>,
    pub log_freq: Option<u32>,
    pub val_freq: Option<u32>,
    pub distributed: bool,
    pub use_latent_flow: bool,
    pub train_t: Option<bool>,
    pub resume_checkpoint: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub log_name: Option<String>,
    pub dataset_type: Option<String>,
    /// Program used to run the script.
    pub interpreter: String,
    /// Script path; the mode's default script when unset.
    pub script: Option<PathBuf>,
}

pub const DEFAULT_DATASET_TYPE: &str = "shapenet15k";
pub const DEFAULT_DATA_DIR: &str = "data/ShapeNetCore.v2.PC15k";

impl RunConfig {
    /// Baseline for a mode: the full training schedule for `train`, only the
    /// architecture for `test`.
    pub fn defaults(mode: RunMode, cates: impl Into<String>) -> Self {
        let cates = cates.into();
        let train = mode == RunMode::Train;
        let dims = |s: &str| s.parse::<Dims>().ok();
        Self {
            mode,
            log_name: train.then(|| format!("gen/{DEFAULT_DATASET_TYPE}-cate{cates}")),
            cates,
            dims: dims("512-512-512"),
            latent_dims: dims("256-256"),
            num_blocks: Some(1),
            latent_num_blocks: Some(1),
            zdim: Some(128),
            batch_size: train.then_some(16),
            lr: train.then_some(2e-3),
            epochs: train.then_some(4000),
            save_freq: train.then_some(50),
            viz_freq: train.then_some(1),
            log_freq: train.then_some(1),
            val_freq: train.then_some(10),
            distributed: false,
            use_latent_flow: true,
            train_t: None,
            resume_checkpoint: None,
            data_dir: Some(PathBuf::from(DEFAULT_DATA_DIR)),
            dataset_type: Some(DEFAULT_DATASET_TYPE.to_string()),
            interpreter: "python".to_string(),
            script: None,
        }
    }

    pub fn script_path(&self) -> PathBuf {
        self.script
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.mode.default_script()))
    }

    /// Copy every field that `overrides` sets.
    pub fn apply(&mut self, overrides: &RunOverrides) {
        fn set<T: Clone>(slot: &mut Option<T>, value: &Option<T>) {
            if let Some(v) = value {
                *slot = Some(v.clone());
            }
        }

        set(&mut self.dims, &overrides.dims);
        set(&mut self.latent_dims, &overrides.latent_dims);
        set(&mut self.num_blocks, &overrides.num_blocks);
        set(&mut self.latent_num_blocks, &overrides.latent_num_blocks);
        set(&mut self.zdim, &overrides.zdim);
        set(&mut self.batch_size, &overrides.batch_size);
        set(&mut self.lr, &overrides.lr);
        set(&mut self.epochs, &overrides.epochs);
        set(&mut self.save_freq, &overrides.save_freq);
        set(&mut self.viz_freq, &overrides.viz_freq);
        set(&mut self.log_freq, &overrides.log_freq);
        set(&mut self.val_freq, &overrides.val_freq);
        set(&mut self.train_t, &overrides.train_t);
        set(&mut self.resume_checkpoint, &overrides.resume_checkpoint);
        set(&mut self.data_dir, &overrides.data_dir);
        set(&mut self.log_name, &overrides.log_name);
        set(&mut self.dataset_type, &overrides.dataset_type);
        set(&mut self.script, &overrides.script);

        if let Some(cates) = &overrides.cates {
            self.cates = cates.clone();
        }
        if let Some(distributed) = overrides.distributed {
            self.distributed = distributed;
        }
        if let Some(use_latent_flow) = overrides.use_latent_flow {
            self.use_latent_flow = use_latent_flow;
        }
        if let Some(interpreter) = &overrides.interpreter {
            self.interpreter = interpreter.clone();
        }
    }

    /// Reject values the external program cannot use.
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(LaunchError::InvalidConfig(msg));

        if self.cates.trim().is_empty() {
            return invalid("cates must not be empty".into());
        }
        if self.interpreter.trim().is_empty() {
            return invalid("interpreter must not be empty".into());
        }
        let positive = [
            ("num_blocks", self.num_blocks),
            ("latent_num_blocks", self.latent_num_blocks),
            ("zdim", self.zdim),
            ("batch_size", self.batch_size),
            ("epochs", self.epochs),
            ("save_freq", self.save_freq),
            ("viz_freq", self.viz_freq),
            ("log_freq", self.log_freq),
            ("val_freq", self.val_freq),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == Some(0)) {
            return invalid(format!("{name} must be positive"));
        }
        if let Some(lr) = self.lr {
            if !(lr.is_finite() && lr > 0.0) {
                return invalid(format!("lr must be a positive number, got {lr}"));
            }
        }
        if self.mode == RunMode::Test && self.resume_checkpoint.is_none() {
            return invalid("test runs need resume_checkpoint".into());
        }
        Ok(())
    }

    /// Flags for the external program, in a fixed order. Paths are passed
    /// as raw OS strings.
    pub fn to_args(&self) -> Vec<OsString> {
        self.flags()
            .into_iter()
            .flat_map(|(flag, value)| {
                std::iter::once(OsString::from(format!("--{flag}"))).chain(value)
            })
            .collect()
    }

    /// `(flag, value)` pairs; switches carry no value.
    pub(crate) fn flags(&self) -> Vec<(&'static str, Option<OsString>)> {
        fn push<V: Into<OsString>>(
            flags: &mut Vec<(&'static str, Option<OsString>)>,
            flag: &'static str,
            value: Option<V>,
        ) {
            if let Some(v) = value {
                flags.push((flag, Some(v.into())));
            }
        }
        let number = |v: Option<u32>| v.map(|v| v.to_string());
        let mut flags = Vec::new();

        push(&mut flags, "log_name", self.log_name.clone());
        push(&mut flags, "lr", self.lr.map(|v| v.to_string()));
        push(&mut flags, "dataset_type", self.dataset_type.clone());
        push(&mut flags, "data_dir", self.data_dir.clone());
        push(&mut flags, "cates", Some(self.cates.clone()));
        push(&mut flags, "dims", self.dims.as_ref().map(Dims::to_string));
        push(&mut flags, "latent_dims", self.latent_dims.as_ref().map(Dims::to_string));
        push(&mut flags, "num_blocks", number(self.num_blocks));
        push(&mut flags, "latent_num_blocks", number(self.latent_num_blocks));
        push(&mut flags, "zdim", number(self.zdim));
        push(&mut flags, "batch_size", number(self.batch_size));
        push(&mut flags, "epochs", number(self.epochs));
        push(&mut flags, "save_freq", number(self.save_freq));
        push(&mut flags, "viz_freq", number(self.viz_freq));
        push(&mut flags, "log_freq", number(self.log_freq));
        push(&mut flags, "val_freq", number(self.val_freq));
        push(&mut flags, "train_T", self.train_t.map(|v| if v { "True" } else { "False" }));
        push(&mut flags, "resume_checkpoint", self.resume_checkpoint.clone());

        if self.distributed {
            flags.push(("distributed", None));
        }
        if self.use_latent_flow {
            flags.push(("use_latent_flow", None));
        }
        flags
    }
}

/// Partial configuration layered over a preset, from a preset file or the
/// command line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOverrides {
    pub cates: Option<String>,
    pub dims: Option<Dims>,
    pub latent_dims: Option<Dims>,
    pub num_blocks: Option<u32>,
    pub latent_num_blocks: Option<u32>,
    pub zdim: Option<u32>,
    pub batch_size: Option<u32>,
    pub lr: Option<f64>,
    pub epochs: Option<u32>,
    pub save_freq: Option<u32>,
    pub viz_freq: Option<u32>,
    pub log_freq: Option<u32>,
    pub val_freq: Option<u32>,
    pub distributed: Option<bool>,
    pub use_latent_flow: Option<bool>,
    pub train_t: Option<bool>,
    pub resume_checkpoint: Option<PathBuf>,
    pub data_dir: Option<PathBuf>,
    pub log_name: Option<String>,
    pub dataset_type: Option<String>,
    pub interpreter: Option<String>,
    pub script: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_train_defaults_render_in_order() {
        let config = RunConfig::defaults(RunMode::Train, "airplane");
        assert_eq!(
            config.to_args(),
            vec![
                "--log_name", "gen/shapenet15k-cateairplane",
                "--lr", "0.002",
                "--dataset_type", "shapenet15k",
                "--data_dir", "data/ShapeNetCore.v2.PC15k",
                "--cates", "airplane",
                "--dims", "512-512-512",
                "--latent_dims", "256-256",
                "--num_blocks", "1",
                "--latent_num_blocks", "1",
                "--zdim", "128",
                "--batch_size", "16",
                "--epochs", "4000",
                "--save_freq", "50",
                "--viz_freq", "1",
                "--log_freq", "1",
                "--val_freq", "10",
                "--use_latent_flow",
            ]
        );
    }

    #[test]
    fn test_test_defaults_skip_training_schedule() {
        let mut config = RunConfig::defaults(RunMode::Test, "chair");
        config.resume_checkpoint = Some(PathBuf::from("ckpt/chair.pt"));
        let args = config.to_args();
        for flag in ["--lr", "--epochs", "--batch_size", "--save_freq", "--log_name"] {
            assert!(!args.iter().any(|a| a == flag), "{flag} present");
        }
        assert!(args.windows(2).any(|w| w == ["--resume_checkpoint", "ckpt/chair.pt"]));
        assert_eq!(config.script_path(), PathBuf::from("test.py"));
    }

    #[test]
    fn test_switches_and_train_t() {
        let mut config = RunConfig::defaults(RunMode::Train, "car_new");
        config.distributed = true;
        config.use_latent_flow = false;
        config.train_t = Some(false);
        let args = config.to_args();
        assert!(args.iter().any(|a| a == "--distributed"));
        assert!(!args.iter().any(|a| a == "--use_latent_flow"));
        assert!(args.windows(2).any(|w| w == ["--train_T", "False"]));
    }

    #[test]
    fn test_values_forwarded_unchanged() {
        let mut config = RunConfig::defaults(RunMode::Train, "animal");
        config.apply(&RunOverrides {
            dims: Some("1024-256".parse().unwrap()),
            zdim: Some(64),
            lr: Some(1e-4),
            data_dir: Some(PathBuf::from("/mnt/data dir")),
            ..Default::default()
        });
        let args = config.to_args();
        let value_of = |flag: &str| {
            let i = args.iter().position(|a| a == flag).unwrap();
            args[i + 1].clone()
        };
        assert_eq!(value_of("--dims"), "1024-256");
        assert_eq!(value_of("--zdim"), "64");
        assert_eq!(value_of("--lr").to_str().unwrap().parse::<f64>().unwrap(), 1e-4);
        assert_eq!(value_of("--data_dir"), "/mnt/data dir");
        assert_eq!(value_of("--cates"), "animal");
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_paths_forwarded_unchanged() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let raw = OsStr::from_bytes(b"/data/shape\xffnet");
        let mut config = RunConfig::defaults(RunMode::Test, "chair");
        config.data_dir = Some(PathBuf::from(raw));
        config.resume_checkpoint = Some(PathBuf::from(raw).join("ckpt.pt"));

        let args = config.to_args();
        let value_of = |flag: &str| {
            let i = args.iter().position(|a| a == flag).unwrap();
            args[i + 1].clone()
        };
        assert_eq!(value_of("--data_dir").as_os_str(), raw);
        assert_eq!(
            value_of("--resume_checkpoint").as_os_str(),
            PathBuf::from(raw).join("ckpt.pt").as_os_str()
        );
    }

    #[test]
    fn test_validate() {
        let train = RunConfig::defaults(RunMode::Train, "chair");
        assert!(train.validate().is_ok());

        let mut zero = train.clone();
        zero.batch_size = Some(0);
        assert!(matches!(zero.validate(), Err(LaunchError::InvalidConfig(m)) if m.contains("batch_size")));

        let mut bad_lr = train.clone();
        bad_lr.lr = Some(-1.0);
        assert!(bad_lr.validate().is_err());

        let test = RunConfig::defaults(RunMode::Test, "chair");
        assert!(matches!(test.validate(), Err(LaunchError::InvalidConfig(m)) if m.contains("resume_checkpoint")));
    }

    #[test]
    fn test_mode_parse() {
        assert_eq!("train".parse::<RunMode>().unwrap(), RunMode::Train);
        assert!("eval".parse::<RunMode>().is_err());
    }
}
