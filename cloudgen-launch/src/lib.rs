//! Cloudgen Launch Crate
//!
//! Typed run configurations for the external point-cloud generation program.
//! A [`RunConfig`] is rendered into the program's command-line flags, into the
//! equivalent bash script, or launched directly.

pub mod config;
pub mod dims;
pub mod error;
pub mod launcher;
pub mod presets;
pub mod script;

pub use config::{RunConfig, RunMode, RunOverrides};
pub use dims::Dims;
pub use error::LaunchError;
pub use launcher::{ExitPolicy, LaunchOutcome, Launcher};
pub use presets::PresetRegistry;
pub use script::{shell_quote, to_shell_script};

pub type Result<T> = std::result::Result<T, LaunchError>;
