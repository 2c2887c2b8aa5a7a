//! Cloudgen Application
//!
//! Library side of the `cloudgen` binary: resolving run presets into a
//! launchable configuration, the generation evaluation pipeline, and logging
//! setup.

pub mod error;
pub mod eval;
pub mod logging;
pub mod runs;

pub use error::{AppError, Result};
pub use eval::{EvalConfig, GenerationMethod, evaluate};
pub use logging::LoggingConfig;
pub use runs::{load_registry, resolve_run};
