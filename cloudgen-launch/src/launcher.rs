//! Running the external program for a [`RunConfig`].

use crate::{LaunchError, Result, RunConfig, shell_quote};
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};
use tracing::{info, warn};

/// What a failing program means for the launcher's own result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExitPolicy {
    /// Succeed once the program has run, whatever its exit status. A
    /// program that cannot be started is still an error, so `Done` is not
    /// printed and the exit status is 1.
    #[default]
    Mask,
    /// Fail when the program fails.
    Propagate,
}

impl ExitPolicy {
    pub fn check(self, status: ExitStatus) -> Result<()> {
        match self {
            _ if status.success() => Ok(()),
            ExitPolicy::Mask => {
                warn!("Program failed with {}; exit status masked", status);
                Ok(())
            }
            ExitPolicy::Propagate => Err(LaunchError::ChildFailed {
                code: status.code(),
            }),
        }
    }
}

#[derive(Debug)]
pub enum LaunchOutcome {
    /// The command that would have run.
    DryRun(String),
    Finished(ExitStatus),
}

/// Builds and runs the command line for a configuration.
#[derive(Debug, Clone, Default)]
pub struct Launcher {
    pub dry_run: bool,
    pub working_dir: Option<PathBuf>,
}

impl Launcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn command(&self, config: &RunConfig) -> Command {
        let mut cmd = Command::new(&config.interpreter);
        cmd.arg(config.script_path()).args(config.to_args());
        if let Some(dir) = &self.working_dir {
            cmd.current_dir(dir);
        }
        cmd
    }

    /// The command as a single shell-quoted line, for display.
    pub fn command_line(&self, config: &RunConfig) -> String {
        let mut parts: Vec<OsString> = vec![
            config.interpreter.clone().into(),
            config.script_path().into_os_string(),
        ];
        parts.extend(config.to_args());
        parts
            .iter()
            .map(|part| shell_quote(&part.to_string_lossy()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Validate `config`, then run the program and wait for it.
    #[tracing::instrument(skip_all, fields(mode = %config.mode, cates = %config.cates))]
    pub fn run(&self, config: &RunConfig) -> Result<LaunchOutcome> {
        config.validate()?;
        let line = self.command_line(config);
        if self.dry_run {
            return Ok(LaunchOutcome::DryRun(line));
        }

        info!("Launching: {}", line);
        let status = self
            .command(config)
            .status()
            .map_err(|source| LaunchError::Spawn {
                program: config.interpreter.clone(),
                source,
            })?;
        info!("Program finished with {}", status);
        Ok(LaunchOutcome::Finished(status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RunMode, RunOverrides};

    fn config_with(interpreter: &str) -> RunConfig {
        let mut config = RunConfig::defaults(RunMode::Train, "chair");
        config.apply(&RunOverrides {
            interpreter: Some(interpreter.to_string()),
            ..Default::default()
        });
        config
    }

    #[test]
    fn test_dry_run_does_not_spawn() {
        let launcher = Launcher::new().with_dry_run(true);
        let outcome = launcher.run(&config_with("definitely-not-a-program")).unwrap();
        match outcome {
            LaunchOutcome::DryRun(line) => {
                assert!(line.starts_with("definitely-not-a-program train.py --log_name"));
                assert!(line.ends_with("--use_latent_flow"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn test_invalid_config_is_not_launched() {
        let mut config = config_with("python");
        config.epochs = Some(0);
        assert!(matches!(
            Launcher::new().with_dry_run(true).run(&config),
            Err(LaunchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_missing_interpreter_is_spawn_error() {
        let err = Launcher::new()
            .run(&config_with("definitely-not-a-program"))
            .unwrap_err();
        assert!(matches!(err, LaunchError::Spawn { .. }));
    }

    #[test]
    fn test_command_arguments() {
        let config = config_with("python3");
        let cmd = Launcher::new().with_working_dir("/tmp").command(&config);
        assert_eq!(cmd.get_program(), "python3");
        let args: Vec<OsString> = cmd.get_args().map(|a| a.to_os_string()).collect();
        assert_eq!(args[0], "train.py");
        assert_eq!(&args[1..], config.to_args().as_slice());
        assert_eq!(cmd.get_current_dir(), Some(std::path::Path::new("/tmp")));
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_policies() {
        let failing = Launcher::new().run(&config_with("false")).unwrap();
        let LaunchOutcome::Finished(status) = failing else {
            panic!("expected a finished run");
        };
        assert!(!status.success());
        assert!(ExitPolicy::Mask.check(status).is_ok());
        assert!(matches!(
            ExitPolicy::Propagate.check(status),
            Err(LaunchError::ChildFailed { code: Some(1) })
        ));

        let passing = Launcher::new().run(&config_with("true")).unwrap();
        let LaunchOutcome::Finished(status) = passing else {
            panic!("expected a finished run");
        };
        assert!(ExitPolicy::Propagate.check(status).is_ok());
    }
}
