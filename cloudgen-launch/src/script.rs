//! Rendering a run as a standalone bash script.

use crate::RunConfig;
use std::fmt::Write;

/// Quote `value` for a POSIX shell when it contains anything unsafe.
pub fn shell_quote(value: &str) -> String {
    let safe = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "_-./:=+,@%".contains(c));
    if safe {
        value.to_string()
    } else {
        format!("'{}'", value.replace('\'', r"'\''"))
    }
}

/// The bash preset equivalent to launching `config`: one variable per
/// option, the program invocation, then `Done` and exit status 0.
/// Values that are not valid UTF-8 are written lossily.
pub fn to_shell_script(config: &RunConfig) -> String {
    let flags = config.flags();
    let mut script = String::from("#! /bin/bash\n\n");

    for (flag, value) in &flags {
        if let Some(value) = value {
            let _ = writeln!(script, "{flag}={}", shell_quote(&value.to_string_lossy()));
        }
    }

    let _ = write!(
        script,
        "\n{} {}",
        shell_quote(&config.interpreter),
        shell_quote(&config.script_path().display().to_string())
    );
    for (flag, value) in &flags {
        match value {
            Some(_) => {
                let _ = write!(script, " \\\n    --{flag} \"${{{flag}}}\"");
            }
            None => {
                let _ = write!(script, " \\\n    --{flag}");
            }
        }
    }
    script.push_str("\n\necho \"Done\"\nexit 0\n");
    script
}
