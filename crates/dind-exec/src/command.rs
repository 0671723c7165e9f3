use std::{fmt, path::PathBuf};

use crate::ExecError;

const REDACTED: &str = "***";

/// Fully assembled child process invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Executable path or name resolved through `PATH`.
    pub(crate) program: PathBuf,
    pub(crate) args: Vec<String>,
    /// Flags whose following argument must never be logged.
    pub(crate) secret_flags: &'static [&'static str],
}

impl CommandSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            secret_flags: &[],
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn with_secret_flags(mut self, flags: &'static [&'static str]) -> Self {
        self.secret_flags = flags;
        self
    }

    pub fn program(&self) -> &PathBuf {
        &self.program
    }

    /// Raw arguments, secrets included.
    pub fn raw_args(&self) -> &[String] {
        &self.args
    }

    /// Program name used in logs and errors.
    pub fn program_name(&self) -> String {
        self.program.display().to_string()
    }

    /// Arguments safe for logging: the value after each secret flag is masked.
    pub fn redacted_args(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.args.len());
        let mut mask_next = false;
        for arg in &self.args {
            if mask_next {
                out.push(REDACTED.to_string());
                mask_next = false;
                continue;
            }
            match arg.split_once('=') {
                Some((flag, _)) if self.secret_flags.contains(&flag) => {
                    out.push(format!("{flag}={REDACTED}"));
                }
                _ => {
                    mask_next = self.secret_flags.contains(&arg.as_str());
                    out.push(arg.clone());
                }
            }
        }
        out
    }

    /// Rules:
    /// - `program` is not empty or whitespace-only.
    pub fn validate(&self) -> Result<(), ExecError> {
        if self.program.as_os_str().to_string_lossy().trim().is_empty() {
            return Err(ExecError::InvalidSpec("command program is empty".into()));
        }
        Ok(())
    }
}

/// Renders the command line with secrets masked.
impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in self.redacted_args() {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_value_after_secret_flag() {
        let spec = CommandSpec::new("gitlab-runner")
            .args(["register", "--registration-token", "abc123", "--url", "https://ci"])
            .with_secret_flags(&["--registration-token"]);

        assert_eq!(
            spec.redacted_args(),
            vec!["register", "--registration-token", "***", "--url", "https://ci"]
        );
        assert!(!spec.to_string().contains("abc123"));
        assert!(spec.raw_args().iter().any(|a| a == "abc123"));
    }

    #[test]
    fn redacts_inline_secret_value() {
        let spec = CommandSpec::new("gitlab-runner")
            .arg("--registration-token=abc123")
            .with_secret_flags(&["--registration-token"]);

        assert_eq!(spec.redacted_args(), vec!["--registration-token=***"]);
    }

    #[test]
    fn display_joins_program_and_args() {
        let spec = CommandSpec::new("/usr/bin/gitlab-runner").args(["verify", "--config", "/c"]);
        assert_eq!(spec.to_string(), "/usr/bin/gitlab-runner verify --config /c");
    }

    #[test]
    fn empty_program_is_invalid() {
        assert!(CommandSpec::new("  ").validate().is_err());
        assert!(CommandSpec::new("sh").validate().is_ok());
    }
}
