use serde::{Deserialize, Serialize};
use std::io::IsTerminal;

use crate::error::{LoggerError, LoggerResult};
use crate::object::{LoggerFormat, LoggerLevel, LoggerTimeZone};

/// Environment variable names read by [`LoggerConfig::from_lookup`].
pub mod vars {
    pub const LOG_LEVEL: &str = "LOG_LEVEL";
    pub const LOG_FORMAT: &str = "LOG_FORMAT";
    pub const LOG_TZ: &str = "LOG_TZ";
    pub const LOG_COLOR: &str = "LOG_COLOR";
    pub const LOG_TARGETS: &str = "LOG_TARGETS";
}

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// Filter expression (e.g. `"info"`, `"dind_exec=debug,info"`).
    pub level: LoggerLevel,
    /// Timezone for timestamps.
    pub tz: LoggerTimeZone,
    /// Include module targets in text/json output.
    pub with_targets: bool,
    /// Colored text output, if stdout is a terminal.
    pub use_color: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            tz: LoggerTimeZone::default(),
            with_targets: false,
            use_color: true,
        }
    }
}

impl LoggerConfig {
    /// Build a config from a variable lookup, keeping defaults for unset or blank keys.
    pub fn from_lookup<F>(lookup: F) -> LoggerResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let mut cfg = Self::default();

        if let Some(v) = get(vars::LOG_LEVEL) {
            cfg.level = v.parse()?;
        }
        if let Some(v) = get(vars::LOG_FORMAT) {
            cfg.format = v.parse()?;
        }
        if let Some(v) = get(vars::LOG_TZ) {
            cfg.tz = v.parse()?;
        }
        if let Some(v) = get(vars::LOG_COLOR) {
            cfg.use_color = parse_bool(vars::LOG_COLOR, &v)?;
        }
        if let Some(v) = get(vars::LOG_TARGETS) {
            cfg.with_targets = parse_bool(vars::LOG_TARGETS, &v)?;
        }
        Ok(cfg)
    }

    /// Color is used only when enabled AND stdout is a terminal.
    ///
    /// Evaluate at logger initialization, not at config parsing.
    pub fn should_use_color(&self) -> bool {
        self.use_color && std::io::stdout().is_terminal()
    }
}

fn parse_bool(var: &'static str, value: &str) -> LoggerResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(LoggerError::InvalidVariable {
            var,
            reason: format!("not a boolean: {value:?}"),
        }),
    }
}
