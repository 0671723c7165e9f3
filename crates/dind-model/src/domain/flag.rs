use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Boolean switch with explicit enable/disable semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Flag(bool);

impl Flag {
    /// Create an enabled flag.
    pub const fn enabled() -> Self {
        Self(true)
    }

    /// Create a disabled flag.
    pub const fn disabled() -> Self {
        Self(false)
    }

    pub const fn is_enabled(&self) -> bool {
        self.0
    }

    pub const fn is_disabled(&self) -> bool {
        !self.0
    }

    /// Render as the `true`/`false` literal the runner CLI expects.
    pub const fn as_str(&self) -> &'static str {
        if self.0 { "true" } else { "false" }
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self::enabled()
    }
}

impl From<bool> for Flag {
    fn from(b: bool) -> Self {
        Self(b)
    }
}

impl From<Flag> for bool {
    fn from(f: Flag) -> Self {
        f.0
    }
}

/// Accepts the spellings commonly found in container env files.
impl FromStr for Flag {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(Self::enabled()),
            "0" | "false" | "no" | "off" => Ok(Self::disabled()),
            _ => Err(ModelError::Invalid(format!("not a boolean: {s:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Flag;

    #[test]
    fn default_is_enabled() {
        let f = Flag::default();
        assert!(f.is_enabled());
        assert!(!f.is_disabled());
    }

    #[test]
    fn parses_env_spellings() {
        for s in ["1", "true", "TRUE", "yes", "on", " On "] {
            assert!(s.parse::<Flag>().unwrap().is_enabled(), "{s:?}");
        }
        for s in ["0", "false", "False", "no", "off"] {
            assert!(s.parse::<Flag>().unwrap().is_disabled(), "{s:?}");
        }
    }

    #[test]
    fn rejects_garbage() {
        for s in ["", "maybe", "2", "enabled"] {
            assert!(s.parse::<Flag>().is_err(), "{s:?} should not parse");
        }
    }

    #[test]
    fn renders_cli_literal() {
        assert_eq!(Flag::enabled().as_str(), "true");
        assert_eq!(Flag::disabled().as_str(), "false");
    }

    #[test]
    fn serde_transparent() {
        let json = serde_json::to_string(&Flag::disabled()).unwrap();
        assert_eq!(json, "false");
        let back: Flag = serde_json::from_str("true").unwrap();
        assert!(back.is_enabled());
    }
}
