use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::ModelError;

/// Content check deciding whether an identity record proves a registration.
///
/// - `Substring`: the record mentions `token` anywhere (compatibility default).
/// - `Structured`: some non-comment `key = value` line has key `token` and a
///   non-empty value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPredicate {
    #[default]
    Substring,
    Structured,
}

const TOKEN_KEY: &str = "token";

impl TokenPredicate {
    /// Apply the predicate to the record content.
    pub fn matches(&self, content: &str) -> bool {
        match self {
            TokenPredicate::Substring => content.contains(TOKEN_KEY),
            TokenPredicate::Structured => content.lines().any(has_token_entry),
        }
    }
}

fn has_token_entry(line: &str) -> bool {
    let line = line.trim();
    if line.starts_with('#') {
        return false;
    }
    let Some((key, value)) = line.split_once('=') else {
        return false;
    };
    if key.trim() != TOKEN_KEY {
        return false;
    }
    // Drop trailing comment, then surrounding quotes.
    let value = value.split('#').next().unwrap_or_default().trim();
    let value = value.trim_matches(|c| c == '"' || c == '\'');
    !value.trim().is_empty()
}

impl FromStr for TokenPredicate {
    type Err = ModelError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "structured" => Ok(Self::Structured),
            _ => Err(ModelError::UnknownTokenPredicate(s.to_string())),
        }
    }
}

impl fmt::Display for TokenPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TokenPredicate::Substring => "substring",
            TokenPredicate::Structured => "structured",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::TokenPredicate;

    const REGISTERED: &str = r#"concurrent = 1

[[runners]]
  name = "docker-in-docker runner"
  url = "https://ci.example.com"
  token = "glrt-abc123"
  executor = "docker"
"#;

    #[test]
    fn substring_matches_registered_record() {
        assert!(TokenPredicate::Substring.matches(REGISTERED));
    }

    #[test]
    fn substring_rejects_record_without_token() {
        assert!(!TokenPredicate::Substring.matches("concurrent = 1\n"));
        assert!(!TokenPredicate::Substring.matches(""));
    }

    #[test]
    fn substring_accepts_token_in_comment() {
        assert!(TokenPredicate::Substring.matches("# token goes here\nconcurrent = 1\n"));
    }

    #[test]
    fn structured_matches_registered_record() {
        assert!(TokenPredicate::Structured.matches(REGISTERED));
    }

    #[test]
    fn structured_ignores_comments_and_empty_values() {
        assert!(!TokenPredicate::Structured.matches("# token = \"x\"\n"));
        assert!(!TokenPredicate::Structured.matches("token = \"\"\n"));
        assert!(!TokenPredicate::Structured.matches("token =   # later\n"));
        assert!(!TokenPredicate::Structured.matches("token_expires_at = 0\n"));
    }

    #[test]
    fn structured_accepts_unquoted_and_commented_values() {
        assert!(TokenPredicate::Structured.matches("token = abc # set by register\n"));
        assert!(TokenPredicate::Structured.matches("  token='abc'\n"));
    }

    #[test]
    fn parses_names() {
        assert_eq!("substring".parse::<TokenPredicate>().unwrap(), TokenPredicate::Substring);
        assert_eq!("STRUCTURED".parse::<TokenPredicate>().unwrap(), TokenPredicate::Structured);
        assert!("regex".parse::<TokenPredicate>().is_err());
    }
}
