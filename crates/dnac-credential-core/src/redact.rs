//! Secret scrubbing for log and error messages

use regex::{Captures, Regex};
use std::fmt;

use crate::render::RenderedEnvironment;

/// Placeholder written instead of a secret
pub const REDACTED: &str = "[REDACTED]";

/// Removes secrets from free-form messages
///
/// Two passes: known secret values (longest first) are replaced wherever
/// they occur, then `password=...` / `"secret": "..."` style assignments are
/// masked even when the value is unknown.
#[derive(Clone)]
pub struct SecretScrubber {
    assignment_pattern: Regex,
    known: Vec<String>,
}

impl SecretScrubber {
    pub fn new() -> Self {
        Self {
            assignment_pattern: Regex::new(
                r#"(?i)(["']?[A-Za-z0-9_]*(?:password|passwd|secret|token)["']?\s*[:=]\s*)("[^"]*"|'[^']*'|[^"'\s,}]+)"#,
            )
            .expect("valid assignment regex"),
            known: Vec::new(),
        }
    }

    /// Scrubber that knows every secret value of a rendered environment
    pub fn for_environment(env: &RenderedEnvironment) -> Self {
        env.secret_values()
            .into_iter()
            .fold(Self::new(), |scrubber, value| scrubber.with_secret(value))
    }

    /// Register a secret value; empty values are ignored
    pub fn with_secret(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() && !self.known.contains(&value) {
            self.known.push(value);
            self.known.sort_by(|a, b| b.len().cmp(&a.len()));
        }
        self
    }

    /// Scrub a message of sensitive data
    pub fn scrub(&self, message: &str) -> String {
        let mut scrubbed = message.to_string();
        for secret in &self.known {
            scrubbed = scrubbed.replace(secret.as_str(), REDACTED);
        }
        self.assignment_pattern
            .replace_all(&scrubbed, |caps: &Captures| {
                if &caps[2] == REDACTED {
                    caps[0].to_string()
                } else {
                    format!("{}{}", &caps[1], REDACTED)
                }
            })
            .to_string()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber")
            .field("known", &self.known.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values_scrubbed() {
        let scrubber = SecretScrubber::new().with_secret("s3cr3t");
        let scrubbed = scrubber.scrub("login failed for admin with s3cr3t");
        assert_eq!(scrubbed, "login failed for admin with [REDACTED]");
    }

    #[test]
    fn test_env_assignment_scrubbed() {
        let scrubber = SecretScrubber::new();
        let scrubbed = scrubber.scrub("DNAC_HOST=10.0.0.5 DNAC_PASSWORD=hunter2");
        assert_eq!(scrubbed, "DNAC_HOST=10.0.0.5 DNAC_PASSWORD=[REDACTED]");
    }

    #[test]
    fn test_json_field_scrubbed() {
        let scrubber = SecretScrubber::new();
        let scrubbed = scrubber.scrub(r#"{"username": "admin", "password": "super_secret"}"#);
        assert!(!scrubbed.contains("super_secret"));
        assert!(scrubbed.contains(r#""password": [REDACTED]"#));
        assert!(scrubbed.contains("admin"));
    }

    #[test]
    fn test_longest_secret_first() {
        let scrubber = SecretScrubber::new().with_secret("abc").with_secret("abcdef");
        assert_eq!(scrubber.scrub("value abcdef"), "value [REDACTED]");
    }

    #[test]
    fn test_empty_secret_ignored() {
        let scrubber = SecretScrubber::new().with_secret("");
        assert_eq!(scrubber.scrub("nothing here"), "nothing here");
    }

    #[test]
    fn test_already_redacted_left_alone() {
        let scrubber = SecretScrubber::new().with_secret("pw");
        assert_eq!(scrubber.scrub("password=pw"), "password=[REDACTED]");
    }

    #[test]
    fn test_debug_hides_values() {
        let scrubber = SecretScrubber::new().with_secret("s3cr3t");
        assert!(!format!("{:?}", scrubber).contains("s3cr3t"));
    }
}
