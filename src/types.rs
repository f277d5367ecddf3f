//! Common types used throughout the Mastodon client
//!
//! This module contains shared enums and small utility types used across
//! multiple modules.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
    PUT,
    PATCH,
    DELETE,
}

impl Method {
    /// Whether parameters travel in the query string rather than the body
    pub fn uses_query(self) -> bool {
        matches!(self, Method::GET)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::PATCH => "PATCH",
            Method::DELETE => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
            Method::PUT => reqwest::Method::PUT,
            Method::PATCH => reqwest::Method::PATCH,
            Method::DELETE => reqwest::Method::DELETE,
        }
    }
}

// ============================================================================
// Rate Limit Method
// ============================================================================

/// How the client reacts to the server's request quota
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateLimitMethod {
    /// Fail fast with a rate limit error
    Throw,
    /// Sleep until the window resets, then retry
    #[default]
    Wait,
    /// Spread requests evenly across the window
    Pace,
}

impl FromStr for RateLimitMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "throw" => Ok(Self::Throw),
            "wait" => Ok(Self::Wait),
            "pace" => Ok(Self::Pace),
            _ => Err(Error::illegal_argument("Invalid ratelimit method.")),
        }
    }
}

// ============================================================================
// Version Check Mode
// ============================================================================

/// Which threshold of an operation the version gate compares against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionCheckMode {
    /// Fail when the server predates the operation's introduction
    #[default]
    #[serde(alias = "strict-introduced")]
    Created,
    /// Fail when the server predates the operation's last behavior change
    #[serde(alias = "strict-behavior")]
    Changed,
    /// Never fail
    #[serde(alias = "disabled")]
    None,
}

impl FromStr for VersionCheckMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "created" | "strict-introduced" => Ok(Self::Created),
            "changed" | "strict-behavior" => Ok(Self::Changed),
            "none" | "disabled" => Ok(Self::None),
            _ => Err(Error::illegal_argument("Invalid version check method.")),
        }
    }
}

// ============================================================================
// Status Visibility
// ============================================================================

/// Who may see a posted status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Only mentioned users
    Direct,
    /// Only followers
    Private,
    /// Public, but not on public timelines
    Unlisted,
    Public,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Direct => "direct",
            Visibility::Private => "private",
            Visibility::Unlisted => "unlisted",
            Visibility::Public => "public",
        }
    }
}

impl FromStr for Visibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "private" => Ok(Self::Private),
            "unlisted" => Ok(Self::Unlisted),
            "public" => Ok(Self::Public),
            other => Err(Error::illegal_argument(format!(
                "Invalid visibility value '{other}'! Acceptable values are direct, private, unlisted, public"
            ))),
        }
    }
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.is_empty())
    }
}

impl OptionStringExt for String {
    fn none_if_empty(self) -> Option<String> {
        if self.is_empty() {
            None
        } else {
            Some(self)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_conversion() {
        let get: reqwest::Method = Method::GET.into();
        assert_eq!(reqwest::Method::GET, get);
        let delete: reqwest::Method = Method::DELETE.into();
        assert_eq!(reqwest::Method::DELETE, delete);
    }

    #[test]
    fn test_method_query_placement() {
        assert!(Method::GET.uses_query());
        assert!(!Method::POST.uses_query());
        assert!(!Method::DELETE.uses_query());
    }

    #[test]
    fn test_rate_limit_method_parse() {
        assert_eq!("pace".parse::<RateLimitMethod>().unwrap(), RateLimitMethod::Pace);
        assert!(matches!(
            "sometimes".parse::<RateLimitMethod>(),
            Err(Error::IllegalArgument { .. })
        ));
    }

    #[test]
    fn test_version_check_mode_serde() {
        let mode: VersionCheckMode = serde_json::from_str("\"changed\"").unwrap();
        assert_eq!(mode, VersionCheckMode::Changed);
        let mode: VersionCheckMode = serde_json::from_str("\"disabled\"").unwrap();
        assert_eq!(mode, VersionCheckMode::None);
        assert_eq!(VersionCheckMode::default(), VersionCheckMode::Created);
    }

    #[test]
    fn test_visibility_parse() {
        assert_eq!("PUBLIC".parse::<Visibility>().unwrap(), Visibility::Public);
        assert_eq!("direct".parse::<Visibility>().unwrap().as_str(), "direct");
        assert!(matches!(
            "friends".parse::<Visibility>(),
            Err(Error::IllegalArgument { .. })
        ));
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("test".to_string()).none_if_empty(),
            Some("test".to_string())
        );
        assert_eq!(Some(String::new()).none_if_empty(), None);
        assert_eq!(String::new().none_if_empty(), None);
    }
}
