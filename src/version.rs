//! Version gate
//!
//! Parses server version strings into comparable triples and decides
//! whether an operation may run against the connected instance.

use crate::error::{Error, Result};
use crate::types::VersionCheckMode;
use std::fmt;
use std::str::FromStr;

/// A `major.minor.patch` version with any pre-release suffix dropped
///
/// Ordering is lexicographic over (major, minor, patch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a dotted version string such as `2.4.3rc1` or `4.2.0+glitch`
    ///
    /// Each component keeps only its leading digits. Missing minor or patch
    /// components count as zero; a component with no leading digits fails.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parts = input.trim().split('.');
        let major = parse_component(input, parts.next())?;
        let minor = match parts.next() {
            Some(part) => parse_component(input, Some(part))?,
            None => 0,
        };
        let patch = match parts.next() {
            Some(part) => parse_component(input, Some(part))?,
            None => 0,
        };
        Ok(Self::new(major, minor, patch))
    }
}

fn parse_component(input: &str, part: Option<&str>) -> Result<u32> {
    let part = part.unwrap_or_default();
    let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return Err(Error::VersionParse {
            input: input.to_string(),
            message: format!("component '{part}' does not start with a number"),
        });
    }
    digits.parse().map_err(|e| Error::VersionParse {
        input: input.to_string(),
        message: format!("component '{part}': {e}"),
    })
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Decide whether an operation may run against `server`
///
/// `introduced` is the version the operation first appeared in, `changed`
/// the version its behavior last changed in.
pub fn check_version(
    mode: VersionCheckMode,
    server: Version,
    introduced: Version,
    changed: Version,
) -> Result<()> {
    let required = match mode {
        VersionCheckMode::None => return Ok(()),
        VersionCheckMode::Created => introduced,
        VersionCheckMode::Changed => changed,
    };

    if required > server {
        return Err(Error::version(required.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("2.4.3", Version::new(2, 4, 3) ; "plain")]
    #[test_case("2.4.3rc1", Version::new(2, 4, 3) ; "release candidate")]
    #[test_case("4.2.0+glitch", Version::new(4, 2, 0) ; "build metadata")]
    #[test_case("3.0", Version::new(3, 0, 0) ; "missing patch")]
    #[test_case("1.0.0-beta.2", Version::new(1, 0, 0) ; "prerelease with dots")]
    fn test_parse(input: &str, expected: Version) {
        assert_eq!(Version::parse(input).unwrap(), expected);
    }

    #[test_case("abc" ; "letters")]
    #[test_case("" ; "empty")]
    #[test_case("2.x.1" ; "letter minor")]
    fn test_parse_rejects(input: &str) {
        assert!(matches!(
            Version::parse(input),
            Err(Error::VersionParse { .. })
        ));
    }

    #[test_case((1, 0, 0), (2, 0, 0), true ; "older major")]
    #[test_case((2, 1, 0), (2, 1, 0), true ; "equal")]
    #[test_case((2, 1, 3), (2, 2, 0), true ; "older minor newer patch")]
    #[test_case((3, 0, 0), (2, 9, 9), false ; "newer major")]
    #[test_case((2, 2, 0), (2, 1, 9), false ; "newer minor")]
    #[test_case((2, 1, 1), (2, 1, 0), false ; "newer patch")]
    fn test_gate_is_lexicographic(
        required: (u32, u32, u32),
        server: (u32, u32, u32),
        passes: bool,
    ) {
        let required = Version::new(required.0, required.1, required.2);
        let server = Version::new(server.0, server.1, server.2);
        let result = check_version(VersionCheckMode::Created, server, required, required);
        assert_eq!(result.is_ok(), passes);
    }

    #[test]
    fn test_modes_pick_threshold() {
        let server = Version::new(2, 0, 0);
        let introduced = Version::new(1, 0, 0);
        let changed = Version::new(2, 1, 0);

        assert!(check_version(VersionCheckMode::Created, server, introduced, changed).is_ok());

        let err = check_version(VersionCheckMode::Changed, server, introduced, changed).unwrap_err();
        assert_eq!(err.to_string(), "Version check failed (Need version 2.1.0)");

        let ancient = Version::new(0, 1, 0);
        assert!(check_version(VersionCheckMode::None, ancient, introduced, changed).is_ok());
    }

    #[test]
    fn test_display() {
        assert_eq!(Version::new(2, 4, 3).to_string(), "2.4.3");
    }
}
