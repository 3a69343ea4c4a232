// ABOUTME: Three-part template version with canonical vMAJOR.MINOR.PATCH text form
// ABOUTME: Serializes only as its canonical string and rejects non-string input

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::error::VersionError;

/// Template version. Ordering is lexicographic over (major, minor, patch).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    /// Incompatible changes.
    pub major: u64,
    /// Backwards compatible additions.
    pub minor: u64,
    /// Backwards compatible fixes.
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.major == 0 && self.minor == 0 && self.patch == 0
    }

    /// Parse the canonical `vX.Y.Z` form. Components are trimmed before parsing.
    pub fn parse(text: &str) -> Result<Self, VersionError> {
        let first = text.chars().next().ok_or(VersionError::EmptyInput)?;
        if first != 'v' {
            return Err(VersionError::InvalidPrefix(first));
        }

        let parts: Vec<&str> = text[1..].split('.').collect();
        if parts.len() != 3 {
            return Err(VersionError::InvalidFormat);
        }

        Ok(Self {
            major: parse_component(parts[0])?,
            minor: parse_component(parts[1])?,
            patch: parse_component(parts[2])?,
        })
    }
}

fn parse_component(part: &str) -> Result<u64, VersionError> {
    let clean = part.trim();
    if clean.is_empty() {
        return Err(VersionError::EmptyComponent);
    }
    // u64::from_str also takes a leading '+'
    if !clean.bytes().all(|b| b.is_ascii_digit()) {
        return Err(VersionError::NotDecimal {
            component: clean.to_string(),
        });
    }
    clean
        .parse::<u64>()
        .map_err(|source| VersionError::InvalidNumber {
            component: clean.to_string(),
            source,
        })
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct VersionVisitor;

impl<'de> Visitor<'de> for VersionVisitor {
    type Value = Version;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a version string such as \"v1.2.3\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Version, E> {
        Version::parse(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(VersionVisitor)
    }
}
