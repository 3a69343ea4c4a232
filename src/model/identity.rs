// ABOUTME: Compound template key of the form author/namespace@vX.Y.Z
// ABOUTME: Used both as a lookup key for decoders and as a human-readable label

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ModelError;
use super::version::Version;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    pub author: String,
    pub namespace: String,
    pub version: Version,
}

impl Identity {
    pub fn new(author: impl Into<String>, namespace: impl Into<String>, version: Version) -> Self {
        Self {
            author: author.into(),
            namespace: namespace.into(),
            version,
        }
    }

    /// Split on the first `/`, then on the first `@`, then parse the version.
    pub fn parse(text: &str) -> Result<Self, ModelError> {
        let invalid = || ModelError::InvalidIdentity {
            identity: text.to_string(),
        };

        let (author, rest) = text.split_once('/').ok_or_else(invalid)?;
        let (namespace, version) = rest.split_once('@').ok_or_else(invalid)?;
        let version = Version::parse(version).map_err(|source| ModelError::InvalidVersion {
            identity: text.to_string(),
            source,
        })?;

        Ok(Self::new(author, namespace, version))
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.author, self.namespace, self.version)
    }
}

impl FromStr for Identity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
