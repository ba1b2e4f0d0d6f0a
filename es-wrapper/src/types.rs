//! Version-neutral types returned to callers.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::WrapperError;

/// Major version of the Elasticsearch engine a dispatcher talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EsVersion {
    V5,
    V6,
    V7,
}

impl EsVersion {
    /// The major version number.
    pub fn number(self) -> u8 {
        match self {
            Self::V5 => 5,
            Self::V6 => 6,
            Self::V7 => 7,
        }
    }
}

impl TryFrom<u8> for EsVersion {
    type Error = WrapperError;

    fn try_from(version: u8) -> Result<Self, Self::Error> {
        match version {
            5 => Ok(Self::V5),
            6 => Ok(Self::V6),
            7 => Ok(Self::V7),
            other => Err(WrapperError::unsupported_version(other)),
        }
    }
}

impl fmt::Display for EsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Acknowledgement of an index creation request.
///
/// `index` is only reported by v6 and later engines; for v5 it stays `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndicesCreateResult {
    /// Whether the cluster acknowledged the creation.
    pub acknowledged: bool,
    /// Whether the required number of shard copies started before the timeout.
    pub shards_acknowledged: bool,
    /// Name of the created index.
    pub index: Option<String>,
}
