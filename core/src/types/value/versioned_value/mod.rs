//! Version-tagged binary layout for persisted values.
//!
//! Every stored value is one version byte followed by a postcard body. Readers
//! always upgrade to the latest layout.

pub use v1 as latest_value;

pub mod v1;

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum CodecError {
        #[error("Stored value is empty")]
        Empty,

        #[error("Unsupported value version: {0}")]
        UnsupportedVersion(u8),

        #[error("Postcard error: {0}")]
        Postcard(#[from] postcard::Error),
    }
}

use error::CodecError;

pub trait ValueVariant {
    const VERSION: u8;
}

fn split_version(data: &[u8]) -> Result<(u8, &[u8]), CodecError> {
    let (version, body) = data.split_first().ok_or(CodecError::Empty)?;
    Ok((*version, body))
}

#[derive(Debug, Clone)]
pub enum VersionedSessionState {
    V1(v1::SessionState),
}

impl VersionedSessionState {
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::V1(v1) => Ok(postcard::to_extend(
                v1,
                vec![v1::SessionState::VERSION],
            )?),
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        match split_version(data)? {
            (v1::SessionState::VERSION, body) => Ok(Self::V1(postcard::from_bytes(body)?)),
            (version, _) => Err(CodecError::UnsupportedVersion(version)),
        }
    }

    pub fn into_latest(self) -> latest_value::SessionState {
        match self {
            Self::V1(v) => v,
        }
    }
}

#[derive(Debug, Clone)]
pub enum VersionedAssetRecord {
    V1(v1::AssetRecord),
}

impl VersionedAssetRecord {
    pub fn to_bytes(&self) -> Result<Vec<u8>, CodecError> {
        match self {
            Self::V1(v1) => Ok(postcard::to_extend(
                v1,
                vec![v1::AssetRecord::VERSION],
            )?),
        }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, CodecError> {
        match split_version(data)? {
            (v1::AssetRecord::VERSION, body) => Ok(Self::V1(postcard::from_bytes(body)?)),
            (version, _) => Err(CodecError::UnsupportedVersion(version)),
        }
    }

    pub fn into_latest(self) -> latest_value::AssetRecord {
        match self {
            Self::V1(v) => v,
        }
    }
}
