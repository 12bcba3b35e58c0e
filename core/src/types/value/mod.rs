//! Persisted value types.
//!
//! `SessionState` and `AssetRecord` are re-exported from `schoolhouse_core::types`
//! as the latest stored layout.

pub(crate) mod versioned_value;

pub use versioned_value::latest_value::{AssetRecord, SessionState};

/// Decoded file contents of a stored asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAsset {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}
