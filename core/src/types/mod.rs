pub(crate) mod config;
pub use config::{
    AppConfig, AppConfigError, AssetConfig, AssetSettings, Config, MAX_LOCKOUT_SECS, SessionConfig,
    SessionSettings,
};

pub(crate) mod asset_id;
pub use asset_id::{AssetId, AssetIdError, MAX_ASSET_ID_LENGTH};

pub(crate) mod value;
pub use value::versioned_value::error::CodecError;
pub use value::{AssetRecord, DecodedAsset, SessionState};
