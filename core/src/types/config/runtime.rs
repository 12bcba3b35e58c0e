use super::{AssetSettings, SessionSettings};
use std::time::Duration;

/// Lockout policy handed to the session guard.
#[derive(Clone, Copy, Debug)]
pub struct SessionConfig {
    pub max_failed_attempts: u32,
    pub lockout_duration: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from(&SessionSettings::default())
    }
}

impl From<&SessionSettings> for SessionConfig {
    fn from(settings: &SessionSettings) -> Self {
        Self {
            max_failed_attempts: settings.max_failed_attempts,
            lockout_duration: Duration::from_secs(settings.lockout_secs),
        }
    }
}

/// Optimization limits handed to the asset store.
#[derive(Clone, Copy, Debug)]
pub struct AssetConfig {
    pub max_width: u32,
    pub max_height: u32,
    /// JPEG quality in (0, 1].
    pub quality: f32,
    pub image_max_bytes: u64,
    pub file_max_bytes: u64,
    pub capacity_bytes: u64,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self::from(&AssetSettings::default())
    }
}

impl From<&AssetSettings> for AssetConfig {
    fn from(settings: &AssetSettings) -> Self {
        Self {
            max_width: settings.max_width,
            max_height: settings.max_height,
            quality: settings.quality,
            image_max_bytes: settings.image_max_bytes(),
            file_max_bytes: settings.file_max_bytes(),
            capacity_bytes: settings.capacity_bytes(),
        }
    }
}
