use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

const MIB: u64 = 1024 * 1024;

/// Longest accepted `session.lockout_secs` (one day).
pub const MAX_LOCKOUT_SECS: u64 = 24 * 60 * 60;

/// User-facing settings, persisted as config.toml.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub session: SessionSettings,
    #[serde(default)]
    pub assets: AssetSettings,
}

impl AppConfig {
    /// Returns the config file path within the given data directory.
    pub fn path(data_dir: &Path) -> std::path::PathBuf {
        data_dir.join("config.toml")
    }

    /// Loads config from a TOML file. Returns default config if file doesn't exist.
    pub fn load(path: &Path) -> Result<Self, AppConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), AppConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Returns an empty vec if config is valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.session.max_failed_attempts == 0 {
            errors.push("session.max_failed_attempts must be at least 1".to_string());
        }
        if !(1..=MAX_LOCKOUT_SECS).contains(&self.session.lockout_secs) {
            errors.push(format!(
                "session.lockout_secs must be between 1 and {MAX_LOCKOUT_SECS}"
            ));
        }
        if self.session.admin_username.trim().is_empty() {
            errors.push("session.admin_username must not be empty".to_string());
        }
        if let Some(hash) = &self.session.admin_password_blake3
            && blake3::Hash::from_hex(hash).is_err()
        {
            errors.push("session.admin_password_blake3 must be a 64-char hex digest".to_string());
        }

        if self.assets.max_width == 0 || self.assets.max_height == 0 {
            errors.push("assets.max_width and assets.max_height must be at least 1".to_string());
        }
        if !(self.assets.quality > 0.0 && self.assets.quality <= 1.0) {
            errors.push("assets.quality must be in (0, 1]".to_string());
        }
        if self.assets.image_max_mb == 0 {
            errors.push("assets.image_max_mb must be at least 1".to_string());
        }
        if self.assets.file_max_mb == 0 {
            errors.push("assets.file_max_mb must be at least 1".to_string());
        }
        if self.assets.capacity_mb == 0 {
            errors.push("assets.capacity_mb must be at least 1".to_string());
        }

        errors
    }

    /// Returns a validated config, replacing invalid values with defaults.
    pub fn with_defaults_for_invalid(&self) -> Self {
        let session_defaults = SessionSettings::default();
        let asset_defaults = AssetSettings::default();

        let nonzero_u32 = |value: u32, default: u32| if value == 0 { default } else { value };
        let nonzero_u64 = |value: u64, default: u64| if value == 0 { default } else { value };

        Self {
            session: SessionSettings {
                max_failed_attempts: nonzero_u32(
                    self.session.max_failed_attempts,
                    session_defaults.max_failed_attempts,
                ),
                lockout_secs: if (1..=MAX_LOCKOUT_SECS).contains(&self.session.lockout_secs) {
                    self.session.lockout_secs
                } else {
                    session_defaults.lockout_secs
                },
                admin_username: if self.session.admin_username.trim().is_empty() {
                    session_defaults.admin_username
                } else {
                    self.session.admin_username.clone()
                },
                admin_password_blake3: self
                    .session
                    .admin_password_blake3
                    .clone()
                    .filter(|hash| blake3::Hash::from_hex(hash).is_ok()),
            },
            assets: AssetSettings {
                max_width: nonzero_u32(self.assets.max_width, asset_defaults.max_width),
                max_height: nonzero_u32(self.assets.max_height, asset_defaults.max_height),
                quality: if self.assets.quality > 0.0 && self.assets.quality <= 1.0 {
                    self.assets.quality
                } else {
                    asset_defaults.quality
                },
                image_max_mb: nonzero_u64(self.assets.image_max_mb, asset_defaults.image_max_mb),
                file_max_mb: nonzero_u64(self.assets.file_max_mb, asset_defaults.file_max_mb),
                capacity_mb: nonzero_u64(self.assets.capacity_mb, asset_defaults.capacity_mb),
                purge_after_days: self.assets.purge_after_days,
            },
        }
    }
}

/// Admin login and lockout settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSettings {
    #[serde(default = "default_max_failed_attempts")]
    pub max_failed_attempts: u32,
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    /// Hex blake3 digest of the admin password.
    #[serde(default)]
    pub admin_password_blake3: Option<String>,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_failed_attempts: default_max_failed_attempts(),
            lockout_secs: default_lockout_secs(),
            admin_username: default_admin_username(),
            admin_password_blake3: None,
        }
    }
}

fn default_max_failed_attempts() -> u32 {
    5
}

fn default_lockout_secs() -> u64 {
    20
}

fn default_admin_username() -> String {
    "admin".to_string()
}

/// Upload optimization and storage settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetSettings {
    #[serde(default = "default_max_width")]
    pub max_width: u32,
    #[serde(default = "default_max_height")]
    pub max_height: u32,
    #[serde(default = "default_quality")]
    pub quality: f32,
    #[serde(default = "default_image_max_mb")]
    pub image_max_mb: u64,
    #[serde(default = "default_file_max_mb")]
    pub file_max_mb: u64,
    #[serde(default = "default_capacity_mb")]
    pub capacity_mb: u64,
    #[serde(default = "default_purge_after_days")]
    pub purge_after_days: u32,
}

impl Default for AssetSettings {
    fn default() -> Self {
        Self {
            max_width: default_max_width(),
            max_height: default_max_height(),
            quality: default_quality(),
            image_max_mb: default_image_max_mb(),
            file_max_mb: default_file_max_mb(),
            capacity_mb: default_capacity_mb(),
            purge_after_days: default_purge_after_days(),
        }
    }
}

impl AssetSettings {
    pub fn image_max_bytes(&self) -> u64 {
        self.image_max_mb.saturating_mul(MIB)
    }

    pub fn file_max_bytes(&self) -> u64 {
        self.file_max_mb.saturating_mul(MIB)
    }

    pub fn capacity_bytes(&self) -> u64 {
        self.capacity_mb.saturating_mul(MIB)
    }
}

fn default_max_width() -> u32 {
    1920
}

fn default_max_height() -> u32 {
    1080
}

fn default_quality() -> f32 {
    0.8
}

fn default_image_max_mb() -> u64 {
    2
}

fn default_file_max_mb() -> u64 {
    10
}

fn default_capacity_mb() -> u64 {
    10
}

fn default_purge_after_days() -> u32 {
    30
}

/// Errors that can occur when loading or saving config.
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}
