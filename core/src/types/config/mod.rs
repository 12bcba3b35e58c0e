mod app;
mod core;
mod runtime;

pub use app::{AppConfig, AppConfigError, AssetSettings, MAX_LOCKOUT_SECS, SessionSettings};
pub use self::core::Config;
pub use runtime::{AssetConfig, SessionConfig};
