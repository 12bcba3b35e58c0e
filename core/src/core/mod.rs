//! Core state combining the admin session guard and the asset store over one
//! on-disk key-value store.

use crate::core::assets::AssetStore;
use crate::core::assets::error::AssetError;
use crate::core::assets::IncomingFile;
use crate::core::session::SessionGuard;
use crate::core::session::credentials::error::CredentialsError;
use crate::core::session::credentials::{CredentialVerifier, StaticCredentials};
use crate::core::session::error::SessionError;
use crate::core::store::RedbStore;
use crate::core::store::error::StoreError;
use crate::types::{AppConfig, AppConfigError, AssetConfig, AssetId, Config, SessionConfig};
use error::SchoolError;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{info, warn};

pub mod assets;
pub mod session;
pub mod store;

pub mod error {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum SchoolError {
        #[error("Store error: {0}")]
        Store(#[from] StoreError),

        #[error("Session error: {0}")]
        Session(#[from] SessionError),

        #[error("Asset error: {0}")]
        Asset(#[from] AssetError),

        #[error("Credentials error: {0}")]
        Credentials(#[from] CredentialsError),

        #[error("Config error: {0}")]
        Config(#[from] AppConfigError),
    }
}

pub struct SchoolCore {
    base_path: PathBuf,
    app_config: AppConfig,
    session: SessionGuard<RedbStore>,
    assets: AssetStore<RedbStore>,
}

#[derive(Debug, Default)]
pub struct MaintenanceOutcome {
    pub lockout_expired: bool,
    pub assets_purged: Vec<AssetId>,
}

impl SchoolCore {
    /// Opens the store under `config.base_path` with an explicit verifier.
    ///
    /// The store quota is the configured asset capacity.
    pub fn open(
        config: Config,
        app_config: AppConfig,
        verifier: Box<dyn CredentialVerifier>,
        now: SystemTime,
    ) -> Result<Self, SchoolError> {
        let asset_config = AssetConfig::from(&app_config.assets);
        let store = Arc::new(RedbStore::open(
            &config.db_path(),
            Some(asset_config.capacity_bytes),
        )?);

        let session = SessionGuard::open(
            store.clone(),
            verifier,
            SessionConfig::from(&app_config.session),
            now,
        )?;
        let assets = AssetStore::new(store, asset_config);

        info!(base_path = %config.base_path.display(), "school core opened");

        Ok(Self {
            base_path: config.base_path,
            app_config,
            session,
            assets,
        })
    }

    /// Loads `config.toml` from the data directory (defaults when missing) and
    /// checks logins against the admin identity configured there.
    pub fn open_with_settings(config: Config, now: SystemTime) -> Result<Self, SchoolError> {
        let loaded = AppConfig::load(&config.app_config_path())?;

        let problems = loaded.validate();
        let app_config = if problems.is_empty() {
            loaded
        } else {
            for problem in &problems {
                warn!(problem = %problem, "invalid config value, using default");
            }
            loaded.with_defaults_for_invalid()
        };

        let verifier = StaticCredentials::from_settings(&app_config.session)?;
        Self::open(config, app_config, Box::new(verifier), now)
    }

    pub fn data_dir(&self) -> &Path {
        &self.base_path
    }

    pub fn app_config(&self) -> &AppConfig {
        &self.app_config
    }

    pub fn session(&self) -> &SessionGuard<RedbStore> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut SessionGuard<RedbStore> {
        &mut self.session
    }

    pub fn assets(&self) -> &AssetStore<RedbStore> {
        &self.assets
    }
}

/// Admin-gated operations.
impl SchoolCore {
    /// Stores an upload on behalf of a content editor. Requires an open admin
    /// session.
    pub fn store_asset_as_admin(
        &self,
        file: IncomingFile,
        now: SystemTime,
    ) -> Result<AssetId, SchoolError> {
        self.session.authorize()?;
        Ok(self.assets.store(file, now)?)
    }

    /// Requires an open admin session.
    pub fn remove_asset_as_admin(&self, id: &AssetId) -> Result<bool, SchoolError> {
        self.session.authorize()?;
        Ok(self.assets.remove(id)?)
    }
}

/// Maintenance operations.
impl SchoolCore {
    /// Ends an elapsed lockout and purges assets older than
    /// `assets.purge_after_days`. A retention of 0 days disables the purge.
    pub fn maintenance(&mut self, now: SystemTime) -> Result<MaintenanceOutcome, SchoolError> {
        let lockout_expired = self.session.tick(now)?;

        let retention_days = self.app_config.assets.purge_after_days;
        let assets_purged = if retention_days == 0 {
            Vec::new()
        } else {
            self.assets.purge_older_than_days(retention_days, now)?.removed
        };

        Ok(MaintenanceOutcome {
            lockout_expired,
            assets_purged,
        })
    }
}
