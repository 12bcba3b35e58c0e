//! Asset ingestion: optimize uploads, encode them as data URIs and keep them in
//! the [`KvStore`] under generated ids.
//!
//! Records are immutable. Content entities only hold an [`AssetId`], so removing
//! a news item or position never removes its image, and replacing an image
//! orphans the old record until a purge.

use crate::core::store::KvStore;
use crate::core::store::error::StoreError;
use crate::types::value::versioned_value::VersionedAssetRecord;
use crate::types::value::versioned_value::error::CodecError;
use crate::types::{AssetConfig, AssetId, AssetRecord, DecodedAsset};
use data_uri::error::DataUriError;
use error::AssetError;
use optimizer::AssetKind;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, info, instrument, warn};

pub mod data_uri;
pub mod optimizer;

pub mod error {
    use super::*;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum AssetError {
        #[error("Unsupported file type: {0}")]
        UnsupportedType(String),

        #[error("File too large: {size} bytes exceeds {max} bytes")]
        SizeLimitExceeded { size: u64, max: u64 },

        #[error("Storage quota exceeded: {requested} bytes requested, {quota} bytes allowed")]
        StorageQuotaExceeded { requested: u64, quota: u64 },

        #[error("Image error: {0}")]
        Image(#[from] image::ImageError),

        #[error("Resize error: {0}")]
        Resize(#[from] fast_image_resize::ResizeError),

        #[error("Stored data URI is unreadable: {0}")]
        DataUri(#[from] DataUriError),

        #[error("Stored asset record is unreadable: {0}")]
        Codec(#[from] CodecError),

        #[error("Persistence error: {0}")]
        Persistence(StoreError),
    }

    impl From<StoreError> for AssetError {
        fn from(err: StoreError) -> Self {
            match err {
                StoreError::QuotaExceeded { requested, quota } => {
                    AssetError::StorageQuotaExceeded { requested, quota }
                }
                other => AssetError::Persistence(other),
            }
        }
    }
}

pub const ASSET_KEY_PREFIX: &str = "asset/";

const SECS_PER_DAY: u64 = 24 * 60 * 60;

fn asset_key(id: &AssetId) -> String {
    format!("{ASSET_KEY_PREFIX}{id}")
}

/// A user-supplied upload.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// What a successful [`AssetStore::store_with_report`] did to the upload.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestReport {
    pub id: AssetId,
    pub original_size: u64,
    pub optimized_size: u64,
    /// `optimized_size / original_size` in percent; 100 when untouched.
    pub compression_ratio: f64,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageUsage {
    pub used_bytes: u64,
    pub total_capacity_bytes: u64,
}

#[derive(Debug, Default)]
pub struct PurgeOutcome {
    pub removed: Vec<AssetId>,
}

pub struct AssetStore<S: KvStore> {
    store: Arc<S>,
    config: AssetConfig,
}

impl<S: KvStore> AssetStore<S> {
    pub fn new(store: Arc<S>, config: AssetConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &AssetConfig {
        &self.config
    }
}

/// Pre-checks, callable before reading the whole upload.
impl<S: KvStore> AssetStore<S> {
    /// Rejects what `store` would reject from the declared type and size alone:
    /// unsupported image types and plain files over the ceiling.
    pub fn precheck(&self, mime_type: &str, size: u64) -> Result<(), AssetError> {
        match optimizer::classify(mime_type)? {
            AssetKind::Image(_) => Ok(()),
            AssetKind::File => self.check_file_size(size),
        }
    }

    /// `true` if the upload is over its category ceiling (images: 2 MiB,
    /// files: 10 MiB by default).
    pub fn needs_optimization(&self, mime_type: &str, size: u64) -> bool {
        let ceiling = if optimizer::is_image_type(mime_type) {
            self.config.image_max_bytes
        } else {
            self.config.file_max_bytes
        };
        size > ceiling
    }

    fn check_file_size(&self, size: u64) -> Result<(), AssetError> {
        if size > self.config.file_max_bytes {
            return Err(AssetError::SizeLimitExceeded {
                size,
                max: self.config.file_max_bytes,
            });
        }
        Ok(())
    }
}

/// Ingestion.
impl<S: KvStore> AssetStore<S> {
    pub fn store(&self, file: IncomingFile, now: SystemTime) -> Result<AssetId, AssetError> {
        Ok(self.store_with_report(file, now)?.id)
    }

    /// Nothing is written unless every step succeeds.
    #[instrument(skip(self, file), fields(name = %file.name, mime_type = %file.mime_type, size = file.bytes.len()))]
    pub fn store_with_report(
        &self,
        file: IncomingFile,
        now: SystemTime,
    ) -> Result<IngestReport, AssetError> {
        let IncomingFile {
            name,
            mime_type,
            bytes,
        } = file;
        let original_size = bytes.len() as u64;

        let (payload, dimensions) = match optimizer::classify(&mime_type)? {
            AssetKind::Image(kind) => {
                let optimized = optimizer::optimize_image(&bytes, kind, &self.config)?;
                if optimized.bytes.len() as u64 > self.config.image_max_bytes {
                    warn!(
                        optimized_size = optimized.bytes.len(),
                        ceiling = self.config.image_max_bytes,
                        "image still over ceiling after optimization"
                    );
                }
                (optimized.bytes, Some((optimized.width, optimized.height)))
            }
            AssetKind::File => {
                self.check_file_size(original_size)?;
                (bytes, None)
            }
        };

        let optimized_size = payload.len() as u64;
        let compression_ratio = if original_size == 0 {
            100.0
        } else {
            optimized_size as f64 / original_size as f64 * 100.0
        };

        let record = AssetRecord {
            id: AssetId::generate(now),
            encoded_data: data_uri::encode(&mime_type, &payload),
            original_name: name,
            mime_type,
            created_at: now,
            width: dimensions.map(|(w, _)| w),
            height: dimensions.map(|(_, h)| h),
        };

        let bytes = VersionedAssetRecord::V1(record.clone()).to_bytes()?;
        self.store.put(&asset_key(&record.id), &bytes)?;

        info!(
            id = %record.id,
            original_size,
            optimized_size,
            compression_ratio,
            "asset stored"
        );

        Ok(IngestReport {
            id: record.id,
            original_size,
            optimized_size,
            compression_ratio,
            width: record.width,
            height: record.height,
        })
    }
}

/// Read operations.
impl<S: KvStore> AssetStore<S> {
    pub fn get(&self, id: &AssetId) -> Result<Option<AssetRecord>, AssetError> {
        let Some(bytes) = self.store.get(&asset_key(id))? else {
            return Ok(None);
        };
        Ok(Some(VersionedAssetRecord::from_bytes(&bytes)?.into_latest()))
    }

    /// The stored data URI, ready to use as a display source.
    pub fn resolve(&self, id: &AssetId) -> Result<Option<String>, AssetError> {
        Ok(self.get(id)?.map(|record| record.encoded_data))
    }

    /// Decodes the stored payload back into bytes.
    pub fn read(&self, id: &AssetId) -> Result<Option<DecodedAsset>, AssetError> {
        let Some(record) = self.get(id)? else {
            return Ok(None);
        };

        let (_, bytes) = data_uri::decode(&record.encoded_data)?;
        Ok(Some(DecodedAsset {
            name: record.original_name,
            mime_type: record.mime_type,
            bytes,
        }))
    }

    /// Stored pixel size. `None` for missing ids and non-image assets.
    pub fn dimensions(&self, id: &AssetId) -> Result<Option<(u32, u32)>, AssetError> {
        Ok(self
            .get(id)?
            .and_then(|record| record.width.zip(record.height)))
    }

    /// All records, newest first. Unreadable records are skipped.
    pub fn list_all(&self) -> Result<Vec<AssetRecord>, AssetError> {
        let mut records = Vec::new();

        for key in self.store.keys_with_prefix(ASSET_KEY_PREFIX)? {
            let Some(bytes) = self.store.get(&key)? else {
                continue;
            };
            match VersionedAssetRecord::from_bytes(&bytes) {
                Ok(record) => records.push(record.into_latest()),
                Err(err) => warn!(key = %key, error = %err, "skipping unreadable asset record"),
            }
        }

        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(records)
    }

    /// Approximate footprint: two bytes per UTF-16 code unit of every stored
    /// record's text fields, against the configured capacity.
    pub fn usage(&self) -> Result<StorageUsage, AssetError> {
        let utf16_len = |s: &str| s.encode_utf16().count() as u64;
        let used_bytes = self
            .list_all()?
            .iter()
            .map(|record| {
                let units = utf16_len(record.id.as_str())
                    + utf16_len(&record.original_name)
                    + utf16_len(&record.mime_type)
                    + utf16_len(&record.encoded_data);
                units * 2
            })
            .sum();

        Ok(StorageUsage {
            used_bytes,
            total_capacity_bytes: self.config.capacity_bytes,
        })
    }
}

/// Delete operations.
impl<S: KvStore> AssetStore<S> {
    /// Returns `true` if the asset existed.
    #[instrument(skip(self))]
    pub fn remove(&self, id: &AssetId) -> Result<bool, AssetError> {
        let existed = self.store.delete(&asset_key(id))?;
        debug!(existed, "asset removed");
        Ok(existed)
    }

    /// Removes every asset at least `max_age` old. A zero age removes
    /// everything; `Duration::MAX` removes nothing.
    ///
    /// Removals are independent: an error part way leaves earlier removals in
    /// place.
    #[instrument(skip(self))]
    pub fn purge_older_than(
        &self,
        max_age: Duration,
        now: SystemTime,
    ) -> Result<PurgeOutcome, AssetError> {
        let mut outcome = PurgeOutcome::default();

        for record in self.list_all()? {
            let age = now.duration_since(record.created_at).unwrap_or_default();
            if age >= max_age && self.store.delete(&asset_key(&record.id))? {
                outcome.removed.push(record.id);
            }
        }

        info!(removed = outcome.removed.len(), "asset purge finished");
        Ok(outcome)
    }

    pub fn purge_older_than_days(
        &self,
        days: u32,
        now: SystemTime,
    ) -> Result<PurgeOutcome, AssetError> {
        self.purge_older_than(Duration::from_secs(u64::from(days) * SECS_PER_DAY), now)
    }
}
