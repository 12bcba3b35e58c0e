use nutype::nutype;
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

pub const MAX_ASSET_ID_LENGTH: usize = 64;

const SUFFIX_LEN: usize = 9;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Identifier of a stored asset.
///
/// Generated ids look like `{unix_millis}_{9 base36 chars}`. Uniqueness is
/// probabilistic, not guaranteed.
#[nutype(
    new_unchecked,
    sanitize(trim),
    validate(not_empty, len_char_max = MAX_ASSET_ID_LENGTH),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        AsRef,
        Deref,
        TryFrom,
        Into,
        Hash,
        Borrow,
        Display,
        Serialize,
        Deserialize,
    )
)]
pub struct AssetId(String);

impl AssetId {
    pub fn generate(now: SystemTime) -> Self {
        let millis = now
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();

        let mut rng = rand::rng();
        let suffix: String = (0..SUFFIX_LEN)
            .map(|_| char::from(BASE36[rng.random_range(0..BASE36.len())]))
            .collect();

        // SAFETY: a decimal timestamp plus a fixed-length suffix is never empty and
        // stays well below MAX_ASSET_ID_LENGTH.
        unsafe { Self::new_unchecked(format!("{millis}_{suffix}")) }
    }
}
