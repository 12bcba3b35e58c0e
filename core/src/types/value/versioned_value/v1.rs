use serde::{Deserialize, Serialize};
use std::time::SystemTime;

use super::ValueVariant;
use crate::types::AssetId;

#[cfg_attr(test, derive(Eq, PartialEq))]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionState {
    pub authenticated: bool,
    pub failed_attempts: u32,
    pub lockout_until: Option<SystemTime>,
    pub last_login_at: Option<SystemTime>,
}

impl ValueVariant for SessionState {
    const VERSION: u8 = 1;
}

#[cfg_attr(test, derive(Eq, PartialEq))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRecord {
    pub id: AssetId,
    pub original_name: String,
    pub mime_type: String,
    /// `data:{mime};base64,{payload}`
    pub encoded_data: String,
    pub created_at: SystemTime,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ValueVariant for AssetRecord {
    const VERSION: u8 = 1;
}
