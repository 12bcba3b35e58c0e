use base64::Engine;
use base64::engine::general_purpose::STANDARD;

pub mod error {
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum DataUriError {
        #[error("Not a base64 data URI")]
        Malformed,

        #[error("Base64 error: {0}")]
        Base64(#[from] base64::DecodeError),
    }
}

use error::DataUriError;

pub(crate) const FALLBACK_MIME: &str = "application/octet-stream";

/// `data:{mime};base64,{payload}`, usable directly as a display source.
pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
    let mime_type = if mime_type.is_empty() {
        FALLBACK_MIME
    } else {
        mime_type
    };
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// Returns the embedded MIME type and the decoded payload.
pub fn decode(uri: &str) -> Result<(String, Vec<u8>), DataUriError> {
    let rest = uri.strip_prefix("data:").ok_or(DataUriError::Malformed)?;
    // base64 never contains ',', so the last comma ends the header
    let (header, payload) = rest.rsplit_once(',').ok_or(DataUriError::Malformed)?;
    let mime_type = header
        .strip_suffix(";base64")
        .ok_or(DataUriError::Malformed)?;

    Ok((mime_type.to_string(), STANDARD.decode(payload)?))
}
