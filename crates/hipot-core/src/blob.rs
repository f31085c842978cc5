//! Certificate data URLs
//!
//! Certificates are exchanged and stored as RFC 2397 data URLs, the same
//! form browsers produce, e.g.
//! `data:application/pdf;filename=generated.pdf;base64,JVBERi0xLjUK...`.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::error::BlobError;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A decoded data URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    /// Media type, lowercased (`text/plain` when omitted)
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }
}

/// Encode PDF bytes as a base64 data URL
pub fn encode_data_url(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", PDF_MEDIA_TYPE, STANDARD.encode(bytes))
}

/// Decode a base64 data URL
///
/// Parameters between the media type and `base64` (such as `filename=`)
/// are ignored.
pub fn decode_data_url(url: &str) -> Result<DataUrl, BlobError> {
    let rest = url.trim().strip_prefix("data:").ok_or(BlobError::NotDataUrl)?;
    let (meta, payload) = rest.split_once(',').ok_or(BlobError::NotDataUrl)?;

    let mut params = meta.split(';');
    let media_type = match params.next().map(str::trim) {
        Some(m) if !m.is_empty() => m.to_ascii_lowercase(),
        _ => "text/plain".to_string(),
    };

    if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
        return Err(BlobError::NotBase64);
    }

    let bytes = STANDARD.decode(payload.trim())?;
    Ok(DataUrl { media_type, bytes })
}
