//! Error types for the Hi-Pot core

use thiserror::Error;

/// Reasons a submitted work order is rejected before anything is stored
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required scalar field is absent or blank
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// `serialEntries` is absent, not a list, or has no usable serial number
    #[error("Invalid serial entries: {0}")]
    EmptyList(String),

    /// A serial entry could not be read
    #[error("Malformed serial entry at index {index}: {reason}")]
    MalformedEntry { index: usize, reason: String },

    /// The certificate payload is absent or not a decodable PDF data URL
    #[error("Invalid certificate data: {0}")]
    BadPdfData(String),

    /// `testDate` is present but is not a calendar date
    #[error("Invalid test date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
}

impl ValidationError {
    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "MISSING_FIELD",
            ValidationError::EmptyList(_) => "EMPTY_LIST",
            ValidationError::MalformedEntry { .. } => "MALFORMED_ENTRY",
            ValidationError::BadPdfData(_) => "BAD_PDF_DATA",
            ValidationError::InvalidDate(_) => "INVALID_DATE",
        }
    }
}

/// Errors raised while producing certificate bytes
#[derive(Error, Debug)]
pub enum RenderError {
    /// Content stream encoding failed
    #[error("PDF content encoding failed: {0}")]
    Encoding(String),

    /// Writing the document into the output buffer failed
    #[error("PDF serialization failed: {0}")]
    Io(#[from] std::io::Error),
}

impl From<lopdf::Error> for RenderError {
    fn from(err: lopdf::Error) -> Self {
        RenderError::Encoding(err.to_string())
    }
}

/// Errors decoding a certificate data URL
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BlobError {
    #[error("Not a data URL")]
    NotDataUrl,

    #[error("Data URL is not base64 encoded")]
    NotBase64,

    #[error("Invalid base64 payload: {0}")]
    Decode(String),
}

impl From<base64::DecodeError> for BlobError {
    fn from(err: base64::DecodeError) -> Self {
        BlobError::Decode(err.to_string())
    }
}
