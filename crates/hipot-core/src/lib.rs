//! # Hi-Pot Core
//!
//! Domain types and pure logic for Hi-Pot / Ground-Bond test logging.
//!
//! ## Key Concepts
//!
//! - **Work Order**: a batch of units tested together under one number
//! - **Serial Entry**: one tested unit with its per power-supply outcomes
//! - **Certificate**: the single-page PDF rendered for a work order
//! - **Audit Record**: one persisted row per tested serial number
//!
//! ## Pipeline
//!
//! 1. A raw [`WorkOrderPayload`] is checked by [`validate_submission`]
//! 2. The resulting [`ValidatedSubmission`] fans out into one
//!    [`NewAuditRecord`] per serial entry
//! 3. Certificates are produced by [`render_certificate`] from a [`WorkOrder`]
//!    and travel as `data:application/pdf;base64,` URLs (see [`blob`])

pub mod blob;
pub mod certificate;
pub mod error;
pub mod layout;
pub mod types;
pub mod validation;

pub use blob::{decode_data_url, encode_data_url, DataUrl, PDF_MEDIA_TYPE};
pub use certificate::{render_certificate, render_layout, Certificate};
pub use error::{BlobError, RenderError, ValidationError};
pub use layout::{layout_certificate, CertificateLayout, Ink, TableRow, TextRun};
pub use types::{
    AuditRecord, AuditSummary, NewAuditRecord, PowerSupply, PowerSupplyResults, SerialEntry,
    TestKind, TestOutcome, TestResults, ValidatedSubmission, WorkOrder, WorkOrderPayload,
};
pub use validation::{validate_submission, validate_work_order};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
