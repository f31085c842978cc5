//! Ingestion validation
//!
//! Turns a loosely shaped [`WorkOrderPayload`] into a typed
//! [`ValidatedSubmission`]. Validation is all-or-nothing: either every check
//! passes and a complete submission is returned, or the first failing check
//! is reported and nothing else happens.
//!
//! Checks run in a fixed order:
//! 1. `workOrderNumber`, `operator`, `testDate` present and non-blank
//! 2. `testDate` is a calendar date
//! 3. `serialEntries` is a list with at least one non-blank serial number
//! 4. `pdfData` is present and, when given as a data URL, decodes to a PDF
//!
//! Serial number uniqueness within a submission is not checked.

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::blob::decode_data_url;
use crate::error::ValidationError;
use crate::types::{
    SerialEntry, TestResults, ValidatedSubmission, WorkOrder, WorkOrderPayload,
};

/// Serial entry as received; results are optional on the wire
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SerialEntryPayload {
    #[serde(default)]
    serial_number: Option<String>,
    #[serde(default)]
    test_results: Option<TestResults>,
}

/// Validate a full submission, certificate included
pub fn validate_submission(
    payload: WorkOrderPayload,
) -> Result<ValidatedSubmission, ValidationError> {
    let pdf_data = payload.pdf_data.clone();
    let work_order = validate_work_order(payload)?;
    let pdf_data = check_pdf_data(pdf_data)?;

    debug!(
        work_order = %work_order.work_order_number,
        serial_count = work_order.serial_entries.len(),
        pdf_data_len = pdf_data.len(),
        "Submission validated"
    );

    Ok(ValidatedSubmission {
        work_order,
        pdf_data,
    })
}

/// Validate the work order fields only
///
/// Used where no certificate is expected yet, e.g. before rendering one.
pub fn validate_work_order(payload: WorkOrderPayload) -> Result<WorkOrder, ValidationError> {
    let work_order_number = required(payload.work_order_number, "workOrderNumber")?;
    let operator = required(payload.operator, "operator")?;
    let raw_date = required(payload.test_date, "testDate")?;
    let test_date = parse_test_date(&raw_date)?;
    let serial_entries = parse_serial_entries(payload.serial_entries)?;

    Ok(WorkOrder {
        work_order_number,
        operator,
        test_date,
        part_number: optional(payload.part_number),
        test_voltage: optional(payload.test_voltage),
        serial_entries,
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, ValidationError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => {
            warn!(field = field, "Submission rejected: missing field");
            Err(ValidationError::MissingField(field))
        }
    }
}

fn optional(value: Option<String>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date part kept)
fn parse_test_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.date_naive()))
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

fn parse_serial_entries(
    value: Option<serde_json::Value>,
) -> Result<Vec<SerialEntry>, ValidationError> {
    let items = match value {
        None | Some(serde_json::Value::Null) => {
            return Err(ValidationError::EmptyList("serialEntries is missing".into()))
        }
        Some(serde_json::Value::Array(items)) => items,
        Some(_) => {
            return Err(ValidationError::EmptyList(
                "serialEntries must be a list".into(),
            ))
        }
    };

    let mut entries = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        let parsed: SerialEntryPayload = serde_json::from_value(item).map_err(|e| {
            ValidationError::MalformedEntry {
                index,
                reason: e.to_string(),
            }
        })?;

        let serial_number = parsed
            .serial_number
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if serial_number.is_empty() {
            debug!(index = index, "Skipping serial entry without a serial number");
            continue;
        }

        entries.push(SerialEntry {
            serial_number,
            test_results: parsed.test_results.unwrap_or_default(),
        });
    }

    if entries.is_empty() {
        warn!("Submission rejected: no serial entries");
        return Err(ValidationError::EmptyList(
            "at least one serial entry with a serial number is required".into(),
        ));
    }

    Ok(entries)
}

/// The stored value is returned untouched so every row keeps identical bytes
fn check_pdf_data(value: Option<String>) -> Result<String, ValidationError> {
    let pdf_data = match value {
        Some(v) if !v.trim().is_empty() => v,
        _ => {
            warn!("Submission rejected: missing certificate");
            return Err(ValidationError::BadPdfData(
                "certificate payload is missing".into(),
            ));
        }
    };

    if pdf_data.trim_start().starts_with("data:") {
        let decoded = decode_data_url(&pdf_data)
            .map_err(|e| ValidationError::BadPdfData(e.to_string()))?;
        if !decoded.is_pdf() {
            return Err(ValidationError::BadPdfData(format!(
                "unexpected media type '{}'",
                decoded.media_type
            )));
        }
        if decoded.bytes.is_empty() {
            return Err(ValidationError::BadPdfData("certificate is empty".into()));
        }
    }

    Ok(pdf_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TestOutcome;
    use serde_json::json;

    const PDF_URL: &str = "data:application/pdf;base64,JVBERi0xLjUK";

    fn payload(value: serde_json::Value) -> WorkOrderPayload {
        serde_json::from_value(value).unwrap()
    }

    fn valid_body() -> serde_json::Value {
        json!({
            "workOrderNumber": "WO-1001",
            "operator": "J.Smith",
            "testDate": "2024-05-01",
            "partNumber": "PN-77",
            "testVoltage": "240V",
            "serialEntries": [{"serialNumber": "SN-01"}, {"serialNumber": "SN-02"}],
            "pdfData": PDF_URL
        })
    }

    #[test]
    fn test_valid_submission() {
        let submission = validate_submission(payload(valid_body())).unwrap();
        assert_eq!(submission.work_order.work_order_number, "WO-1001");
        assert_eq!(submission.work_order.serial_entries.len(), 2);
        assert_eq!(submission.work_order.test_voltage, "240V");
        assert_eq!(submission.pdf_data, PDF_URL);
    }

    #[test]
    fn test_missing_operator() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("operator");
        assert_eq!(
            validate_submission(payload(body)),
            Err(ValidationError::MissingField("operator"))
        );
    }

    #[test]
    fn test_blank_work_order_number() {
        let mut body = valid_body();
        body["workOrderNumber"] = json!("   ");
        assert_eq!(
            validate_submission(payload(body)),
            Err(ValidationError::MissingField("workOrderNumber"))
        );
    }

    #[test]
    fn test_invalid_date() {
        let mut body = valid_body();
        body["testDate"] = json!("01/05/2024");
        assert_eq!(
            validate_submission(payload(body)),
            Err(ValidationError::InvalidDate("01/05/2024".into()))
        );
    }

    #[test]
    fn test_rfc3339_date_keeps_calendar_day() {
        let mut body = valid_body();
        body["testDate"] = json!("2024-05-01T08:30:00Z");
        let submission = validate_submission(payload(body)).unwrap();
        assert_eq!(submission.work_order.test_date_iso(), "2024-05-01");
    }

    #[test]
    fn test_serial_entries_shapes() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("serialEntries");
        assert!(matches!(
            validate_submission(payload(body)),
            Err(ValidationError::EmptyList(_))
        ));

        let mut body = valid_body();
        body["serialEntries"] = json!("SN-01");
        assert!(matches!(
            validate_submission(payload(body)),
            Err(ValidationError::EmptyList(_))
        ));

        let mut body = valid_body();
        body["serialEntries"] = json!([]);
        assert!(matches!(
            validate_submission(payload(body)),
            Err(ValidationError::EmptyList(_))
        ));
    }

    #[test]
    fn test_blank_serials_are_dropped() {
        let mut body = valid_body();
        body["serialEntries"] = json!([
            {"serialNumber": ""},
            {"serialNumber": "SN-09"},
            {"serialNumber": "  "}
        ]);
        let submission = validate_submission(payload(body)).unwrap();
        let serials: Vec<_> = submission
            .work_order
            .serial_entries
            .iter()
            .map(|e| e.serial_number.as_str())
            .collect();
        assert_eq!(serials, vec!["SN-09"]);
    }

    #[test]
    fn test_only_blank_serials_is_empty_list() {
        let mut body = valid_body();
        body["serialEntries"] = json!([{"serialNumber": ""}, {}]);
        assert!(matches!(
            validate_submission(payload(body)),
            Err(ValidationError::EmptyList(_))
        ));
    }

    #[test]
    fn test_malformed_entry_reports_index() {
        let mut body = valid_body();
        body["serialEntries"] = json!([
            {"serialNumber": "SN-01"},
            {"serialNumber": "SN-02", "testResults": {"ps1": {"hp": "maybe"}}}
        ]);
        assert!(matches!(
            validate_submission(payload(body)),
            Err(ValidationError::MalformedEntry { index: 1, .. })
        ));
    }

    #[test]
    fn test_results_are_carried() {
        let mut body = valid_body();
        body["serialEntries"] = json!([{
            "serialNumber": "SN-01",
            "testResults": {
                "ps1": {"hp": "P", "gb": "F", "operational": "P"},
                "ps2": {"hp": "NA", "gb": "P", "operational": "P"}
            }
        }]);
        let submission = validate_submission(payload(body)).unwrap();
        let results = submission.work_order.serial_entries[0].test_results;
        assert_eq!(results.ps1.gb, TestOutcome::Fail);
        assert_eq!(results.ps2.hp, TestOutcome::NotApplicable);
    }

    #[test]
    fn test_missing_pdf_data() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("pdfData");
        assert!(matches!(
            validate_submission(payload(body)),
            Err(ValidationError::BadPdfData(_))
        ));
    }

    #[test]
    fn test_bad_data_url() {
        let mut body = valid_body();
        body["pdfData"] = json!("data:application/pdf;base64,%%%");
        assert!(matches!(
            validate_submission(payload(body)),
            Err(ValidationError::BadPdfData(_))
        ));

        let mut body = valid_body();
        body["pdfData"] = json!("data:image/png;base64,aGk=");
        assert!(matches!(
            validate_submission(payload(body)),
            Err(ValidationError::BadPdfData(_))
        ));
    }

    #[test]
    fn test_opaque_certificate_is_accepted_verbatim() {
        let mut body = valid_body();
        body["pdfData"] = json!("<bytes>");
        let submission = validate_submission(payload(body)).unwrap();
        assert_eq!(submission.pdf_data, "<bytes>");
    }

    #[test]
    fn test_field_checks_precede_certificate_check() {
        let body = json!({"serialEntries": [{"serialNumber": "SN-01"}]});
        assert_eq!(
            validate_submission(payload(body)),
            Err(ValidationError::MissingField("workOrderNumber"))
        );
    }

    #[test]
    fn test_work_order_without_certificate() {
        let mut body = valid_body();
        body.as_object_mut().unwrap().remove("pdfData");
        let order = validate_work_order(payload(body)).unwrap();
        assert_eq!(order.part_number, "PN-77");
    }
}
