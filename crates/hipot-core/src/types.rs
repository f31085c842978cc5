//! Work order, serial entry and audit record types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of a single electrical test
///
/// Travels on the wire as `"P"`, `"F"` or `"NA"`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TestOutcome {
    #[serde(rename = "P")]
    Pass,
    #[serde(rename = "F")]
    Fail,
    #[default]
    #[serde(rename = "NA")]
    NotApplicable,
}

impl TestOutcome {
    pub fn is_pass(self) -> bool {
        matches!(self, TestOutcome::Pass)
    }

    /// Text printed in the certificate results column
    pub fn label(self) -> &'static str {
        match self {
            TestOutcome::Pass => "PASS",
            TestOutcome::Fail => "FAIL",
            TestOutcome::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for TestOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Power supply under test; every unit carries two
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PowerSupply {
    Ps1,
    Ps2,
}

impl PowerSupply {
    pub const ALL: [PowerSupply; 2] = [PowerSupply::Ps1, PowerSupply::Ps2];

    pub fn label(self) -> &'static str {
        match self {
            PowerSupply::Ps1 => "PS1",
            PowerSupply::Ps2 => "PS2",
        }
    }
}

/// Tests printed on the certificate for each power supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TestKind {
    HiPot,
    GroundBond,
}

impl TestKind {
    pub const CERTIFIED: [TestKind; 2] = [TestKind::HiPot, TestKind::GroundBond];

    pub fn label(self) -> &'static str {
        match self {
            TestKind::HiPot => "Hi-Pot",
            TestKind::GroundBond => "Ground Bond",
        }
    }
}

/// Outcomes recorded for one power supply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerSupplyResults {
    /// Hi-Pot (dielectric withstand)
    #[serde(default)]
    pub hp: TestOutcome,
    /// Ground-Bond
    #[serde(default)]
    pub gb: TestOutcome,
    /// Functional check after the electrical tests
    #[serde(default)]
    pub operational: TestOutcome,
}

impl PowerSupplyResults {
    /// Same outcome for every test
    pub fn uniform(outcome: TestOutcome) -> Self {
        Self {
            hp: outcome,
            gb: outcome,
            operational: outcome,
        }
    }

    pub fn outcome(&self, kind: TestKind) -> TestOutcome {
        match kind {
            TestKind::HiPot => self.hp,
            TestKind::GroundBond => self.gb,
        }
    }
}

/// Per-unit results grouped by power supply
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResults {
    #[serde(default)]
    pub ps1: PowerSupplyResults,
    #[serde(default)]
    pub ps2: PowerSupplyResults,
}

impl TestResults {
    pub fn all_pass() -> Self {
        Self {
            ps1: PowerSupplyResults::uniform(TestOutcome::Pass),
            ps2: PowerSupplyResults::uniform(TestOutcome::Pass),
        }
    }

    pub fn supply(&self, supply: PowerSupply) -> &PowerSupplyResults {
        match supply {
            PowerSupply::Ps1 => &self.ps1,
            PowerSupply::Ps2 => &self.ps2,
        }
    }
}

/// One physical unit tested within a work order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SerialEntry {
    pub serial_number: String,
    #[serde(default)]
    pub test_results: TestResults,
}

impl SerialEntry {
    pub fn new(serial_number: impl Into<String>, test_results: TestResults) -> Self {
        Self {
            serial_number: serial_number.into(),
            test_results,
        }
    }
}

/// A validated batch of units tested together
///
/// Only ever built by the validator or by tests; never persisted whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrder {
    pub work_order_number: String,
    pub operator: String,
    pub test_date: NaiveDate,
    #[serde(default)]
    pub part_number: String,
    #[serde(default)]
    pub test_voltage: String,
    pub serial_entries: Vec<SerialEntry>,
}

impl WorkOrder {
    /// Test date as stored in audit records (`YYYY-MM-DD`)
    pub fn test_date_iso(&self) -> String {
        self.test_date.format("%Y-%m-%d").to_string()
    }

    /// Test date as printed on the certificate (`MM/DD/YYYY`)
    pub fn test_date_printed(&self) -> String {
        self.test_date.format("%m/%d/%Y").to_string()
    }
}

/// Work order submission exactly as received
///
/// Every field is optional so that absence can be reported as a
/// validation error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkOrderPayload {
    #[serde(default)]
    pub work_order_number: Option<String>,
    #[serde(default)]
    pub operator: Option<String>,
    #[serde(default)]
    pub test_date: Option<String>,
    #[serde(default)]
    pub part_number: Option<String>,
    #[serde(default)]
    pub test_voltage: Option<String>,
    /// Kept loosely typed until validation so a non-list can be reported
    #[serde(default)]
    pub serial_entries: Option<serde_json::Value>,
    /// Rendered certificate as a data URL
    #[serde(default)]
    pub pdf_data: Option<String>,
}

/// A work order plus its rendered certificate, accepted for storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub work_order: WorkOrder,
    pub pdf_data: String,
}

impl ValidatedSubmission {
    /// One record per serial entry, sharing every other field
    pub fn fan_out(&self) -> Vec<NewAuditRecord> {
        let test_date = self.work_order.test_date_iso();
        self.work_order
            .serial_entries
            .iter()
            .map(|entry| NewAuditRecord {
                work_order_number: self.work_order.work_order_number.clone(),
                operator: self.work_order.operator.clone(),
                test_date: test_date.clone(),
                serial_number: entry.serial_number.clone(),
                pdf_data: self.pdf_data.clone(),
            })
            .collect()
    }
}

/// A record about to be written; id and timestamp are assigned by the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAuditRecord {
    pub work_order_number: String,
    pub operator: String,
    pub test_date: String,
    pub serial_number: String,
    pub pdf_data: String,
}

impl NewAuditRecord {
    pub fn into_record(self, id: i64, created_at: DateTime<Utc>) -> AuditRecord {
        AuditRecord {
            id,
            work_order_number: self.work_order_number,
            operator: self.operator,
            test_date: self.test_date,
            serial_number: self.serial_number,
            pdf_data: self.pdf_data,
            created_at,
        }
    }
}

/// Persisted result for one tested unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub work_order_number: String,
    pub operator: String,
    pub test_date: String,
    pub serial_number: String,
    pub pdf_data: String,
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    /// Case-insensitive match on work order number, operator or serial number
    ///
    /// An empty query matches everything.
    pub fn matches_query(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [&self.work_order_number, &self.operator, &self.serial_number]
            .iter()
            .any(|field| field.to_lowercase().contains(&needle))
    }

    /// Listing view without the certificate body
    pub fn summary(&self) -> AuditSummary {
        AuditSummary {
            id: self.id,
            work_order_number: self.work_order_number.clone(),
            operator: self.operator.clone(),
            test_date: self.test_date.clone(),
            serial_number: self.serial_number.clone(),
            certificate_size: self.pdf_data.len(),
            created_at: self.created_at,
        }
    }
}

/// Audit record without the certificate body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditSummary {
    pub id: i64,
    pub work_order_number: String,
    pub operator: String,
    pub test_date: String,
    pub serial_number: String,
    /// Length in bytes of the stored certificate data URL
    pub certificate_size: usize,
    pub created_at: DateTime<Utc>,
}
