use serde::{Deserialize, Serialize};

use super::Address;

/// Outcome the external auditor assigned to a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FindingStatus {
    Matched,
    Mismatched,
    Unverifiable,
    #[default]
    Other,
}

impl From<String> for FindingStatus {
    fn from(s: String) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "matched" => Self::Matched,
            "mismatched" => Self::Mismatched,
            "unverifiable" => Self::Unverifiable,
            _ => Self::Other,
        }
    }
}

impl From<FindingStatus> for String {
    fn from(status: FindingStatus) -> Self {
        status.as_str().to_string()
    }
}

impl FindingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Mismatched => "mismatched",
            Self::Unverifiable => "unverifiable",
            Self::Other => "other",
        }
    }
}

/// A finding produced by the external audit step. Read-only to this crate.
///
/// Field aliases accept the audit backend's own result keys.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FindingRecord {
    pub id: String,
    #[serde(default, alias = "pdf_value")]
    pub display_value: String,
    #[serde(default, alias = "validation_status")]
    pub status: FindingStatus,
    #[serde(default, alias = "sheet_name")]
    pub sheet: String,
    #[serde(default, alias = "cell_reference")]
    pub raw_cell_ref: String,
    /// Pre-parsed cells; when empty they are parsed from `raw_cell_ref`.
    #[serde(default)]
    pub cells: Vec<Address>,
    #[serde(default)]
    pub confidence: Option<f64>,
    /// 1-based page of the paired document.
    #[serde(default, alias = "page_number")]
    pub page: Option<u32>,
    #[serde(default)]
    pub bounding_box: Option<[f64; 4]>,
    #[serde(default, alias = "audit_reasoning")]
    pub reasoning: Option<String>,
}

/// Aggregate counts over a findings list.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AuditSummary {
    pub total: usize,
    pub matched: usize,
    pub mismatched: usize,
    pub unverifiable: usize,
    pub other: usize,
    pub non_interactive: usize,
    /// Matched share of all findings, in percent.
    pub accuracy: f64,
}

impl AuditSummary {
    /// Count `findings`; `non_interactive` is supplied by the caller because it
    /// depends on the loaded sheet metadata.
    pub fn tally<'a>(
        findings: impl IntoIterator<Item = &'a FindingRecord>,
        non_interactive: usize,
    ) -> Self {
        let mut summary = Self {
            non_interactive,
            ..Self::default()
        };
        for finding in findings {
            summary.total += 1;
            match finding.status {
                FindingStatus::Matched => summary.matched += 1,
                FindingStatus::Mismatched => summary.mismatched += 1,
                FindingStatus::Unverifiable => summary.unverifiable += 1,
                FindingStatus::Other => summary.other += 1,
            }
        }
        if summary.total > 0 {
            #[allow(clippy::cast_precision_loss)]
            {
                summary.accuracy = summary.matched as f64 / summary.total as f64 * 100.0;
            }
        }
        summary
    }
}
