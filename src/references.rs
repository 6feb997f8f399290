//! Parsing cell references attached to audit findings.
//!
//! Findings name their cells as `!`-joined addresses (`"O10!B5!C3"`). The
//! audit backend also emits sheet-qualified single references
//! (`"Sheet1!B5"`), so a leading token that names a known sheet is treated as
//! a qualifier rather than a cell.
//!
//! Malformed tokens are dropped, never raised. A finding is only interactive
//! when its sheet is known and every token is a valid address.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::cell_ref::parse_address;
use crate::types::{find_sheet, Address, FindingRecord, HighlightSpec, SheetMeta};

/// Default separator between addresses in a multi-cell reference.
pub const REFERENCE_DELIMITER: char = '!';

/// Why a finding cannot be highlighted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Reason {
    /// The finding's sheet is not in the loaded metadata.
    UnknownSheet(String),
    /// A token of the reference is not a valid address.
    MalformedCell(String),
    /// The reference names no cells at all.
    NoCells,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownSheet(name) if name.is_empty() => f.write_str("no sheet given"),
            Self::UnknownSheet(name) => write!(f, "unknown sheet '{name}'"),
            Self::MalformedCell(token) => write!(f, "malformed cell '{token}'"),
            Self::NoCells => f.write_str("no cell reference"),
        }
    }
}

/// Result of checking a finding against the loaded sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Eligibility {
    /// Highlightable on `sheet` (canonical metadata casing) at `cells`.
    Interactive { sheet: String, cells: Vec<Address> },
    /// Listed but not clickable.
    NonInteractive { reason: Reason },
}

impl Eligibility {
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive { .. })
    }

    pub fn reason(&self) -> Option<&Reason> {
        match self {
            Self::Interactive { .. } => None,
            Self::NonInteractive { reason } => Some(reason),
        }
    }
}

fn tokens(raw: &str, delimiter: char) -> impl Iterator<Item = &str> {
    raw.split(delimiter).map(str::trim).filter(|t| !t.is_empty())
}

/// Split on `delimiter`, keep only tokens that are valid addresses, in order.
pub fn parse_multi_cell_with(raw: &str, delimiter: char) -> Vec<Address> {
    tokens(raw, delimiter)
        .filter_map(|token| {
            let addr = parse_address(token);
            if addr.is_none() {
                debug!(token, reference = raw, "dropping malformed cell token");
            }
            addr
        })
        .collect()
}

/// [`parse_multi_cell_with`] using the `!` delimiter.
pub fn parse_multi_cell(raw: &str) -> Vec<Address> {
    parse_multi_cell_with(raw, REFERENCE_DELIMITER)
}

/// Case-insensitive membership of `name` in the sheet list.
pub fn is_known_sheet(name: &str, sheets: &[SheetMeta]) -> bool {
    find_sheet(sheets, name).is_some()
}

/// Strip a leading sheet qualifier.
///
/// Returns the canonical sheet name when the first token names a known sheet,
/// and the remainder of the reference.
pub fn split_qualified<'a>(raw: &'a str, sheets: &[SheetMeta]) -> (Option<String>, &'a str) {
    if let Some((head, rest)) = raw.split_once(REFERENCE_DELIMITER) {
        if let Some((_, sheet)) = find_sheet(sheets, head) {
            return (Some(sheet.name.clone()), rest);
        }
    }
    (None, raw)
}

/// Every token of `reference` as an address, or the first malformed token.
fn parse_strict(reference: &str) -> Result<Vec<Address>, String> {
    tokens(reference, REFERENCE_DELIMITER)
        .map(|token| parse_address(token).ok_or_else(|| token.to_string()))
        .collect()
}

/// Decide whether `finding` can be highlighted against `sheets`.
///
/// Pre-parsed `cells` win over the raw reference, but both must be valid: a
/// zero row or column in `cells`, or any malformed token in the raw
/// reference, makes the finding non-interactive.
pub fn classify(finding: &FindingRecord, sheets: &[SheetMeta]) -> Eligibility {
    let (qualifier, reference) = split_qualified(&finding.raw_cell_ref, sheets);

    let sheet_name = if finding.sheet.trim().is_empty() {
        qualifier.unwrap_or_default()
    } else {
        let explicit = finding.sheet.trim();
        if let Some(dropped) = qualifier.filter(|q| !q.eq_ignore_ascii_case(explicit)) {
            debug!(
                finding = %finding.id,
                sheet = %finding.sheet,
                qualifier = %dropped,
                "explicit sheet overrides reference qualifier"
            );
        }
        finding.sheet.clone()
    };
    let Some((_, sheet)) = find_sheet(sheets, &sheet_name) else {
        return Eligibility::NonInteractive {
            reason: Reason::UnknownSheet(sheet_name),
        };
    };

    let parsed = match parse_strict(reference) {
        Ok(parsed) => parsed,
        Err(token) => {
            return Eligibility::NonInteractive {
                reason: Reason::MalformedCell(token),
            }
        }
    };

    let cells = if finding.cells.is_empty() {
        parsed
    } else {
        if let Some(bad) = finding.cells.iter().find(|c| !c.is_valid()) {
            return Eligibility::NonInteractive {
                reason: Reason::MalformedCell(format!("row {} col {}", bad.row, bad.col)),
            };
        }
        if !parsed.is_empty() && parsed != finding.cells {
            debug!(
                finding = %finding.id,
                reference = %finding.raw_cell_ref,
                "pre-parsed cells differ from the raw reference"
            );
        }
        finding.cells.clone()
    };

    if cells.is_empty() {
        return Eligibility::NonInteractive {
            reason: Reason::NoCells,
        };
    }
    Eligibility::Interactive {
        sheet: sheet.name.clone(),
        cells,
    }
}

/// Expand an interactive finding into one highlight per referenced cell.
pub fn highlights(finding_id: &str, eligibility: &Eligibility) -> Vec<HighlightSpec> {
    match eligibility {
        Eligibility::Interactive { sheet, cells } => cells
            .iter()
            .map(|&cell| HighlightSpec {
                finding_id: finding_id.to_string(),
                sheet: sheet.clone(),
                cell,
            })
            .collect(),
        Eligibility::NonInteractive { .. } => Vec::new(),
    }
}
