use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cell_ref::column_to_label;

/// A 1-based cell position. Both components are >= 1 for any address built
/// through [`Address::new`], the codec, or deserialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "RawAddress")]
pub struct Address {
    pub row: u32,
    pub col: u32,
}

#[derive(Deserialize)]
struct RawAddress {
    row: u32,
    col: u32,
}

impl TryFrom<RawAddress> for Address {
    type Error = String;

    fn try_from(raw: RawAddress) -> Result<Self, Self::Error> {
        Self::new(raw.row, raw.col)
            .ok_or_else(|| format!("row {} col {} is not a 1-based address", raw.row, raw.col))
    }
}

impl Address {
    /// Create an address, rejecting a zero row or column.
    pub fn new(row: u32, col: u32) -> Option<Self> {
        (row >= 1 && col >= 1).then_some(Self { row, col })
    }

    /// Row and column are both 1-based. Struct literals can bypass this.
    pub fn is_valid(self) -> bool {
        self.row >= 1 && self.col >= 1
    }

    /// (row, col) as 0-based indices for pixel math.
    pub fn zero_based(self) -> (u32, u32) {
        (self.row.saturating_sub(1), self.col.saturating_sub(1))
    }

    /// Inverse of [`Address::zero_based`].
    pub fn from_zero_based(row: u32, col: u32) -> Self {
        Self {
            row: row.saturating_add(1),
            col: col.saturating_add(1),
        }
    }

    /// Canonical column letters ("AA" for column 27).
    pub fn column_label(self) -> String {
        column_to_label(self.col)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", column_to_label(self.col), self.row)
    }
}

/// A cell a finding asks to emphasize. Multi-cell findings expand to several
/// of these sharing the same `finding_id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct HighlightSpec {
    pub finding_id: String,
    pub sheet: String,
    pub cell: Address,
}

impl HighlightSpec {
    /// Cell label used for display and highlight keys ("B5").
    pub fn cell_label(&self) -> String {
        self.cell.to_string()
    }
}
