use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell value as sent by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum CellValue {
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(true) => f.write_str("TRUE"),
            Self::Bool(false) => f.write_str("FALSE"),
            Self::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{n:.0}")
            }
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// A rectangular block of cell values, the unit of transfer and caching.
///
/// Bounds are 1-based and inclusive. They are the bounds the server actually
/// returned, which may be narrower than the request at the dataset edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub sheet: String,
    pub r0: u32,
    pub r1: u32,
    pub c0: u32,
    pub c1: u32,
    #[serde(default)]
    pub data: Vec<Vec<CellValue>>,
}

impl Tile {
    /// Whether (row, col) lies within the returned bounds.
    pub fn contains(&self, row: u32, col: u32) -> bool {
        row >= self.r0 && row <= self.r1 && col >= self.c0 && col <= self.c1
    }

    /// Value at an absolute (row, col), if covered and present in `data`.
    pub fn value(&self, row: u32, col: u32) -> Option<&CellValue> {
        if !self.contains(row, col) {
            return None;
        }
        self.data
            .get((row - self.r0) as usize)?
            .get((col - self.c0) as usize)
    }

    /// Bounds are well-formed (r0 <= r1, c0 <= c1, both 1-based).
    pub fn has_valid_bounds(&self) -> bool {
        self.r0 >= 1 && self.c0 >= 1 && self.r0 <= self.r1 && self.c0 <= self.c1
    }
}

/// Inclusive window requested from the `page` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub sheet: String,
    pub r0: u32,
    pub r1: u32,
    pub c0: u32,
    pub c1: u32,
}

impl PageRequest {
    /// Window of `rows` x `cols` cells starting at (r0, c0).
    pub fn window(sheet: &str, r0: u32, c0: u32, rows: u32, cols: u32) -> Self {
        Self {
            sheet: sheet.to_string(),
            r0,
            r1: r0.saturating_add(rows.max(1) - 1),
            c0,
            c1: c0.saturating_add(cols.max(1) - 1),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_mixed_row() {
        let tile: Tile = serde_json::from_str(
            r#"{"sheet":"S","r0":1,"r1":1,"c0":1,"c1":4,"data":[[1.5,"x",null,true]]}"#,
        )
        .unwrap();
        assert_eq!(tile.value(1, 1), Some(&CellValue::Number(1.5)));
        assert_eq!(tile.value(1, 2), Some(&CellValue::Text("x".into())));
        assert_eq!(tile.value(1, 3), Some(&CellValue::Empty));
        assert_eq!(tile.value(1, 4), Some(&CellValue::Bool(true)));
    }

    #[test]
    fn test_display_integral_number() {
        assert_eq!(CellValue::Number(2759.0).to_string(), "2759");
        assert_eq!(CellValue::Number(0.25).to_string(), "0.25");
    }

    #[test]
    fn test_short_data_is_missing_not_panic() {
        let tile = Tile {
            sheet: "S".into(),
            r0: 1,
            r1: 10,
            c0: 1,
            c1: 10,
            data: vec![vec![CellValue::from("a")]],
        };
        assert!(tile.contains(5, 5));
        assert_eq!(tile.value(5, 5), None);
    }
}
