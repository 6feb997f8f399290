use serde::{Deserialize, Serialize};

/// Name and declared dimensions of one sheet, in presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetMeta {
    pub name: String,
    pub rows: u32,
    pub cols: u32,
}

/// Envelope returned by the `meta` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaResponse {
    #[serde(default)]
    pub file_id: String,
    pub sheets: Vec<SheetMeta>,
}

/// Clamped position returned by the `spotlight` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spotlight {
    pub sheet: String,
    pub row: u32,
    pub col: u32,
}

/// Case-insensitive lookup of a sheet by name.
pub fn find_sheet<'a>(sheets: &'a [SheetMeta], name: &str) -> Option<(usize, &'a SheetMeta)> {
    sheets
        .iter()
        .enumerate()
        .find(|(_, s)| s.name.eq_ignore_ascii_case(name.trim()))
}
