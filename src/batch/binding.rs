use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{BatchboardError, BatchboardResult};
use crate::template::layer::{LayerKind, Template};

/// Tabular input: column names plus data rows aligned to them.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataTable {
    /// Column names.
    pub header_row: Vec<String>,
    /// Data rows, header excluded.
    pub data_rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Table from a header and its data rows.
    pub fn new(header_row: Vec<String>, data_rows: Vec<Vec<String>>) -> Self {
        Self {
            header_row,
            data_rows,
        }
    }

    /// Split raw rows: row 0 is the header, the rest are data.
    pub fn from_rows(mut rows: Vec<Vec<String>>) -> BatchboardResult<Self> {
        if rows.is_empty() {
            return Err(BatchboardError::validation("table has no header row"));
        }
        let header_row = rows.remove(0);
        Ok(Self::new(header_row, rows))
    }

    /// Parse a JSON array of string arrays (header first).
    pub fn from_json_str(s: &str) -> BatchboardResult<Self> {
        let rows: Vec<Vec<String>> = serde_json::from_str(s)?;
        Self::from_rows(rows)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.data_rows.len()
    }

    /// `true` without data rows.
    pub fn is_empty(&self) -> bool {
        self.data_rows.is_empty()
    }
}

/// A template bound to one data row.
#[derive(Clone, Debug)]
pub struct BoundTemplate {
    /// Row-owned copy of the template with cell values applied.
    pub template: Template,
    /// Ids of image and mask layers whose source came from the row.
    pub required: Vec<String>,
}

/// Column positions keyed by name; the first column with a given name wins.
pub fn column_index(header: &[String]) -> HashMap<&str, usize> {
    let mut index = HashMap::with_capacity(header.len());
    for (i, name) in header.iter().enumerate() {
        index.entry(name.as_str()).or_insert(i);
    }
    index
}

/// Clone `template` and substitute the row's cells into layers named after columns.
///
/// Text layers take the cell as their text; image and mask layers take it as their source.
/// Layers without a matching column, and columns without a cell in this row, are left alone.
pub fn bind_row(template: &Template, columns: &HashMap<&str, usize>, row: &[String]) -> BoundTemplate {
    let mut template = template.clone();
    let mut required = Vec::new();
    template.walk_mut(&mut |layer| {
        if layer.name.is_empty() {
            return;
        }
        let Some(cell) = columns.get(layer.name.as_str()).and_then(|&i| row.get(i)) else {
            return;
        };
        match &mut layer.kind {
            LayerKind::Text(t) => {
                t.text = cell.clone();
                t.source_text = cell.clone();
            }
            LayerKind::Image(img) => {
                img.src = cell.clone();
                required.push(layer.id.clone());
            }
            LayerKind::Mask(m) => {
                m.src = cell.clone();
                required.push(layer.id.clone());
            }
            _ => {}
        }
    });
    BoundTemplate { template, required }
}

#[cfg(test)]
#[path = "../../tests/unit/batch/binding.rs"]
mod tests;
