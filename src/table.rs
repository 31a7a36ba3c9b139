// table.rs
//
// The flat table passed between pipeline stages: named columns over rows of
// loosely-typed cells. Cells are `serde_json::Value` so a column can carry
// whatever the provider sent (string, number, bool, nested object) until the
// loader coerces it; `Value::Null` is the one explicit missing marker.

use crate::errors::PipelineError;
use serde_json::Value;
use std::path::Path;

#[derive(Debug, Clone, PartialEq)]
pub struct DataTable {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl DataTable {
    pub fn new(columns: Vec<String>) -> Self {
        DataTable {
            columns,
            rows: Vec::new(),
        }
    }

    /// Builds a table from an array of JSON objects, e.g. the `properties`
    /// payload of the listings API. Columns are the union of all object keys
    /// in first-seen order; keys absent from a given object become Null.
    pub fn from_json_records(records: &[Value]) -> Result<Self, PipelineError> {
        let mut columns: Vec<String> = Vec::new();
        for record in records {
            let obj = record.as_object().ok_or_else(|| {
                PipelineError::Api(format!("expected a JSON object per listing, got: {record}"))
            })?;
            for key in obj.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }

        let mut table = DataTable::new(columns);
        for record in records {
            let obj = record.as_object().unwrap(); // checked above
            let row = table
                .columns
                .iter()
                .map(|col| obj.get(col).cloned().unwrap_or(Value::Null))
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push_row(&mut self, row: Vec<Value>) {
        debug_assert_eq!(row.len(), self.columns.len());
        self.rows.push(row);
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Cell lookup by column name. A column the table does not have reads
    /// as Null, same as an explicitly missing value.
    pub fn get<'a>(&'a self, row: usize, name: &str) -> &'a Value {
        match self.column_index(name) {
            Some(idx) => &self.rows[row][idx],
            None => &Value::Null,
        }
    }

    /// Reads a table from a delimited file written by `write_csv`. Every
    /// cell comes back as a string (empty cell reads as Null); typing is the
    /// loader's job.
    pub fn read_csv(path: &Path) -> Result<Self, PipelineError> {
        Self::from_csv_reader(csv::Reader::from_path(path)?)
    }

    /// Same as `read_csv`, for in-memory contents (the raw-data cache).
    pub fn read_csv_str(contents: &str) -> Result<Self, PipelineError> {
        Self::from_csv_reader(csv::Reader::from_reader(contents.as_bytes()))
    }

    fn from_csv_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self, PipelineError> {
        let columns = reader
            .headers()?
            .iter()
            .map(|h| h.to_string())
            .collect::<Vec<_>>();

        let mut table = DataTable::new(columns);
        for record in reader.records() {
            let record = record?;
            let row = record
                .iter()
                .map(|cell| {
                    if cell.is_empty() {
                        Value::Null
                    } else {
                        Value::String(cell.to_string())
                    }
                })
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }

    /// Serializes the table to delimited text, the same shape `write_csv`
    /// puts on disk.
    pub fn to_csv_string(&self) -> Result<String, PipelineError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(cell_to_string))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| PipelineError::Csv(e.to_string()))?;
        String::from_utf8(bytes).map_err(|e| PipelineError::Csv(e.to_string()))
    }

    /// Writes the table as headers plus one line per row. Nested values
    /// (features, tax assessments, ...) are serialized to JSON text so the
    /// file stays flat.
    pub fn write_csv(&self, path: &Path) -> Result<(), PipelineError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row.iter().map(cell_to_string))?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// A cell counts as missing only for the explicit markers: Null, or a
/// string that is empty after trimming. Everything else is "present".
pub fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// Flattens one cell for the delimited interchange file. Null becomes the
/// empty string, which `read_csv` maps back to Null.
pub fn cell_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(), // objects and arrays as JSON text
    }
}
