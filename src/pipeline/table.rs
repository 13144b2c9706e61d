//! Tabular conversion: byte buffer ⇄ [`Table`].
//!
//! ## Reading
//!
//! Uploads arrive with whatever MIME type the browser guessed, which for
//! CSV files ranges from `text/csv` to `application/vnd.ms-excel`. So the
//! MIME type is ignored and the bytes are probed instead: strict CSV first
//! (UTF-8, header row, every record the same width), then any spreadsheet
//! format `calamine` can open. When both fail the error carries both
//! reasons.
//!
//! ## Writing
//!
//! CSV is written straight into memory. Spreadsheets go through a scratch
//! file inside a `TempDir` which is removed when it drops, on success and on
//! every error path alike.

use crate::error::ArtifactError;
use crate::present::escape_html;
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::Workbook;
use serde::Serialize;
use std::fmt;
use std::io::Cursor;
use std::path::Path;
use tempfile::TempDir;
use tracing::{debug, info};

/// A single table cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Empty,
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl CellValue {
    /// Infer a typed value from CSV text: integer, then float, then boolean, else text.
    pub fn infer(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return CellValue::Empty;
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return CellValue::Int(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return CellValue::Float(f);
        }
        match trimmed {
            "true" | "True" | "TRUE" => CellValue::Bool(true),
            "false" | "False" | "FALSE" => CellValue::Bool(false),
            _ => CellValue::Text(raw.to_string()),
        }
    }

    fn from_spreadsheet(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Empty,
            Data::Int(i) => CellValue::Int(*i),
            // Spreadsheets store every number as a double.
            Data::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => CellValue::Int(*f as i64),
            Data::Float(f) => CellValue::Float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::String(s) => CellValue::Text(s.clone()),
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e16 => {
                write!(f, "{v:.1}")
            }
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(true) => f.write_str("True"),
            CellValue::Bool(false) => f.write_str("False"),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(CellValue::Empty, Into::into)
    }
}

/// Rows of values under named, ordered columns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// All values of the column called `name`, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&CellValue>> {
        let idx = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Serialise as CSV text: header row, then one record per row, no index column.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer
            .write_record(&self.columns)
            .map_err(|e| ArtifactError::TableWrite(e.to_string()))?;
        for row in &self.rows {
            writer
                .write_record(row.iter().map(|cell| cell.to_string()))
                .map_err(|e| ArtifactError::TableWrite(e.to_string()))?;
        }
        writer
            .into_inner()
            .map_err(|e| ArtifactError::TableWrite(e.to_string()))
    }

    /// Write the table as an `.xlsx` workbook at `path`.
    pub fn write_xlsx(&self, path: &Path) -> Result<(), ArtifactError> {
        let mut workbook = self.build_workbook()?;
        workbook.save(path)?;
        Ok(())
    }

    /// Serialise as `.xlsx` bytes through a scratch file in the system temp directory.
    pub fn to_xlsx_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        self.to_xlsx_bytes_in(&std::env::temp_dir())
    }

    /// Serialise as `.xlsx` bytes through a scratch directory created under `parent`.
    ///
    /// The scratch directory is gone by the time this returns, whether it
    /// returns `Ok` or `Err`.
    pub fn to_xlsx_bytes_in(&self, parent: &Path) -> Result<Vec<u8>, ArtifactError> {
        let temp_dir = TempDir::new_in(parent).map_err(|e| ArtifactError::TempFile {
            path: parent.to_path_buf(),
            source: e,
        })?;
        let file_path = temp_dir.path().join("table.xlsx");
        debug!("Writing spreadsheet to {}", file_path.display());

        self.write_xlsx(&file_path)?;
        let bytes = std::fs::read(&file_path).map_err(|e| ArtifactError::TempFile {
            path: file_path.clone(),
            source: e,
        })?;

        debug!("Spreadsheet → {} bytes", bytes.len());
        Ok(bytes)
    }

    /// Render as an HTML `<table>` with a row-index column. Text is escaped.
    pub fn to_html(&self) -> String {
        let mut html = String::from(
            "<table border=\"1\" class=\"dataframe\">\n  <thead>\n    <tr style=\"text-align: right;\">\n      <th></th>\n",
        );
        for column in &self.columns {
            html.push_str(&format!("      <th>{}</th>\n", escape_html(column)));
        }
        html.push_str("    </tr>\n  </thead>\n  <tbody>\n");
        for (i, row) in self.rows.iter().enumerate() {
            html.push_str(&format!("    <tr>\n      <th>{i}</th>\n"));
            for cell in row {
                html.push_str(&format!("      <td>{}</td>\n", escape_html(&cell.to_string())));
            }
            html.push_str("    </tr>\n");
        }
        html.push_str("  </tbody>\n</table>");
        html
    }

    fn build_workbook(&self) -> Result<Workbook, ArtifactError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();

        for (c, header) in self.columns.iter().enumerate() {
            sheet.write_string(0, column_index(c)?, header.as_str())?;
        }
        for (r, row) in self.rows.iter().enumerate() {
            let r = u32::try_from(r + 1)
                .map_err(|_| ArtifactError::TableWrite(format!("too many rows: {}", r + 1)))?;
            for (c, cell) in row.iter().enumerate() {
                let c = column_index(c)?;
                match cell {
                    CellValue::Empty => {}
                    CellValue::Int(i) => {
                        sheet.write_number(r, c, *i as f64)?;
                    }
                    CellValue::Float(v) => {
                        sheet.write_number(r, c, *v)?;
                    }
                    CellValue::Bool(b) => {
                        sheet.write_boolean(r, c, *b)?;
                    }
                    CellValue::Text(s) => {
                        sheet.write_string(r, c, s.as_str())?;
                    }
                }
            }
        }
        Ok(workbook)
    }
}

fn column_index(c: usize) -> Result<u16, ArtifactError> {
    u16::try_from(c).map_err(|_| ArtifactError::TableWrite(format!("too many columns: {}", c + 1)))
}

/// Build a table from literal header names and rows.
///
/// Every row must have exactly one value per header.
pub fn table_from_rows<H, V>(headers: &[H], rows: Vec<Vec<V>>) -> Result<Table, ArtifactError>
where
    H: AsRef<str>,
    V: Into<CellValue>,
{
    let expected = headers.len();
    if let Some((row, found)) = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (i, r.len()))
        .find(|&(_, len)| len != expected)
    {
        return Err(ArtifactError::RowLengthMismatch {
            row,
            expected,
            found,
        });
    }

    Ok(Table {
        columns: headers.iter().map(|h| h.as_ref().to_string()).collect(),
        rows: rows
            .into_iter()
            .map(|r| r.into_iter().map(Into::into).collect())
            .collect(),
    })
}

/// Read a buffer as a table: CSV first, then any spreadsheet format.
pub fn to_table(mut buffer: Cursor<Vec<u8>>) -> Result<Table, ArtifactError> {
    buffer.set_position(0);

    let csv_err = match read_csv(buffer.get_ref()) {
        Ok(table) => {
            info!("Parsed CSV: {} columns × {} rows", table.num_columns(), table.num_rows());
            return Ok(table);
        }
        Err(e) => e,
    };
    debug!("CSV parse failed ({}); trying spreadsheet", csv_err);

    match read_spreadsheet(buffer) {
        Ok(table) => {
            info!(
                "Parsed spreadsheet: {} columns × {} rows",
                table.num_columns(),
                table.num_rows()
            );
            Ok(table)
        }
        Err(spreadsheet_err) => Err(ArtifactError::UnsupportedTableFormat {
            csv: csv_err,
            spreadsheet: spreadsheet_err,
        }),
    }
}

fn read_csv(bytes: &[u8]) -> Result<Table, String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_reader(bytes);

    let columns: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(str::to_string)
        .collect();
    if columns.iter().all(String::is_empty) {
        return Err("no columns to parse".to_string());
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        rows.push(record.iter().map(CellValue::infer).collect());
    }

    Ok(Table { columns, rows })
}

fn read_spreadsheet(buffer: Cursor<Vec<u8>>) -> Result<Table, String> {
    let mut workbook = open_workbook_auto_from_rs(buffer).map_err(|e| e.to_string())?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| "workbook has no worksheets".to_string())?
        .map_err(|e| e.to_string())?;

    let mut rows = range.rows();
    let columns: Vec<String> = rows
        .next()
        .ok_or_else(|| "worksheet is empty".to_string())?
        .iter()
        .map(|cell| cell.to_string())
        .collect();

    let rows = rows
        .map(|row| row.iter().map(CellValue::from_spreadsheet).collect())
        .collect();

    Ok(Table { columns, rows })
}
