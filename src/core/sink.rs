use std::path::PathBuf;

use async_trait::async_trait;
use rust_xlsxwriter::{Workbook, Worksheet};
use serde_json::Value;

use crate::core::table::Table;
use crate::utils::error::Result;

/// Destination for tabulated records. `write_table` creates the named sheet
/// if it does not exist and replaces its contents if it does, writing the
/// table as a contiguous range starting at the top-left cell.
///
/// Nothing is touched before a table is handed over, so a failed fetch or
/// transform leaves previous output in place.
#[async_trait]
pub trait SheetSink: Send + Sync {
    async fn write_table(&mut self, sheet_name: &str, table: &Table) -> Result<()>;

    /// Flushes anything the sink buffered. Called once after the last sheet.
    async fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes each sheet as `<name>.csv` under one output directory. Existing
/// files are truncated.
#[derive(Debug, Clone)]
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl SheetSink for CsvSink {
    async fn write_table(&mut self, sheet_name: &str, table: &Table) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("{}.csv", sheet_name));

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(table.header())?;
        for row in table.rows() {
            writer.write_record(row.iter().map(cell_text))?;
        }
        writer.flush()?;

        tracing::debug!("Wrote {} rows to {}", table.row_count(), path.display());
        Ok(())
    }
}

/// Collects sheets into a single workbook and writes it on `finish`. Writing
/// a sheet name twice replaces the earlier table.
#[derive(Debug)]
pub struct XlsxSink {
    path: PathBuf,
    sheets: Vec<(String, Table)>,
}

impl XlsxSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            sheets: Vec::new(),
        }
    }

    fn save(&self) -> Result<()> {
        let mut workbook = Workbook::new();

        for (name, table) in &self.sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(name)?;

            for (col_idx, field) in table.header().iter().enumerate() {
                worksheet.write_string(0, col_idx as u16, field)?;
            }

            for (row_idx, row) in table.rows().iter().enumerate() {
                for (col_idx, cell) in row.iter().enumerate() {
                    write_cell(worksheet, (row_idx + 1) as u32, col_idx as u16, cell)?;
                }
            }
        }

        workbook.save(&self.path)?;
        tracing::debug!(
            "Wrote {} sheets to {}",
            self.sheets.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[async_trait]
impl SheetSink for XlsxSink {
    async fn write_table(&mut self, sheet_name: &str, table: &Table) -> Result<()> {
        let name = sanitize_sheet_name(sheet_name);
        match self.sheets.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = table.clone(),
            None => self.sheets.push((name, table.clone())),
        }
        Ok(())
    }

    async fn finish(&mut self) -> Result<()> {
        self.save()
    }
}

fn write_cell(worksheet: &mut Worksheet, row: u32, col: u16, cell: &Value) -> Result<()> {
    match cell {
        Value::String(s) => worksheet.write_string(row, col, s)?,
        Value::Bool(b) => worksheet.write_boolean(row, col, *b)?,
        Value::Number(n) => match n.as_f64() {
            Some(f) => worksheet.write_number(row, col, f)?,
            None => worksheet.write_string(row, col, &n.to_string())?,
        },
        Value::Null => worksheet.write_string(row, col, "")?,
        // Arrays survive flattening as opaque values; store them as JSON text.
        other => worksheet.write_string(row, col, &other.to_string())?,
    };
    Ok(())
}

fn cell_text(cell: &Value) -> String {
    match cell {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Excel sheet names: at most 31 characters, no `: \ / ? * [ ] ' "` or
/// control characters. Invalid characters become `_`.
fn sanitize_sheet_name(raw: &str) -> String {
    let invalid = [':', '\\', '/', '?', '*', '[', ']', '\'', '"'];
    let mut sanitized: String = raw
        .chars()
        .map(|ch| {
            if invalid.contains(&ch) || ch.is_control() {
                '_'
            } else {
                ch
            }
        })
        .collect();

    sanitized = sanitized.trim().to_string();
    if sanitized.is_empty() {
        sanitized = "Sheet".to_string();
    }

    if sanitized.len() > 31 {
        sanitized.truncate(31);
    }

    sanitized
}
