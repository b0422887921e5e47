//! Loading and saving manifests, dispatched on file extension.

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use rust_xlsxwriter::Workbook;
use serde_json::Value;
use tracing::info;

use crate::error::{CatalogueError, Result};
use crate::manifest::{Manifest, Table};

/// Supported manifest file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestFormat {
    Csv,
    Json,
    /// `.xlsx` and legacy `.xls`
    Excel,
}

impl ManifestFormat {
    /// Pick the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Ok(ManifestFormat::Csv),
            "json" => Ok(ManifestFormat::Json),
            "xlsx" | "xls" => Ok(ManifestFormat::Excel),
            _ => Err(CatalogueError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension: if extension.is_empty() {
                    "(none)".to_string()
                } else {
                    format!(".{}", extension)
                },
            }),
        }
    }
}

impl fmt::Display for ManifestFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ManifestFormat::Csv => "CSV",
            ManifestFormat::Json => "JSON",
            ManifestFormat::Excel => "Excel",
        };
        f.write_str(name)
    }
}

/// Load a manifest; the format decides the shape
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let format = ManifestFormat::from_path(path)?;
    info!("Loading manifest from {}", path.display());

    let manifest = match format {
        ManifestFormat::Csv => Manifest::Table(read_csv(path)?),
        ManifestFormat::Json => read_json(path)?,
        ManifestFormat::Excel => Manifest::Table(read_excel(path)?),
    };

    info!(
        "Loaded {} manifest with {} entries ({} shape)",
        format,
        manifest.len(),
        manifest.shape()
    );
    Ok(manifest)
}

/// Save a manifest, converting its shape when the format requires it
pub fn save_manifest(manifest: &Manifest, path: &Path) -> Result<PathBuf> {
    let format = ManifestFormat::from_path(path)?;
    info!("Saving updated manifest to {}", path.display());

    match format {
        ManifestFormat::Csv => write_csv(&manifest.to_table(), path)?,
        ManifestFormat::Json => write_json(&manifest.to_json(), path)?,
        ManifestFormat::Excel => write_excel(&manifest.to_table(), path)?,
    }

    info!("Successfully saved updated manifest to {}", path.display());
    Ok(path.to_path_buf())
}

fn read_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)?;

    let columns = reader.headers()?.iter().map(str::to_string).collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.is_empty() {
                        Value::Null
                    } else {
                        Value::String(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(Table::new(columns, rows))
}

fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(cell_text))?;
    }
    writer.flush()?;
    Ok(())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn read_json(path: &Path) -> Result<Manifest> {
    let reader = BufReader::new(File::open(path)?);
    match serde_json::from_reader(reader)? {
        Value::Array(items) => Ok(Manifest::List(items)),
        Value::Object(entries) => Ok(Manifest::Mapping(entries)),
        other => Err(CatalogueError::InvalidManifest {
            path: path.to_path_buf(),
            details: format!(
                "expected a JSON array or object at the top level, found {}",
                json_kind(&other)
            ),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn write_json(value: &Value, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush()?;
    Ok(())
}

/// First worksheet, first row as header
fn read_excel(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CatalogueError::InvalidManifest {
            path: path.to_path_buf(),
            details: "workbook has no worksheets".to_string(),
        })??;

    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Ok(Table::default());
    };

    let columns = header
        .iter()
        .enumerate()
        .map(|(index, cell)| match cell {
            Data::Empty => format!("Unnamed: {}", index),
            Data::String(name) => name.clone(),
            other => other.to_string(),
        })
        .collect();
    let rows = rows
        .map(|cells| cells.iter().map(excel_value).collect())
        .collect();

    Ok(Table::new(columns, rows))
}

fn excel_value(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::String(text) if text.is_empty() => Value::Null,
        Data::String(text) => Value::String(text.clone()),
        Data::Int(number) => Value::from(*number),
        Data::Float(number) => serde_json::Number::from_f64(*number)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        Data::Bool(flag) => Value::Bool(*flag),
        other => Value::String(other.to_string()),
    }
}

fn write_excel(table: &Table, path: &Path) -> Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    for (column, name) in table.columns().iter().enumerate() {
        worksheet.write_string(0, excel_column(path, column)?, name)?;
    }

    for (index, row) in table.rows().iter().enumerate() {
        let row_number = u32::try_from(index + 1).map_err(|_| too_large(path, "rows"))?;
        for (column, value) in row.iter().enumerate() {
            let column = excel_column(path, column)?;
            match value {
                Value::Null => {}
                Value::String(text) => {
                    worksheet.write_string(row_number, column, text)?;
                }
                Value::Bool(flag) => {
                    worksheet.write_boolean(row_number, column, *flag)?;
                }
                Value::Number(number) => match number.as_f64() {
                    Some(float) => {
                        worksheet.write_number(row_number, column, float)?;
                    }
                    None => {
                        worksheet.write_string(row_number, column, number.to_string())?;
                    }
                },
                other => {
                    worksheet.write_string(row_number, column, other.to_string())?;
                }
            }
        }
    }

    workbook.save(path)?;
    Ok(())
}

fn excel_column(path: &Path, column: usize) -> Result<u16> {
    u16::try_from(column).map_err(|_| too_large(path, "columns"))
}

fn too_large(path: &Path, what: &str) -> CatalogueError {
    CatalogueError::InvalidManifest {
        path: path.to_path_buf(),
        details: format!("too many {} for an Excel worksheet", what),
    }
}
