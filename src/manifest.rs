//! Schema-unknown manifest data
//!
//! A manifest is one of three shapes, decided by the input format: a table with
//! named columns, a list of key-value records, or a mapping from keys to
//! key-value records. Callers work through the uniform operations on
//! [`Manifest`] and never branch on the shape themselves.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single key-value record
pub type Record = Map<String, Value>;

/// Column-oriented manifest data; every row has exactly one cell per column
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Build a table, padding short rows with nulls and dropping surplus cells
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::Null);
                row
            })
            .collect();
        Self { columns, rows }
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

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Index of `name`, appending it as an all-null column when missing
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.columns.push(name.to_string());
        for row in &mut self.rows {
            row.push(Value::Null);
        }
        self.columns.len() - 1
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).and_then(|cells| cells.get(index))
    }

    /// First non-null value in a column
    pub fn first_present(&self, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows
            .iter()
            .filter_map(|row| row.get(index))
            .find(|value| !value.is_null())
    }

    /// Materialize a row as a record, in column order
    pub fn row_record(&self, row: usize) -> Option<Record> {
        let cells = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .cloned()
                .zip(cells.iter().cloned())
                .collect(),
        )
    }
}

/// Which of the three shapes a manifest has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ManifestShape {
    Table,
    List,
    Mapping,
}

impl fmt::Display for ManifestShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ManifestShape::Table => "table",
            ManifestShape::List => "list",
            ManifestShape::Mapping => "mapping",
        };
        f.write_str(name)
    }
}

/// Identifies one record within a manifest
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum Locator {
    Row(usize),
    Position(usize),
    Key(String),
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::Row(row) => write!(f, "row {}", row),
            Locator::Position(position) => write!(f, "item {}", position),
            Locator::Key(key) => write!(f, "key {:?}", key),
        }
    }
}

/// Manifest contents in whichever shape the input provided
#[derive(Debug, Clone, PartialEq)]
pub enum Manifest {
    Table(Table),
    List(Vec<Value>),
    Mapping(Map<String, Value>),
}

impl Manifest {
    pub fn shape(&self) -> ManifestShape {
        match self {
            Manifest::Table(_) => ManifestShape::Table,
            Manifest::List(_) => ManifestShape::List,
            Manifest::Mapping(_) => ManifestShape::Mapping,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Manifest::Table(table) => table.len(),
            Manifest::List(items) => items.len(),
            Manifest::Mapping(entries) => entries.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The record whose keys stand for the whole structure.
    ///
    /// Lists use their first item, mappings their first value. `None` for
    /// tables, for empty structures and when that entry is not an object.
    pub fn sample_record(&self) -> Option<&Record> {
        match self {
            Manifest::Table(_) => None,
            Manifest::List(items) => items.first()?.as_object(),
            Manifest::Mapping(entries) => entries.values().next()?.as_object(),
        }
    }

    /// Field names in declared order
    pub fn field_names(&self) -> Vec<String> {
        match self {
            Manifest::Table(table) => table.columns().to_vec(),
            _ => self
                .sample_record()
                .map(|record| record.keys().cloned().collect())
                .unwrap_or_default(),
        }
    }

    pub fn get_field(&self, locator: &Locator, field: &str) -> Option<&Value> {
        match (self, locator) {
            (Manifest::Table(table), Locator::Row(row)) => table.cell(*row, field),
            (Manifest::List(items), Locator::Position(position)) => {
                items.get(*position)?.as_object()?.get(field)
            }
            (Manifest::Mapping(entries), Locator::Key(key)) => {
                entries.get(key)?.as_object()?.get(field)
            }
            _ => None,
        }
    }

    /// Write one field. Tables gain the column across every row on first use.
    ///
    /// Returns `false` when the locator does not address a record.
    pub fn set_field(&mut self, locator: &Locator, field: &str, value: Value) -> bool {
        match (self, locator) {
            (Manifest::Table(table), Locator::Row(row)) => {
                if *row >= table.len() {
                    return false;
                }
                let column = table.ensure_column(field);
                table.rows[*row][column] = value;
                true
            }
            (Manifest::List(items), Locator::Position(position)) => {
                match items.get_mut(*position).and_then(Value::as_object_mut) {
                    Some(record) => {
                        record.insert(field.to_string(), value);
                        true
                    }
                    None => false,
                }
            }
            (Manifest::Mapping(entries), Locator::Key(key)) => {
                match entries.get_mut(key).and_then(Value::as_object_mut) {
                    Some(record) => {
                        record.insert(field.to_string(), value);
                        true
                    }
                    None => false,
                }
            }
            _ => false,
        }
    }

    /// The full record behind a locator
    pub fn record(&self, locator: &Locator) -> Option<Record> {
        match (self, locator) {
            (Manifest::Table(table), Locator::Row(row)) => table.row_record(*row),
            (Manifest::List(items), Locator::Position(position)) => {
                items.get(*position)?.as_object().cloned()
            }
            (Manifest::Mapping(entries), Locator::Key(key)) => {
                entries.get(key)?.as_object().cloned()
            }
            _ => None,
        }
    }

    /// Every record's value for `field`, in structure order
    pub fn field_values<'a>(
        &'a self,
        field: &'a str,
    ) -> Box<dyn Iterator<Item = (Locator, Option<&'a Value>)> + 'a> {
        match self {
            Manifest::Table(table) => {
                let column = table.column_index(field);
                Box::new(table.rows.iter().enumerate().map(move |(row, cells)| {
                    (Locator::Row(row), column.and_then(|index| cells.get(index)))
                }))
            }
            Manifest::List(items) => Box::new(items.iter().enumerate().map(move |(position, item)| {
                (
                    Locator::Position(position),
                    item.as_object().and_then(|record| record.get(field)),
                )
            })),
            Manifest::Mapping(entries) => Box::new(entries.iter().map(move |(key, item)| {
                (
                    Locator::Key(key.clone()),
                    item.as_object().and_then(|record| record.get(field)),
                )
            })),
        }
    }

    /// Tabular view used by the table-only output formats.
    ///
    /// Lists become one row per item over the union of their keys; mappings
    /// additionally get a leading `id` column holding the mapping key.
    pub fn to_table(&self) -> Table {
        match self {
            Manifest::Table(table) => table.clone(),
            Manifest::List(items) => {
                let records: Vec<_> = items.iter().map(|item| (None, item)).collect();
                records_to_table(&records)
            }
            Manifest::Mapping(entries) => {
                let records: Vec<_> = entries
                    .iter()
                    .map(|(key, item)| (Some(key.as_str()), item))
                    .collect();
                records_to_table(&records)
            }
        }
    }

    /// JSON view: tables become an array of row objects
    pub fn to_json(&self) -> Value {
        match self {
            Manifest::Table(table) => Value::Array(
                (0..table.len())
                    .filter_map(|row| table.row_record(row))
                    .map(Value::Object)
                    .collect(),
            ),
            Manifest::List(items) => Value::Array(items.clone()),
            Manifest::Mapping(entries) => Value::Object(entries.clone()),
        }
    }
}

const KEY_COLUMN: &str = "id";
const FALLBACK_KEY_COLUMN: &str = "_key";

/// Column holding mapping keys; avoids any field name a record already uses
fn key_column_name(records: &[(Option<&str>, &Value)]) -> String {
    let taken = |name: &str| {
        records
            .iter()
            .filter_map(|(_, item)| item.as_object())
            .any(|record| record.contains_key(name))
    };

    if !taken(KEY_COLUMN) {
        return KEY_COLUMN.to_string();
    }
    let mut name = FALLBACK_KEY_COLUMN.to_string();
    let mut suffix = 1;
    while taken(&name) {
        name = format!("{}_{}", FALLBACK_KEY_COLUMN, suffix);
        suffix += 1;
    }
    name
}

fn records_to_table(records: &[(Option<&str>, &Value)]) -> Table {
    let keyed = records.iter().any(|(key, _)| key.is_some());
    let mut table = Table::default();
    if keyed {
        table.ensure_column(&key_column_name(records));
    }

    for (key, item) in records {
        let mut row = vec![Value::Null; table.columns.len()];
        if let Some(key) = key {
            row[0] = Value::String(key.to_string());
        }
        table.rows.push(row);
        let row_index = table.rows.len() - 1;

        if let Some(record) = item.as_object() {
            for (field, value) in record {
                let column = table.ensure_column(field);
                table.rows[row_index][column] = value.clone();
            }
        }
    }

    table
}
