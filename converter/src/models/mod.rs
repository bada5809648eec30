//! Domain models for the conversion pipeline.
//!
//! - [`FieldValue`] - a cell value: text, integer, or null for a missing cell
//! - [`Header`] - the field names discovered from the CSV header row
//! - [`Record`] - one data row, keyed by the shared [`Header`]
//! - [`Dataset`] - every record of one input file, in input order

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

// =============================================================================
// Field Values
// =============================================================================

/// A single field value.
///
/// Values start out as text and become integers when coerced. A row
/// shorter than the header leaves its trailing fields `Null`.
/// Serialized untagged: a JSON string, a JSON number or `null`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Null,
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// True for the empty string. Integers and nulls are never empty.
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Integer(n) => write!(f, "{}", n),
            FieldValue::Null => Ok(()),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Integer(n)
    }
}

// =============================================================================
// Header
// =============================================================================

/// Field names of a dataset, in first-seen order.
///
/// A name repeated in the CSV header keeps the position of its first
/// occurrence; the value of its last column is the one kept in the record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    /// Distinct field names.
    names: Vec<String>,
    /// Name -> slot index.
    index: HashMap<String, usize>,
    /// CSV column -> slot index.
    columns: Vec<usize>,
}

impl Header {
    /// Build a header from the raw CSV header columns.
    pub fn from_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut header = Header::default();
        for column in columns {
            let name = column.into();
            let slot = match header.index.get(&name) {
                Some(&slot) => slot,
                None => {
                    let slot = header.names.len();
                    header.index.insert(name.clone(), slot);
                    header.names.push(name);
                    slot
                }
            };
            header.columns.push(slot);
        }
        header
    }

    /// Distinct field names in output order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of distinct field names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Number of CSV columns, duplicates included.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Slot index of a field name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }
}

// =============================================================================
// Record
// =============================================================================

/// One data row: a value per header field.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    header: Arc<Header>,
    values: Vec<FieldValue>,
}

impl Record {
    /// Build a record from the raw CSV cells of one row.
    ///
    /// Cells are matched to the header column by column. A column with no
    /// cell is `Null`, also when it repeats a name an earlier cell filled.
    /// Cells beyond the last header column are ignored.
    pub fn from_columns<I, S>(header: Arc<Header>, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut cells = cells.into_iter();
        let mut values = vec![FieldValue::Null; header.len()];
        for &slot in &header.columns {
            values[slot] = match cells.next() {
                Some(cell) => FieldValue::Text(cell.into()),
                None => FieldValue::Null,
            };
        }
        Self { header, values }
    }

    /// Build a standalone record from `(name, value)` pairs.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<FieldValue>,
    {
        let (names, values): (Vec<String>, Vec<FieldValue>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        let header = Arc::new(Header::from_columns(names));
        let mut record = Self {
            values: vec![FieldValue::Text(String::new()); header.len()],
            header,
        };
        for (column, value) in values.into_iter().enumerate() {
            let slot = record.header.columns[column];
            record.values[slot] = value;
        }
        record
    }

    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.header.position(name).map(|slot| &self.values[slot])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut FieldValue> {
        self.header.position(name).map(move |slot| &mut self.values[slot])
    }

    /// Replace the value of an existing field, returning the old value.
    /// Unknown field names are ignored and return `None`.
    pub fn set(&mut self, name: &str, value: impl Into<FieldValue>) -> Option<FieldValue> {
        self.get_mut(name)
            .map(|slot| std::mem::replace(slot, value.into()))
    }

    /// `(name, value)` pairs in header order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.header
            .names
            .iter()
            .map(String::as_str)
            .zip(self.values.iter())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

// =============================================================================
// Dataset
// =============================================================================

/// All records of one input file, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    header: Arc<Header>,
    records: Vec<Record>,
}

impl Dataset {
    pub fn new(header: Arc<Header>) -> Self {
        Self {
            header,
            records: Vec::new(),
        }
    }

    /// Append a record built against this dataset's header.
    pub fn push(&mut self, record: Record) {
        debug_assert!(
            Arc::ptr_eq(&self.header, &record.header) || *self.header == *record.header,
            "record header does not match dataset header"
        );
        self.records.push(record);
    }

    /// Build a record from raw cells and append it.
    pub fn push_row<I, S>(&mut self, cells: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let record = Record::from_columns(Arc::clone(&self.header), cells);
        self.records.push(record);
    }

    pub fn header(&self) -> &Arc<Header> {
        &self.header
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Record] {
        &mut self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl Default for Dataset {
    fn default() -> Self {
        Self::new(Arc::new(Header::default()))
    }
}

impl<'a> IntoIterator for &'a Dataset {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.records)
    }
}
