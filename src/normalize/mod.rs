//! Row normalization: raw string rows to typed observation records.
//!
//! Each chart family declares a [`RowSchema`] naming the columns it
//! consumes and the time-bucket key. The normalizer coerces every
//! numeric column, drops rows where a required value is absent or not
//! a finite number, and de-duplicates on the bucket key with
//! last-write-wins. It is a pure function of its input: the same row
//! sequence always yields the same records and the same drop counts.
//!
//! Dropped rows are counted, not printed, so callers and tests can
//! assert on the statistics directly.

use serde_json::{Map, Number, Value};
use std::collections::HashMap;

use crate::error::{NormalizeError, NormalizeOutcome};

// =============================================================================
// Schema
// =============================================================================

/// How a column's raw string is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Coerced with `f64` parsing; non-finite or unparsable values
    /// mark the row malformed.
    Numeric,
    /// Kept verbatim; an empty value marks the row malformed.
    Text,
}

/// One consumed column.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl ColumnSpec {
    pub const fn numeric(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Numeric,
        }
    }

    pub const fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: FieldKind::Text,
        }
    }
}

/// The columns a chart family consumes.
///
/// All listed columns are required: a source missing one in its
/// header fails outright, and a row missing a value is dropped.
/// `key` names the columns forming the time-bucket key used for
/// last-write-wins de-duplication.
#[derive(Debug, Clone, Copy)]
pub struct RowSchema<'a> {
    pub columns: &'a [ColumnSpec],
    pub key: &'a [&'a str],
}

// =============================================================================
// Result
// =============================================================================

/// Structured drop statistics for one normalization pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct DropStats {
    /// Rows dropped for a missing or non-numeric required value.
    pub malformed: usize,
    /// Rows overwritten by a later row with the same bucket key.
    pub superseded: usize,
}

impl DropStats {
    pub fn total(&self) -> usize {
        self.malformed + self.superseded
    }
}

/// Result of normalizing a raw row sequence.
#[derive(Debug, Clone)]
pub struct NormalizeResult {
    /// Typed records in source order, one per surviving bucket key.
    /// Numeric fields are JSON numbers, text fields JSON strings.
    pub records: Vec<Value>,
    /// What was dropped along the way.
    pub dropped: DropStats,
}

// =============================================================================
// Normalization
// =============================================================================

/// Parse a raw field to `f64`; anything unparsable becomes `NaN`.
pub fn coerce_numeric(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return f64::NAN;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

/// Normalize raw rows against a chart family's schema.
///
/// Fails when the input is empty, when a schema column is absent from
/// the source, or when every row is dropped as malformed. Individual
/// bad rows never fail the pass; they are dropped and counted.
pub fn normalize(rows: &[Value], schema: &RowSchema<'_>) -> NormalizeOutcome<NormalizeResult> {
    if rows.is_empty() {
        return Err(NormalizeError::EmptyInput);
    }

    // The parser gives every record the full header set, so checking
    // the first row is checking the source's headers.
    if let Some(first) = rows.first().and_then(|r| r.as_object()) {
        for col in schema.columns {
            if !first.contains_key(col.name) {
                return Err(NormalizeError::MissingColumn(col.name.to_string()));
            }
        }
    }

    let mut records: Vec<Value> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut dropped = DropStats::default();

    for row in rows {
        let obj = match row.as_object() {
            Some(obj) => obj,
            None => {
                dropped.malformed += 1;
                continue;
            }
        };

        match normalize_row(obj, schema) {
            Some(record) => {
                let key = bucket_key(&record, schema.key);
                match by_key.get(&key) {
                    // Last write wins: the later row replaces the
                    // earlier one in place, keeping axis order.
                    Some(&idx) => {
                        records[idx] = record;
                        dropped.superseded += 1;
                    }
                    None => {
                        by_key.insert(key, records.len());
                        records.push(record);
                    }
                }
            }
            None => dropped.malformed += 1,
        }
    }

    if records.is_empty() {
        return Err(NormalizeError::AllRowsDropped { total: rows.len() });
    }

    Ok(NormalizeResult { records, dropped })
}

/// Coerce one row; `None` means the row is malformed.
fn normalize_row(obj: &Map<String, Value>, schema: &RowSchema<'_>) -> Option<Value> {
    let mut out = Map::new();

    for col in schema.columns {
        let raw = obj.get(col.name).and_then(|v| v.as_str())?;

        match col.kind {
            FieldKind::Numeric => {
                let value = coerce_numeric(raw);
                if !value.is_finite() {
                    return None;
                }
                out.insert(col.name.to_string(), Value::Number(Number::from_f64(value)?));
            }
            FieldKind::Text => {
                if raw.trim().is_empty() {
                    return None;
                }
                out.insert(col.name.to_string(), Value::String(raw.trim().to_string()));
            }
        }
    }

    Some(Value::Object(out))
}

/// Compose the bucket key from the key columns' normalized values.
fn bucket_key(record: &Value, key_columns: &[&str]) -> String {
    key_columns
        .iter()
        .map(|name| match record.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        })
        .collect::<Vec<_>>()
        .join("\u{1f}")
}
