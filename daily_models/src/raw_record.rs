use derive_more::{Deref, From, Into};
use serde_json::{Map, Value};
use stack_string::format_sstr;
use std::collections::{BTreeMap, HashMap};

use daily_lib::errors::DailyError as Error;

pub const SLEEP_PREFIX: &str = "sleep";
pub const STEPS_PREFIX: &str = "steps";

/// The decoded `--data` payload: keys prefixed `sleep_` or `steps_` mapping
/// to arrays, index-keyed objects or single scalars.
#[derive(Debug, Clone, Default, PartialEq, Deref, From, Into)]
pub struct RawRecord(Map<String, Value>);

/// Rows of one key prefix, keyed by sample index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    rows: BTreeMap<usize, HashMap<String, Value>>,
}

impl RawRecord {
    /// # Errors
    /// Return error if `data` isn't a JSON object
    pub fn from_json(data: &str) -> Result<Self, Error> {
        match serde_json::from_str(data)? {
            Value::Object(map) => Ok(Self(map)),
            other => Err(Error::FormatError(format_sstr!(
                "expected a JSON object, got {other}"
            ))),
        }
    }

    /// Split entries into the sleep table and the steps table.
    #[must_use]
    pub fn partition(&self) -> (RawTable, RawTable) {
        let mut sleep = RawTable::default();
        let mut steps = RawTable::default();
        for (key, value) in &self.0 {
            if key.starts_with(SLEEP_PREFIX) {
                sleep.insert_column(key, value);
            } else if key.starts_with(STEPS_PREFIX) {
                steps.insert_column(key, value);
            }
        }
        (sleep, steps)
    }
}

impl RawTable {
    fn insert_column(&mut self, column: &str, value: &Value) {
        for (index, cell) in explode_column(value) {
            self.rows
                .entry(index)
                .or_default()
                .insert(column.into(), cell.clone());
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.rows.values().any(|row| row.contains_key(column))
    }

    pub fn rows(&self) -> impl Iterator<Item = (usize, &HashMap<String, Value>)> {
        self.rows.iter().map(|(index, row)| (*index, row))
    }

    /// Cells of `column` in index order, rows missing it are skipped.
    pub fn column<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.values().filter_map(move |row| row.get(column))
    }
}

fn explode_column(value: &Value) -> Vec<(usize, &Value)> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().enumerate().collect(),
        Value::Object(items) => items
            .iter()
            .enumerate()
            .map(|(position, (key, cell))| (key.parse().unwrap_or(position), cell))
            .collect(),
        scalar => vec![(0, scalar)],
    }
}

/// String content of a cell.
/// # Errors
/// Return `FormatError` if the cell isn't a string
pub fn cell_as_str<'a>(column: &str, cell: &'a Value) -> Result<&'a str, Error> {
    cell.as_str().ok_or_else(|| {
        Error::FormatError(format_sstr!("{column}: expected a string, got {cell}"))
    })
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn truncate_f64(f: f64) -> Option<i64> {
    (f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64).then(|| f as i64)
}

/// Integer content of a cell, numeric strings are accepted and floats are
/// truncated.
/// # Errors
/// Return `FormatError` if the cell isn't numeric, or is a float that is
/// not finite or out of `i64` range
pub fn cell_as_i64(column: &str, cell: &Value) -> Result<i64, Error> {
    let invalid =
        || Error::FormatError(format_sstr!("{column}: expected an integer, got {cell}"));
    match cell {
        Value::Null => Ok(0),
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(truncate_f64))
            .ok_or_else(invalid),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(truncate_f64))
                .ok_or_else(invalid)
        }
        _ => Err(invalid()),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use daily_lib::errors::DailyError as Error;

    use crate::raw_record::{cell_as_i64, cell_as_str, RawRecord};

    #[test]
    fn test_partition_arrays() -> Result<(), Error> {
        let record = RawRecord::from_json(
            r#"{
                "sleep_start_date": ["18 Oct 2026 at 23:10", "19 Oct 2026 at 01:00"],
                "sleep_end_date": ["19 Oct 2026 at 01:00", "19 Oct 2026 at 03:00"],
                "sleep_label": ["Core", "REM"],
                "steps_value": ["100", "250", "50"],
                "other": 1
            }"#,
        )?;
        let (sleep, steps) = record.partition();
        assert_eq!(sleep.len(), 2);
        assert_eq!(steps.len(), 3);
        assert!(sleep.has_column("sleep_label"));
        assert!(!sleep.has_column("steps_value"));

        let labels: Vec<_> = sleep.column("sleep_label").collect();
        assert_eq!(labels, vec![&json!("Core"), &json!("REM")]);
        Ok(())
    }

    #[test]
    fn test_partition_objects_and_scalars() -> Result<(), Error> {
        let record = RawRecord::from_json(
            r#"{
                "sleep_label": {"1": "REM", "0": "Core"},
                "sleep_end_date": "19 Oct 2026 at 07:00",
                "steps_value": 1234
            }"#,
        )?;
        let (sleep, steps) = record.partition();
        let rows: Vec<_> = sleep.rows().map(|(index, _)| index).collect();
        assert_eq!(rows, vec![0, 1]);
        let labels: Vec<_> = sleep.column("sleep_label").collect();
        assert_eq!(labels, vec![&json!("Core"), &json!("REM")]);
        let ends: Vec<_> = sleep.column("sleep_end_date").collect();
        assert_eq!(ends, vec![&json!("19 Oct 2026 at 07:00")]);
        assert_eq!(steps.len(), 1);
        Ok(())
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(matches!(
            RawRecord::from_json("[1, 2]"),
            Err(Error::FormatError(_))
        ));
        assert!(matches!(
            RawRecord::from_json("{not json"),
            Err(Error::SerdeJsonError(_))
        ));
    }

    #[test]
    fn test_cells() -> Result<(), Error> {
        assert_eq!(cell_as_i64("steps_value", &json!("250"))?, 250);
        assert_eq!(cell_as_i64("steps_value", &json!(" 42 "))?, 42);
        assert_eq!(cell_as_i64("steps_value", &json!(12.9))?, 12);
        assert_eq!(cell_as_i64("steps_value", &json!("7.0"))?, 7);
        assert_eq!(cell_as_i64("steps_value", &Value::Null)?, 0);
        assert!(cell_as_i64("steps_value", &json!("many")).is_err());
        for bad in ["NaN", "inf", "-inf", "1e30"] {
            assert!(matches!(
                cell_as_i64("steps_value", &json!(bad)),
                Err(Error::FormatError(_))
            ));
        }
        assert!(cell_as_i64("steps_value", &json!(1e30)).is_err());
        assert!(cell_as_i64("steps_value", &json!([1])).is_err());
        assert_eq!(cell_as_str("sleep_label", &json!("REM"))?, "REM");
        assert!(cell_as_str("sleep_label", &json!(3)).is_err());
        Ok(())
    }
}
