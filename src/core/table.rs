use std::collections::HashSet;

use serde_json::Value;

use crate::core::flatten::Record;
use crate::utils::error::{Result, SyncError};

/// A rectangular grid destined for one spreadsheet sheet: a header row of
/// unique field names plus data rows positionally aligned with it.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Builds a table, rejecting duplicate header fields and rows whose
    /// length differs from the header's.
    pub fn new(header: Vec<String>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut seen = HashSet::new();
        for field in &header {
            if !seen.insert(field.as_str()) {
                return Err(SyncError::TabulationError {
                    message: format!("duplicate header field `{}`", field),
                });
            }
        }

        for (index, row) in rows.iter().enumerate() {
            if row.len() != header.len() {
                return Err(SyncError::TabulationError {
                    message: format!(
                        "row {} has {} cells, header has {}",
                        index,
                        row.len(),
                        header.len()
                    ),
                });
            }
        }

        Ok(Self { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Assembles flat records into a [`Table`]. The header is the explicit
/// `schema` when given, otherwise the key set of the *first* record; later
/// records only fill the cells that header asks for.
///
/// A cell is the record's value for the field, or an empty string when the
/// field is absent *or falsy*: `null`, `false`, numeric `0` and `""` all
/// collapse to an empty cell, matching the `value || ""` fallback of the
/// sheets this replaces.
///
/// An empty record sequence without an explicit schema has no header to
/// infer and is rejected.
pub fn to_table(records: &[Record], schema: Option<&[String]>) -> Result<Table> {
    let header: Vec<String> = match schema {
        Some(fields) => fields.to_vec(),
        None => match records.first() {
            Some(first) => first.keys().cloned().collect(),
            None => {
                return Err(SyncError::TabulationError {
                    message: "cannot infer a header from an empty record sequence; \
                              supply an explicit field list"
                        .to_string(),
                })
            }
        },
    };

    let rows = records
        .iter()
        .map(|record| {
            header
                .iter()
                .map(|field| cell_value(record.get(field)))
                .collect()
        })
        .collect();

    Table::new(header, rows)
}

fn cell_value(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) => Value::String(String::new()),
        Some(Value::Bool(false)) => Value::String(String::new()),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Value::String(String::new()),
        Some(other) => other.clone(),
    }
}

/// Converts a table back into records, one per data row, keyed exactly by
/// the header fields. A header-only table yields an empty sequence.
pub fn from_table(table: &Table) -> Vec<Record> {
    table
        .rows()
        .iter()
        .map(|row| {
            table
                .header()
                .iter()
                .cloned()
                .zip(row.iter().cloned())
                .collect()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {}", other),
        }
    }

    #[test]
    fn test_header_inferred_from_first_record() {
        let records = vec![
            record(json!({"id": "C1", "name": "general"})),
            record(json!({"id": "C2", "name": "random", "extra": true})),
        ];

        let table = to_table(&records, None).unwrap();

        assert_eq!(table.header(), ["id", "name"]);
        assert_eq!(table.row_count(), 2);
        // `extra` is not in the first record's key set, so it is dropped.
        assert_eq!(table.rows()[1], vec![json!("C2"), json!("random")]);
    }

    #[test]
    fn test_explicit_schema_and_missing_fields() {
        let records = vec![record(json!({"name": "general"}))];
        let schema = ["id".to_string(), "name".to_string()];

        let table = to_table(&records, Some(&schema)).unwrap();

        assert_eq!(table.header(), ["id", "name"]);
        assert_eq!(table.rows()[0], vec![json!(""), json!("general")]);
    }

    #[test]
    fn test_falsy_values_become_empty_cells() {
        let records = vec![record(json!({"a": 0, "b": false, "c": "x"}))];

        let table = to_table(&records, None).unwrap();

        assert_eq!(table.header(), ["a", "b", "c"]);
        assert_eq!(table.rows()[0], vec![json!(""), json!(""), json!("x")]);
    }

    #[test]
    fn test_truthy_values_pass_through() {
        let records = vec![record(json!({"n": 42, "f": 1.5, "b": true, "s": "hi"}))];

        let table = to_table(&records, None).unwrap();

        assert_eq!(
            table.rows()[0],
            vec![json!(42), json!(1.5), json!(true), json!("hi")]
        );
    }

    #[test]
    fn test_rows_always_match_header_length() {
        let records = vec![
            record(json!({"id": "C1", "name": "general", "topic.value": "hello"})),
            record(json!({"id": "C2"})),
            record(json!({"name": "only-name"})),
        ];

        let table = to_table(&records, None).unwrap();

        for row in table.rows() {
            assert_eq!(row.len(), table.header().len());
        }
    }

    #[test]
    fn test_empty_records_without_schema_fail_fast() {
        let err = to_table(&[], None).unwrap_err();
        assert!(err.to_string().contains("empty record sequence"));
    }

    #[test]
    fn test_empty_records_with_schema_yield_header_only_table() {
        let schema = ["id".to_string(), "name".to_string()];
        let table = to_table(&[], Some(&schema)).unwrap();

        assert_eq!(table.header(), ["id", "name"]);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_from_table_header_only_is_empty() {
        let table = Table::new(vec!["a".to_string(), "b".to_string()], vec![]).unwrap();
        assert!(from_table(&table).is_empty());
    }

    #[test]
    fn test_round_trip_for_identically_keyed_records() {
        let records = vec![
            record(json!({"id": "U1", "name": "alice", "admin": true})),
            record(json!({"id": "U2", "name": "bob", "admin": 12})),
        ];

        let table = to_table(&records, None).unwrap();

        assert_eq!(from_table(&table), records);
    }

    #[test]
    fn test_table_rejects_ragged_rows() {
        let result = Table::new(
            vec!["a".to_string(), "b".to_string()],
            vec![vec![json!(1)]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_table_rejects_duplicate_header() {
        let result = Table::new(vec!["a".to_string(), "a".to_string()], vec![]);
        assert!(result.is_err());
    }
}
