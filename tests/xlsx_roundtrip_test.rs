use anyhow::Result;
use calamine::{open_workbook, DataType, Reader, Xlsx};
use serde_json::{json, Value};
use tempfile::TempDir;

use slack_sheet_sync::{flatten, to_table, Record, SheetSink, XlsxSink};

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

#[tokio::test]
async fn test_written_workbook_reads_back_with_typed_cells() -> Result<()> {
    let records: Vec<Record> = vec![
        record(json!({
            "id": "C1",
            "name": "general",
            "is_private": true,
            "topic": {"value": "announcements"},
            "num_members": 42
        })),
        record(json!({
            "id": "C2",
            "name": "random",
            "is_private": false,
            "topic": {"value": "anything"},
            "num_members": 7
        })),
    ];

    let flat: Vec<Record> = records.iter().map(flatten).collect();
    let table = to_table(&flat, None)?;

    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("export.xlsx");

    let mut sink = XlsxSink::new(&path);
    sink.write_table("Channels", &table).await?;
    sink.finish().await?;

    let mut workbook: Xlsx<_> = open_workbook(&path)?;
    let range = workbook
        .worksheet_range("Channels")
        .expect("sheet `Channels` exists")?;

    let rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
        .collect();

    assert_eq!(
        rows[0],
        ["id", "name", "is_private", "topic.value", "num_members"]
    );
    assert_eq!(rows[1], ["C1", "general", "true", "announcements", "42"]);
    // `false` was coerced to an empty cell before the sink saw it.
    assert_eq!(rows[2], ["C2", "random", "", "anything", "7"]);

    Ok(())
}

#[tokio::test]
async fn test_invalid_sheet_name_is_sanitised_on_write() -> Result<()> {
    let table = to_table(
        &[record(json!({"id": "C1"}))],
        None,
    )?;

    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("export.xlsx");

    let mut sink = XlsxSink::new(&path);
    sink.write_table("team/ops: chan?", &table).await?;
    sink.finish().await?;

    let mut workbook: Xlsx<_> = open_workbook(&path)?;
    assert!(workbook.worksheet_range("team_ops_ chan_").is_some());

    Ok(())
}
