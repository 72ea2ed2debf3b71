//! Tests for output module

use super::*;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn lines(writer: MessageWriter<Vec<u8>>) -> Vec<Value> {
    let bytes = writer.into_inner();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[test]
fn test_schema_message() {
    let mut writer = MessageWriter::new(Vec::new());
    writer
        .write(&Message::schema(
            "episodes",
            json!({"type": "object"}),
            vec!["id".to_string()],
        ))
        .unwrap();

    assert_eq!(
        lines(writer),
        vec![json!({
            "type": "SCHEMA",
            "stream": "episodes",
            "schema": {"type": "object"},
            "key_properties": ["id"]
        })]
    );
}

#[test]
fn test_record_message() {
    let record = json!({"id": "e1", "title": "Pilot"})
        .as_object()
        .cloned()
        .unwrap();

    let mut writer = MessageWriter::new(Vec::new());
    writer.write(&Message::record("episodes", record)).unwrap();
    assert_eq!(writer.records_written(), 1);

    let out = lines(writer);
    assert_eq!(out[0]["type"], "RECORD");
    assert_eq!(out[0]["stream"], "episodes");
    assert_eq!(out[0]["record"], json!({"id": "e1", "title": "Pilot"}));
    let extracted = out[0]["time_extracted"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(extracted).is_ok());
}

#[test]
fn test_connection_status_message() {
    let mut writer = MessageWriter::new(Vec::new());
    writer
        .write(&Message::connection_status(false, "HTTP 401: denied"))
        .unwrap();
    assert_eq!(writer.records_written(), 0);

    assert_eq!(
        lines(writer)[0],
        json!({
            "type": "CONNECTION_STATUS",
            "connectionStatus": {"status": "FAILED", "message": "HTTP 401: denied"}
        })
    );
}

#[test]
fn test_summary_and_catalog_messages() {
    let mut writer = MessageWriter::new(Vec::new());
    writer
        .write(&Message::Catalog {
            catalog: json!({"streams": []}),
        })
        .unwrap();
    writer
        .write(&Message::SyncSummary {
            summary: json!({"status": "SUCCEEDED"}),
        })
        .unwrap();

    let out = lines(writer);
    assert_eq!(out[0], json!({"type": "CATALOG", "catalog": {"streams": []}}));
    assert_eq!(
        out[1],
        json!({"type": "SYNC_SUMMARY", "summary": {"status": "SUCCEEDED"}})
    );
}

#[test]
fn test_pretty_format() {
    let mut writer = MessageWriter::with_format(Vec::new(), OutputFormat::Pretty);
    writer
        .write(&Message::Catalog {
            catalog: json!({"streams": []}),
        })
        .unwrap();

    let text = String::from_utf8(writer.into_inner()).unwrap();
    assert!(text.contains("\n  \"catalog\""));
}

#[test]
fn test_streams_message() {
    let mut writer = MessageWriter::new(Vec::new());
    writer
        .write(&Message::Streams {
            streams: vec!["episodes".to_string(), "podcasts".to_string()],
        })
        .unwrap();

    assert_eq!(writer.records_written(), 0);
    assert_eq!(
        lines(writer),
        vec![json!({"type": "STREAMS", "streams": ["episodes", "podcasts"]})]
    );
}
