//! Tests for schema lookup

use super::*;
use crate::catalog::Catalog;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_schema_path() {
    let path = schema_path(Path::new("/opt/schemas"), "episodes");
    assert_eq!(path, PathBuf::from("/opt/schemas/episodes.json"));
}

#[test]
fn test_every_catalog_stream_has_embedded_schema() {
    let loader = SchemaLoader::embedded();
    for stream in Catalog::podbean(2021, 100).streams() {
        let schema = loader.load(&stream.schema_ref).unwrap();
        assert_eq!(schema["type"], "object", "schema for {}", stream.name);
        for key in &stream.primary_keys {
            assert!(
                schema["properties"].get(key).is_some(),
                "{} schema lacks key property {key}",
                stream.name
            );
        }
    }
}

#[test]
fn test_report_schema_shape() {
    let schema = SchemaLoader::embedded()
        .load("podcast_download_reports")
        .unwrap();
    assert_eq!(schema["properties"]["report"]["items"]["type"], "array");
}

#[test]
fn test_unknown_embedded_schema() {
    let err = SchemaLoader::embedded().load("nope").unwrap_err();
    assert!(matches!(err, Error::Schema { ref stream, .. } if stream == "nope"));
}

#[test]
fn test_load_from_dir() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("episodes.json"),
        r#"{"type": "object", "properties": {"id": {"type": "string"}}}"#,
    )
    .unwrap();

    let loader = SchemaLoader::from_dir(dir.path());
    assert_eq!(loader.dir(), Some(dir.path()));

    let schema = loader.load("episodes").unwrap();
    assert_eq!(schema["properties"]["id"]["type"], "string");

    let err = loader.load("podcasts").unwrap_err();
    assert!(err.to_string().contains("podcasts.json"));
}

#[test]
fn test_load_rejects_non_object() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("episodes.json"), "[1, 2]").unwrap();
    fs::write(dir.path().join("podcasts.json"), "{not json").unwrap();

    let loader = SchemaLoader::from_dir(dir.path());
    assert!(loader.load("episodes").is_err());
    assert!(loader.load("podcasts").is_err());
}
