//! Stream schemas
//!
//! Every stream is described by one JSON-schema document named after the
//! stream. Schemas are read from a configured directory when one is given,
//! otherwise from the copies embedded in the binary.

use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Schema documents compiled into the binary
static EMBEDDED_SCHEMAS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut m = HashMap::new();
    m.insert(
        "private_members",
        include_str!("../../schemas/private_members.json"),
    );
    m.insert("episodes", include_str!("../../schemas/episodes.json"));
    m.insert("podcasts", include_str!("../../schemas/podcasts.json"));
    m.insert(
        "podcast_download_reports",
        include_str!("../../schemas/podcast_download_reports.json"),
    );
    m.insert(
        "podcast_engagement_reports",
        include_str!("../../schemas/podcast_engagement_reports.json"),
    );
    m
});

/// Path of a stream's schema file inside `dir`
pub fn schema_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.json"))
}

/// Get an embedded schema document by name
pub fn embedded_schema(name: &str) -> Option<&'static str> {
    EMBEDDED_SCHEMAS.get(name).copied()
}

/// Loads schema documents by stream name
#[derive(Debug, Clone, Default)]
pub struct SchemaLoader {
    dir: Option<PathBuf>,
}

impl SchemaLoader {
    /// Load embedded schemas only
    pub fn embedded() -> Self {
        Self::default()
    }

    /// Load schemas from a directory
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Schema directory, if any
    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Load and parse the schema named `name`
    pub fn load(&self, name: &str) -> Result<JsonValue> {
        let text = match &self.dir {
            Some(dir) => {
                let path = schema_path(dir, name);
                std::fs::read_to_string(&path).map_err(|e| {
                    Error::schema(name, format!("cannot read {}: {e}", path.display()))
                })?
            }
            None => embedded_schema(name)
                .ok_or_else(|| Error::schema(name, "no embedded schema"))?
                .to_string(),
        };

        let schema: JsonValue = serde_json::from_str(&text)
            .map_err(|e| Error::schema(name, format!("invalid JSON: {e}")))?;

        if !schema.is_object() {
            return Err(Error::schema(name, "schema must be a JSON object"));
        }

        Ok(schema)
    }
}

#[cfg(test)]
mod tests;
