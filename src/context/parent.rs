//! Deriving child contexts from parent records

use super::types::Context;
use crate::decode::extract_simple_path;
use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};

/// One entry of a derived context
#[derive(Debug, Clone)]
pub enum ContextField {
    /// Copied from the parent record
    Record {
        /// Context key
        key: String,
        /// Dot path into the parent record
        path: String,
    },
    /// Same value for every parent record
    Fixed {
        /// Context key
        key: String,
        /// Value
        value: JsonValue,
    },
}

/// How a parent stream builds the context for its children
#[derive(Debug, Clone, Default)]
pub struct ChildContext {
    fields: Vec<ContextField>,
}

impl ChildContext {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy a field of the parent record into the context
    #[must_use]
    pub fn with_record_field(mut self, key: impl Into<String>, path: impl Into<String>) -> Self {
        self.fields.push(ContextField::Record {
            key: key.into(),
            path: path.into(),
        });
        self
    }

    /// Add a fixed value
    #[must_use]
    pub fn with_fixed(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.push(ContextField::Fixed {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Podcasts publish `{podcast_id: record.id, year}`
    pub fn podcast(year: i32) -> Self {
        Self::new()
            .with_record_field("podcast_id", "id")
            .with_fixed("year", year)
    }

    /// Fields of this mapping
    pub fn fields(&self) -> &[ContextField] {
        &self.fields
    }

    /// Build the context for one parent record
    ///
    /// A record field that is absent or null fails: children cannot be
    /// scoped without it.
    pub fn derive(&self, record: &Record) -> Result<Context> {
        let source = JsonValue::Object(record.clone());
        let mut context = Context::new();

        for field in &self.fields {
            match field {
                ContextField::Record { key, path } => {
                    let value = extract_simple_path(&source, path)
                        .filter(|v| !v.is_null())
                        .ok_or_else(|| Error::RecordExtraction {
                            path: path.clone(),
                            message: format!("parent record has no value for context key '{key}'"),
                        })?;
                    context.insert(key.clone(), value);
                }
                ContextField::Fixed { key, value } => {
                    context.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(context)
    }
}
