//! Message types and the JSON-lines writer

use crate::error::Result;
use crate::types::{JsonValue, Record};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    #[default]
    Json,
    /// Indented JSON for humans
    Pretty,
}

/// Result of a connection check
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ConnectionStatus {
    /// `SUCCEEDED` or `FAILED`
    pub status: String,
    /// Human-readable detail
    pub message: String,
}

/// A message emitted by the tap
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Message {
    /// Stream schema, emitted before the stream's first record
    Schema {
        /// Stream name
        stream: String,
        /// JSON schema of the stream's records
        schema: JsonValue,
        /// Primary key fields
        key_properties: Vec<String>,
    },
    /// One extracted record
    Record {
        /// Stream name
        stream: String,
        /// Record data
        record: Record,
        /// Extraction time
        time_extracted: DateTime<Utc>,
    },
    /// Stream catalog (`discover`)
    Catalog {
        /// Catalog document
        catalog: JsonValue,
    },
    /// Connection check result (`check`)
    ConnectionStatus {
        /// Status detail
        #[serde(rename = "connectionStatus")]
        connection_status: ConnectionStatus,
    },
    /// Stream names (`streams`)
    Streams {
        /// Stream names in catalog order
        streams: Vec<String>,
    },
    /// Per-run statistics (`read`)
    SyncSummary {
        /// Summary document
        summary: JsonValue,
    },
}

impl Message {
    /// Create a schema message
    pub fn schema(
        stream: impl Into<String>,
        schema: JsonValue,
        key_properties: Vec<String>,
    ) -> Self {
        Self::Schema {
            stream: stream.into(),
            schema,
            key_properties,
        }
    }

    /// Create a record message stamped with the current time
    pub fn record(stream: impl Into<String>, record: Record) -> Self {
        Self::Record {
            stream: stream.into(),
            record,
            time_extracted: Utc::now(),
        }
    }

    /// Create a connection status message
    pub fn connection_status(succeeded: bool, message: impl Into<String>) -> Self {
        Self::ConnectionStatus {
            connection_status: ConnectionStatus {
                status: if succeeded { "SUCCEEDED" } else { "FAILED" }.to_string(),
                message: message.into(),
            },
        }
    }

    /// Check if this is a record message
    pub fn is_record(&self) -> bool {
        matches!(self, Self::Record { .. })
    }
}

/// Writes messages, one per line
pub struct MessageWriter<W: Write> {
    out: W,
    format: OutputFormat,
    records_written: u64,
}

impl<W: Write> MessageWriter<W> {
    /// Create a JSON-lines writer
    pub fn new(out: W) -> Self {
        Self::with_format(out, OutputFormat::Json)
    }

    /// Create a writer with an explicit format
    pub fn with_format(out: W, format: OutputFormat) -> Self {
        Self {
            out,
            format,
            records_written: 0,
        }
    }

    /// Write one message
    pub fn write(&mut self, message: &Message) -> Result<()> {
        match self.format {
            OutputFormat::Json => serde_json::to_writer(&mut self.out, message)?,
            OutputFormat::Pretty => serde_json::to_writer_pretty(&mut self.out, message)?,
        }
        self.out.write_all(b"\n")?;

        if message.is_record() {
            self.records_written += 1;
        }
        Ok(())
    }

    /// Flush the underlying writer
    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    /// Number of RECORD messages written
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Consume the writer, returning the underlying output
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl MessageWriter<std::io::Stdout> {
    /// Writer on stdout
    pub fn stdout(format: OutputFormat) -> Self {
        Self::with_format(std::io::stdout(), format)
    }
}
