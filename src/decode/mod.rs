//! Response decoder module
//!
//! Supports: JSON (API pages), CSV (report downloads)
//!
//! # Overview
//!
//! API pages are JSON documents whose records live at a configured path.
//! Report files are comma-delimited CSV with a header row; every value is
//! kept as the string that appeared in the file.

mod decoders;

pub use decoders::{extract_records, extract_simple_path, CsvDecoder, JsonDecoder};
