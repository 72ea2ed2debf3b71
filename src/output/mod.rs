//! Output module
//!
//! Singer-style messages written as JSON lines to stdout (or any
//! `io::Write`). Logs never go through here; they are written to stderr by
//! the tracing subscriber.

mod writer;

pub use writer::{ConnectionStatus, Message, MessageWriter, OutputFormat};

#[cfg(test)]
mod tests;
