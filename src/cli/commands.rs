//! CLI commands and argument parsing

use crate::output::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Podbean tap CLI
#[derive(Parser, Debug)]
#[command(name = "tap-podbean")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON (takes precedence over --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test connection to the API
    Check,

    /// Print the stream catalog with schemas
    Discover,

    /// Read data from streams
    Read {
        /// Streams to sync (comma-separated, empty = all)
        #[arg(long, value_delimiter = ',')]
        streams: Vec<String>,

        /// Maximum records per stream
        #[arg(long)]
        max_records: Option<usize>,

        /// Keep going after a stream fails
        #[arg(long)]
        no_fail_fast: bool,
    },

    /// List available stream names (no schemas)
    Streams,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_read() {
        let cli = Cli::try_parse_from([
            "tap-podbean",
            "-C",
            "config.json",
            "read",
            "--streams",
            "podcasts,episodes",
            "--max-records",
            "10",
        ])
        .unwrap();

        assert_eq!(cli.config, Some(PathBuf::from("config.json")));
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(!cli.verbose);

        let Commands::Read {
            streams,
            max_records,
            no_fail_fast,
        } = cli.command
        else {
            panic!("expected read");
        };
        assert_eq!(streams, vec!["podcasts", "episodes"]);
        assert_eq!(max_records, Some(10));
        assert!(!no_fail_fast);
    }

    #[test]
    fn test_parse_read_defaults() {
        let cli = Cli::try_parse_from(["tap-podbean", "read", "--no-fail-fast"]).unwrap();
        let Commands::Read {
            streams,
            max_records,
            no_fail_fast,
        } = cli.command
        else {
            panic!("expected read");
        };
        assert!(streams.is_empty());
        assert_eq!(max_records, None);
        assert!(no_fail_fast);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tap-podbean",
            "check",
            "--config-json",
            r#"{"access_token":"t"}"#,
            "-f",
            "pretty",
            "-v",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Check));
        assert_eq!(cli.config_json.as_deref(), Some(r#"{"access_token":"t"}"#));
        assert_eq!(cli.format, OutputFormat::Pretty);
        assert!(cli.verbose);
    }

    #[test]
    fn test_rejects_unknown_command() {
        assert!(Cli::try_parse_from(["tap-podbean", "serve"]).is_err());
        assert!(Cli::try_parse_from(["tap-podbean", "-f", "parquet", "discover"]).is_err());
    }
}
