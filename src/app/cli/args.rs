//! Command-line arguments
//!
//! Every setting is optional here so that the layers underneath (config
//! file, then built-in defaults) can fill whatever the command line and the
//! environment leave unset.

use crate::app::settings::Environment;
use crate::core::logging::LogFormat;
use crate::fetcher::{CloneBackend, FolderNaming};
use crate::reporter::ReportFormat;
use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "depweight")]
#[command(about = "Clone Go repositories and map how often each package imports each path")]
#[command(version = crate::core::version::version())]
#[command(long_version = crate::core::version::long_version())]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Args {
    /// Repositories to fetch at startup*
    #[arg(short = 'r', long = "repo", value_name = "URLS", value_delimiter = ',', action = ArgAction::Append)]
    pub repos: Vec<String>,

    /// Fetch and scan the --repo list, then exit without serving HTTP
    #[arg(long = "no-server")]
    pub no_server: bool,

    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// HTTP listen address (`host:port` or `:port`)
    #[arg(short = 'a', long = "listen", value_name = "ADDR", env = "HTTP_LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    /// Deployment environment; sets the shutdown grace period
    #[arg(short = 'e', long = "env", value_name = "ENV", env = "ENV")]
    pub environment: Option<Environment>,

    /// Clone destination and scan root
    #[arg(short = 's', long = "staging-dir", value_name = "DIR")]
    pub staging_dir: Option<PathBuf>,

    /// Only host accepted for http(s) URLs
    #[arg(long = "host", value_name = "HOST")]
    pub expected_host: Option<String>,

    /// How repositories are cloned
    #[arg(long = "clone-backend", value_name = "BACKEND")]
    pub clone_backend: Option<CloneBackend>,

    /// How staging folder names are derived from URLs
    #[arg(long = "folder-naming", value_name = "POLICY")]
    pub folder_naming: Option<FolderNaming>,

    /// Longest accepted source line in bytes; files with longer lines are skipped
    #[arg(long = "max-line-length", value_name = "BYTES", value_parser = parse_positive)]
    pub max_line_length: Option<usize>,

    /// Glob patterns (relative to the checkout) to leave out of scans*
    #[arg(short = 'x', long = "exclude", value_name = "GLOBS", value_delimiter = ',', action = ArgAction::Append)]
    pub exclude: Vec<String>,

    /// Report layout
    #[arg(long = "report-format", value_name = "FORMAT")]
    pub report_format: Option<ReportFormat>,

    /// Append reports to this file instead of printing them
    #[arg(long = "report-file", value_name = "FILE")]
    pub report_file: Option<PathBuf>,

    /// Diagram service API key; enables diagram creation
    #[arg(long = "diagram-api-key", value_name = "KEY", env = "CACOO_API_KEY", hide_env_values = true)]
    pub diagram_api_key: Option<String>,

    /// Diagram service base URL
    #[arg(long = "diagram-base-url", value_name = "URL", env = "CACOO_BASE_URL")]
    pub diagram_base_url: Option<String>,

    /// Diagram service folder receiving new diagrams
    #[arg(long = "diagram-folder-id", value_name = "ID", env = "CACOO_FOLDER_ID")]
    pub diagram_folder_id: Option<String>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force colored output
    #[arg(short = 'g', long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(short = 'n', long = "no-color")]
    pub no_color: bool,
}

fn parse_positive(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a valid positive integer", value)),
    }
}

impl Args {
    /// Parse from the process arguments with styled help
    pub fn parse_with_styles(use_color: bool) -> Self {
        use clap::{CommandFactory, FromArgMatches};

        let command = Self::command().styles(crate::core::styles::palette_to_clap(use_color));
        let matches = command.get_matches();
        match Self::from_arg_matches(&matches) {
            Ok(args) => args,
            Err(e) => e.exit(),
        }
    }
}
