//! Resolved application settings
//!
//! [`Settings::resolve`] turns the layered [`Args`] (command line and
//! environment, then config file) into concrete values, filling anything
//! still unset from built-in defaults.

use crate::app::cli::args::Args;
use crate::core::error_handling::ContextualError;
use crate::core::logging::{LogFormat, LogSettings};
use crate::fetcher::{CloneBackend, FetchConfig};
use crate::reporter::{
    diagram::DEFAULT_BASE_URL, ConsoleReporter, DiagramClient, DiagramReporter, ReportError,
    ReportFormat, Reporter,
};
use crate::scanner::{ScannerConfig, DEFAULT_MAX_LINE_LENGTH};
use crate::service::ServiceConfig;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_STAGING_DIR: &str = "./tmp";
pub const DEFAULT_EXPECTED_HOST: &str = "github.com";

/// Deployment environment
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    #[default]
    #[value(alias = "development")]
    #[serde(alias = "development")]
    #[strum(to_string = "dev", serialize = "development")]
    Dev,
    #[value(alias = "production")]
    #[serde(alias = "production")]
    #[strum(to_string = "prod", serialize = "production")]
    Prod,
}

impl Environment {
    /// How long outstanding work may run after a shutdown signal
    pub fn shutdown_grace(self) -> Duration {
        match self {
            Environment::Dev => Duration::from_secs(1),
            Environment::Prod => Duration::from_secs(5),
        }
    }

    /// Log level used when none is configured
    pub fn default_log_level(self) -> &'static str {
        match self {
            Environment::Dev => "info",
            Environment::Prod => "warn",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("Error reading configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::MissingFile { .. } => Some("check the --config-file path"),
            ConfigError::Read { .. } | ConfigError::Parse { .. } => {
                Some("fix or remove the configuration file")
            }
            ConfigError::InvalidValue { message, .. } => Some(message.as_str()),
        }
    }
}

/// Credentials for the diagram service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSettings {
    pub api_key: String,
    pub base_url: String,
    pub folder_id: String,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub listen_addr: SocketAddr,
    pub environment: Environment,
    pub service: ServiceConfig,
    pub clone_backend: CloneBackend,
    pub report_format: ReportFormat,
    pub report_file: Option<PathBuf>,
    pub diagram: Option<DiagramSettings>,
    pub log: LogSettings,
    pub use_color: bool,
    pub repos: Vec<String>,
    pub serve: bool,
}

/// Accepts `host:port` and the bare `:port` form (all interfaces)
pub fn parse_listen_addr(value: &str) -> Result<SocketAddr, ConfigError> {
    let value = value.trim();
    let candidate = match value.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{}", port),
        None => value.to_string(),
    };
    candidate.parse().map_err(|e: std::net::AddrParseError| ConfigError::InvalidValue {
        key: "listen-addr".to_string(),
        message: format!("'{}' is not a socket address ({})", value, e),
    })
}

impl Settings {
    pub fn resolve(args: Args, stdout_is_tty: bool) -> Result<Self, ConfigError> {
        let environment = args.environment.unwrap_or_default();
        let listen_addr =
            parse_listen_addr(args.listen_addr.as_deref().unwrap_or(DEFAULT_LISTEN_ADDR))?;

        let use_color = !args.no_color && (args.color || stdout_is_tty);

        let log = LogSettings {
            level: args
                .log_level
                .unwrap_or_else(|| environment.default_log_level().to_string()),
            format: args.log_format.unwrap_or(LogFormat::Text),
            file: args.log_file.filter(|p| p.as_os_str() != "none"),
            color: use_color,
        };

        let diagram = match (args.diagram_api_key, args.diagram_folder_id) {
            (Some(api_key), Some(folder_id)) if !api_key.is_empty() => Some(DiagramSettings {
                api_key,
                base_url: args
                    .diagram_base_url
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                folder_id,
            }),
            (Some(api_key), None) if !api_key.is_empty() => {
                return Err(ConfigError::InvalidValue {
                    key: "diagram-folder-id".to_string(),
                    message: "a folder id is required when a diagram API key is set".to_string(),
                })
            }
            _ => None,
        };

        let service = ServiceConfig {
            fetch: FetchConfig {
                staging_dir: args
                    .staging_dir
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_STAGING_DIR)),
                expected_host: args
                    .expected_host
                    .unwrap_or_else(|| DEFAULT_EXPECTED_HOST.to_string()),
                folder_naming: args.folder_naming.unwrap_or_default(),
            },
            scanner: ScannerConfig {
                max_line_length: args.max_line_length.unwrap_or(DEFAULT_MAX_LINE_LENGTH),
                exclude: args.exclude,
            },
        };

        Ok(Self {
            listen_addr,
            environment,
            service,
            clone_backend: args.clone_backend.unwrap_or_default(),
            report_format: args.report_format.unwrap_or_default(),
            report_file: args.report_file,
            diagram,
            log,
            use_color,
            repos: args.repos,
            serve: !args.no_server,
        })
    }

    /// Console reporter always, diagram reporter when credentials are configured
    pub fn reporters(&self) -> Result<Vec<Arc<dyn Reporter>>, ReportError> {
        let mut reporters: Vec<Arc<dyn Reporter>> = vec![Arc::new(ConsoleReporter::new(
            self.report_format,
            self.report_file.clone(),
            self.use_color,
        ))];

        if let Some(diagram) = &self.diagram {
            let client = DiagramClient::new(&diagram.api_key, &diagram.base_url, &diagram.folder_id)?;
            reporters.push(Arc::new(DiagramReporter::new(client)));
        }

        Ok(reporters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(Args::default(), false).unwrap();

        assert_eq!(settings.listen_addr, "127.0.0.1:8080".parse().unwrap());
        assert_eq!(settings.environment, Environment::Dev);
        assert_eq!(settings.service.fetch.staging_dir, PathBuf::from("./tmp"));
        assert_eq!(settings.service.fetch.expected_host, "github.com");
        assert_eq!(settings.service.scanner.max_line_length, 4096);
        assert_eq!(settings.clone_backend, CloneBackend::Git);
        assert_eq!(settings.log.level, "info");
        assert!(settings.diagram.is_none());
        assert!(settings.serve);
        assert!(!settings.use_color);
    }

    #[test]
    fn test_port_only_listen_addr() {
        assert_eq!(
            parse_listen_addr(":9090").unwrap(),
            "0.0.0.0:9090".parse().unwrap()
        );
        assert!(matches!(
            parse_listen_addr("localhost"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn test_environment_grace_and_log_level() {
        assert_eq!(Environment::Dev.shutdown_grace(), Duration::from_secs(1));
        assert_eq!(Environment::Prod.shutdown_grace(), Duration::from_secs(5));
        assert_eq!(Environment::from_str("production").unwrap(), Environment::Prod);
        assert_eq!(Environment::Prod.to_string(), "prod");

        let args = Args {
            environment: Some(Environment::Prod),
            ..Args::default()
        };
        assert_eq!(Settings::resolve(args, false).unwrap().log.level, "warn");
    }

    #[test]
    fn test_diagram_requires_folder_id() {
        let args = Args {
            diagram_api_key: Some("key".to_string()),
            ..Args::default()
        };
        assert!(matches!(
            Settings::resolve(args, false),
            Err(ConfigError::InvalidValue { ref key, .. }) if key == "diagram-folder-id"
        ));
    }

    #[test]
    fn test_diagram_reporter_enabled_by_credentials() {
        let args = Args {
            diagram_api_key: Some("key".to_string()),
            diagram_folder_id: Some("7".to_string()),
            ..Args::default()
        };
        let settings = Settings::resolve(args, false).unwrap();

        let diagram = settings.diagram.as_ref().unwrap();
        assert_eq!(diagram.base_url, DEFAULT_BASE_URL);

        let names: Vec<String> = settings
            .reporters()
            .unwrap()
            .iter()
            .map(|r| r.name().to_string())
            .collect();
        assert_eq!(names, vec!["console", "diagram"]);
    }

    #[test]
    fn test_color_resolution() {
        let tty = Settings::resolve(Args::default(), true).unwrap();
        assert!(tty.use_color);

        let args = Args {
            no_color: true,
            ..Args::default()
        };
        assert!(!Settings::resolve(args, true).unwrap().use_color);
    }

    #[test]
    fn test_log_file_none_disables_file_logging() {
        let args = Args {
            log_file: Some(PathBuf::from("none")),
            ..Args::default()
        };
        assert_eq!(Settings::resolve(args, false).unwrap().log.file, None);
    }
}
