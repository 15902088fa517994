//! Config file layering tests

use crate::app::cli::Args;
use crate::app::settings::{ConfigError, Environment};
use crate::core::logging::LogFormat;
use crate::fetcher::CloneBackend;
use std::path::PathBuf;
use tempfile::TempDir;

fn table(source: &str) -> toml::Table {
    toml::from_str(source).expect("valid TOML")
}

#[test]
fn test_file_fills_unset_fields() {
    let mut args = Args::default();
    args.apply_toml_values(&table(
        r#"
        listen-addr = ":9000"
        env = "prod"
        staging-dir = "/srv/staging"
        clone-backend = "gix"
        max-line-length = 1024
        log-format = "json"
        exclude = ["testdata/**", "*.pb.go"]
        "#,
    ))
    .unwrap();

    assert_eq!(args.listen_addr.as_deref(), Some(":9000"));
    assert_eq!(args.environment, Some(Environment::Prod));
    assert_eq!(args.staging_dir, Some(PathBuf::from("/srv/staging")));
    assert_eq!(args.clone_backend, Some(CloneBackend::Gix));
    assert_eq!(args.max_line_length, Some(1024));
    assert_eq!(args.log_format, Some(LogFormat::Json));
    assert_eq!(args.exclude, vec!["testdata/**", "*.pb.go"]);
}

#[test]
fn test_command_line_wins_over_file() {
    let mut args = Args {
        staging_dir: Some(PathBuf::from("./cli")),
        exclude: vec!["gen/**".to_string()],
        no_color: true,
        ..Args::default()
    };
    args.apply_toml_values(&table(
        "staging-dir = \"./file\"\nexclude = \"a/**,b/**\"\ncolor = true\n",
    ))
    .unwrap();

    assert_eq!(args.staging_dir, Some(PathBuf::from("./cli")));
    assert_eq!(args.exclude, vec!["gen/**", "a/**", "b/**"]);
    assert!(!args.color);
    assert!(args.no_color);
}

#[test]
fn test_bad_values_reported_by_key() {
    let cases = [
        "clone-backend = \"svn\"",
        "max-line-length = -1",
        "staging-dir = 3",
        "color = \"yes\"",
        "exclude = [1, 2]",
    ];

    for source in cases {
        let mut args = Args::default();
        let result = args.apply_toml_values(&table(source));
        assert!(
            matches!(result, Err(ConfigError::InvalidValue { .. })),
            "Expected InvalidValue for {:?}, got {:?}",
            source,
            result
        );
    }
}

#[tokio::test]
async fn test_explicit_missing_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let mut args = Args {
        config_file: Some(dir.path().join("absent.toml")),
        ..Args::default()
    };

    assert!(matches!(
        args.apply_config_file().await,
        Err(ConfigError::MissingFile { .. })
    ));
}

#[tokio::test]
async fn test_explicit_file_is_loaded() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("depweight.toml");
    std::fs::write(&path, "expected-host = \"github.example.com\"\n").unwrap();

    let mut args = Args {
        config_file: Some(path.clone()),
        ..Args::default()
    };
    assert_eq!(args.apply_config_file().await.unwrap(), Some(path));
    assert_eq!(args.expected_host.as_deref(), Some("github.example.com"));
}

#[tokio::test]
async fn test_malformed_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "listen-addr = \n").unwrap();

    let mut args = Args {
        config_file: Some(path),
        ..Args::default()
    };
    assert!(matches!(
        args.apply_config_file().await,
        Err(ConfigError::Parse { .. })
    ));
}
