//! Derive macro tests

use environ::{BackendConfig, Environ, PathValue, Value, ValueStore};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

#[derive(Debug, Environ)]
struct BasicConfig {
    pub database_url: String,
    pub api_key: String,
}

#[derive(Debug, Environ)]
struct ConfigWithDefaults {
    #[environ(default = "127.0.0.1:8080".to_string())]
    pub server_addr: String,

    #[environ(default = 10)]
    pub max_connections: u32,

    #[environ(default = false)]
    pub debug_mode: bool,
}

#[derive(Debug, Environ)]
struct ConfigWithCustomNames {
    #[environ(name = "DB_CONNECTION_STRING")]
    pub database_url: String,

    #[environ(name = "REDIS_URL")]
    pub cache_url: String,
}

#[derive(Debug, Environ)]
struct ConfigWithFileSupport {
    #[environ(from_file)]
    pub secret_key: String,

    pub normal_var: String,
}

fn secret_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{contents}").unwrap();
    file
}

fn path_of(file: &NamedTempFile) -> String {
    file.path().to_string_lossy().into_owned()
}

#[test]
fn test_basic_config() {
    let store = ValueStore::new([
        ("DATABASE_URL", "postgres://localhost/test"),
        ("API_KEY", "test_api_key"),
    ]);

    let config = BasicConfig::from_store(&store).unwrap();
    assert_eq!(config.database_url, "postgres://localhost/test");
    assert_eq!(config.api_key, "test_api_key");
}

#[test]
fn test_missing_required_field() {
    let store = ValueStore::new([("DATABASE_URL", "postgres://localhost/test")]);

    let err = BasicConfig::from_store(&store).unwrap_err();
    assert_eq!(err.to_string(), "Set the API_KEY environment variable");
}

#[test]
fn test_config_with_defaults() {
    let config = ConfigWithDefaults::from_store(&ValueStore::default()).unwrap();
    assert_eq!(config.server_addr, "127.0.0.1:8080");
    assert_eq!(config.max_connections, 10);
    assert!(!config.debug_mode);
}

#[test]
fn test_config_override_defaults() {
    let store = ValueStore::new([
        ("SERVER_ADDR", "0.0.0.0:9090"),
        ("MAX_CONNECTIONS", "20"),
        ("DEBUG_MODE", "yes"),
    ]);

    let config = ConfigWithDefaults::from_store(&store).unwrap();
    assert_eq!(config.server_addr, "0.0.0.0:9090");
    assert_eq!(config.max_connections, 20);
    assert!(config.debug_mode);
}

#[test]
fn test_custom_names() {
    let store = ValueStore::new([
        ("DB_CONNECTION_STRING", "postgres://localhost/db"),
        ("REDIS_URL", "redis://localhost"),
    ]);

    let config = ConfigWithCustomNames::from_store(&store).unwrap();
    assert_eq!(config.database_url, "postgres://localhost/db");
    assert_eq!(config.cache_url, "redis://localhost");
}

#[test]
fn test_file_based_config() {
    let file = secret_file("super_secret_key");
    let store = ValueStore::new([
        ("SECRET_KEY_FILE", path_of(&file)),
        ("NORMAL_VAR", "normal_value".to_string()),
    ]);

    let config = ConfigWithFileSupport::from_store(&store).unwrap();
    assert_eq!(config.secret_key, "super_secret_key");
    assert_eq!(config.normal_var, "normal_value");
}

#[test]
fn test_direct_var_preferred_over_file() {
    let file = secret_file("file_value");
    let store = ValueStore::new([
        ("SECRET_KEY", "direct_value".to_string()),
        ("SECRET_KEY_FILE", path_of(&file)),
        ("NORMAL_VAR", "normal".to_string()),
    ]);

    let config = ConfigWithFileSupport::from_store(&store).unwrap();
    assert_eq!(config.secret_key, "direct_value");
}

#[test]
fn test_parse_error() {
    let store = ValueStore::new([("MAX_CONNECTIONS", "not_a_number")]);

    let err = ConfigWithDefaults::from_store(&store).unwrap_err();
    assert!(err.to_string().contains("not_a_number"));
}

#[derive(Debug, Environ)]
struct ConfigWithDefaultTrait {
    #[environ(default)]
    pub optional_string: String,

    #[environ(default)]
    pub optional_number: u32,

    #[environ(default)]
    pub optional_bool: bool,
}

#[test]
fn test_default_trait() {
    let config = ConfigWithDefaultTrait::from_store(&ValueStore::default()).unwrap();
    assert_eq!(config.optional_string, "");
    assert_eq!(config.optional_number, 0);
    assert!(!config.optional_bool);
}

#[derive(Debug, Environ)]
struct ConfigWithDefaultAndFile {
    #[environ(from_file)]
    #[environ(default = "default_secret".to_string())]
    pub secret_with_default: String,
}

#[test]
fn test_default_with_from_file() {
    let file = secret_file("file_secret");
    let store = ValueStore::new([("SECRET_WITH_DEFAULT_FILE", path_of(&file))]);
    let config = ConfigWithDefaultAndFile::from_store(&store).unwrap();
    assert_eq!(config.secret_with_default, "file_secret");

    let config = ConfigWithDefaultAndFile::from_store(&ValueStore::default()).unwrap();
    assert_eq!(config.secret_with_default, "default_secret");
}

#[derive(Debug, Environ)]
#[environ(prefix = "APP_")]
struct ConfigWithPrefix {
    pub api_key: String,

    #[environ(default = 8080)]
    pub port: u16,

    #[environ(name = "DATABASE_URL")]
    pub database_url: String,
}

#[test]
fn test_prefix_skips_explicit_names() {
    let store = ValueStore::new([
        ("APP_API_KEY", "secret123"),
        ("DATABASE_URL", "postgres://localhost/db"),
    ]);

    let config = ConfigWithPrefix::from_store(&store).unwrap();
    assert_eq!(config.api_key, "secret123");
    assert_eq!(config.port, 8080);
    assert_eq!(config.database_url, "postgres://localhost/db");
}

#[derive(Debug, Environ)]
struct ConfigWithOption {
    pub required: String,
    pub optional: Option<String>,
    pub optional_number: Option<u32>,

    #[environ(from_file)]
    pub optional_secret: Option<String>,
}

#[test]
fn test_option_some() {
    let file = secret_file("file_secret");
    let store = ValueStore::new([
        ("REQUIRED", "required_value".to_string()),
        ("OPTIONAL", "optional_value".to_string()),
        ("OPTIONAL_NUMBER", "42".to_string()),
        ("OPTIONAL_SECRET_FILE", path_of(&file)),
    ]);

    let config = ConfigWithOption::from_store(&store).unwrap();
    assert_eq!(config.required, "required_value");
    assert_eq!(config.optional.as_deref(), Some("optional_value"));
    assert_eq!(config.optional_number, Some(42));
    assert_eq!(config.optional_secret.as_deref(), Some("file_secret"));
}

#[test]
fn test_option_none() {
    let store = ValueStore::new([("REQUIRED", "required_value")]);

    let config = ConfigWithOption::from_store(&store).unwrap();
    assert_eq!(config.optional, None);
    assert_eq!(config.optional_number, None);
    assert_eq!(config.optional_secret, None);
}

#[derive(Debug, Environ)]
struct ConfigWithCollections {
    pub allowed_hosts: Vec<String>,
    pub ports: Vec<u16>,
    pub limits: indexmap::IndexMap<String, i64>,
    pub extra: serde_json::Value,
    pub media_root: PathValue,
}

#[test]
fn test_collection_fields_are_cast() {
    let store = ValueStore::new([
        ("ALLOWED_HOSTS", "a.example,b.example"),
        ("PORTS", "80,443"),
        ("LIMITS", "cpu=2,mem=512"),
        ("EXTRA", r#"{"feature": true}"#),
        ("MEDIA_ROOT", "/srv/media/"),
    ]);

    let config = ConfigWithCollections::from_store(&store).unwrap();
    assert_eq!(config.allowed_hosts, vec!["a.example", "b.example"]);
    assert_eq!(config.ports, vec![80, 443]);
    assert_eq!(config.limits["mem"], 512);
    assert_eq!(config.extra["feature"], serde_json::Value::Bool(true));
    assert_eq!(config.media_root.to_string(), "/srv/media");
}

#[derive(Debug, Environ)]
struct ConfigWithLoaders {
    #[environ(name = "DATABASE_URL", with = "ValueStore::db")]
    pub database: BackendConfig,

    #[environ(name = "CACHE_URL", with = "ValueStore::cache")]
    pub cache: Option<BackendConfig>,

    #[environ(with = "split_words")]
    pub words: Vec<String>,
}

fn split_words(store: &ValueStore, name: &str) -> environ::Result<Vec<String>> {
    Ok(store
        .string(name)?
        .split_whitespace()
        .map(str::to_string)
        .collect())
}

#[test]
fn test_with_loader() {
    let store = ValueStore::new([
        ("DATABASE_URL", "postgres://u:p@db:5432/app"),
        ("WORDS", "alpha  beta gamma"),
    ]);

    let config = ConfigWithLoaders::from_store(&store).unwrap();
    assert_eq!(config.database["PORT"], Value::Int(5432));
    assert!(config.cache.is_none());
    assert_eq!(config.words, vec!["alpha", "beta", "gamma"]);
}

#[test]
fn test_with_loader_error_propagates() {
    let store = ValueStore::new([("DATABASE_URL", "nosuchdb://host/x"), ("WORDS", "")]);

    let err = ConfigWithLoaders::from_store(&store).unwrap_err();
    assert!(err.to_string().contains("nosuchdb"));
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    env::set_var("DATABASE_URL", "postgres://localhost/test");
    env::set_var("API_KEY", "from_process");

    let config = BasicConfig::from_env().unwrap();
    assert_eq!(config.api_key, "from_process");

    env::remove_var("DATABASE_URL");
    env::remove_var("API_KEY");
}
