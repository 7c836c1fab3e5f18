//! Declarative loading with `#[derive(Environ)]`

use environ::{BackendConfig, Environ, PathValue, ValueStore};
use std::io::Write;
use tempfile::NamedTempFile;

#[derive(Debug, Environ)]
#[environ(prefix = "APP_")]
struct Config {
    // Loaded from APP_SECRET_KEY or the file named by APP_SECRET_KEY_FILE
    #[environ(from_file)]
    pub secret_key: String,

    #[environ(default = 8080)]
    pub port: u16,

    #[environ(default)]
    pub debug: bool,

    pub allowed_hosts: Vec<String>,

    #[environ(name = "DATABASE_URL", with = "ValueStore::db")]
    pub database: BackendConfig,

    #[environ(name = "MEDIA_ROOT", with = "ValueStore::path")]
    pub media_root: PathValue,

    // None when APP_SENTRY_DSN is not set
    pub sentry_dsn: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let mut secret = NamedTempFile::new()?;
    writeln!(secret, "super_secret_key_12345")?;

    let store = ValueStore::new([
        ("APP_SECRET_KEY_FILE", secret.path().to_string_lossy().into_owned()),
        ("APP_ALLOWED_HOSTS", "example.com,www.example.com".to_string()),
        ("DATABASE_URL", "mysql://app:pw@127.0.0.1:3306/app".to_string()),
        ("MEDIA_ROOT", "/srv/app/media".to_string()),
    ]);

    let config = Config::from_store(&store)?;
    println!("{config:#?}");

    Ok(())
}
