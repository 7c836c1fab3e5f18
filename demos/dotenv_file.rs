//! Loading a `.env` file into the store and the process environment

use environ::dotenv::read_env;
use environ::ValueStore;
use std::io::Write;
use tempfile::NamedTempFile;

fn main() -> anyhow::Result<()> {
    let mut env_file = NamedTempFile::new()?;
    writeln!(env_file, "# local settings")?;
    writeln!(env_file, "DATABASE_URL=sqlite:////tmp/app.sqlite3")?;
    writeln!(env_file, "export CACHE_URL=locmemcache://app")?;
    writeln!(env_file, "DEBUG=yes")?;

    let mut store = ValueStore::from_env();
    // Values already in the process environment win over the file
    read_env(&mut store, env_file.path(), [("SECRET_KEY", "dev-only")], false)?;

    println!("Debug: {}", store.bool("DEBUG")?);
    println!("Database: {:?}", store.db_url()?.get_str("NAME"));
    println!("Cache: {:?}", store.cache_url()?.get_str("LOCATION"));
    println!("SECRET_KEY in process env: {:?}", std::env::var("SECRET_KEY").ok());

    Ok(())
}
