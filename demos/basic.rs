//! Basic usage example

use environ::cast::Spec;
use environ::ValueStore;

fn main() -> anyhow::Result<()> {
    // Set environment variables for demonstration
    std::env::set_var("DEBUG", "on");
    std::env::set_var("ALLOWED_HOSTS", "example.com,www.example.com");
    std::env::set_var("SERVER_HOST", "0.0.0.0");
    std::env::set_var("BIND_HOST", "$SERVER_HOST");

    let store = ValueStore::from_env();

    let debug = store.bool_or("DEBUG", false)?;
    let workers = store.int_or("WORKERS", 4)?;
    let hosts = store.list("ALLOWED_HOSTS", Spec::string())?;
    // BIND_HOST refers to SERVER_HOST
    let bind = store.string("BIND_HOST")?;

    println!("Configuration loaded:");
    println!("  Debug: {debug}");
    println!("  Workers: {workers}");
    println!("  Allowed Hosts: {hosts:?}");
    println!("  Bind Host: {bind}");

    Ok(())
}
