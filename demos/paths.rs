//! Path composition

use environ::{PathOptions, PathValue};

fn main() -> anyhow::Result<()> {
    let root = PathValue::new("/srv/app")?;
    let static_root = root.join(["public", "static"]);

    println!("Root: {root}");
    println!("Static: {static_root}");
    println!("Back up two: {}", static_root.truncate(2));
    println!("Parent: {}", static_root.parent());
    println!("Contains static: {}", root.contains(&static_root));
    println!("Trimmed: {}", static_root.trim_suffix("static")?);
    println!("Settings: {}", root.resolve(["settings", "prod.toml"]).display());

    let here = PathValue::with(file!(), std::iter::empty::<&str>(), PathOptions { is_file: true, required: false })?;
    println!("Demo directory: {here}");

    match root.join_required(["does-not-exist"]) {
        Ok(path) => println!("Found {path}"),
        Err(e) => println!("Expected error: {e}"),
    }

    Ok(())
}
