//! Casting raw strings into nested values

use environ::cast::{cast, Caster, Spec};

fn main() -> anyhow::Result<()> {
    // Either separator can be the decimal point
    println!("{}", cast("123.420.333,3", &Spec::float())?);
    println!("{}", cast("123,420,333.3", &Spec::float())?);

    let ports = cast("(80,443)", &Spec::tuple(Spec::int()))?;
    println!("Ports: {ports}");

    let limits = Spec::map_with(Spec::int(), [("tags", Spec::list(Spec::string()))]);
    println!("Limits: {}", cast("cpu=2,mem=512,tags=web;api", &limits)?);

    // `;` between pairs, `,` inside lists
    let caster = Caster::new().with_separators(';', ',');
    println!("Limits: {}", caster.cast("cpu=2;tags=web,api", &limits)?);

    let caster = Caster::new().with_bool_tokens(["enabled"], ["disabled"]);
    println!("Feature: {}", caster.cast("Enabled", &Spec::bool())?);

    let json = cast(r#"{"retries": 3}"#, &Spec::json())?;
    println!("JSON: {}", serde_json::to_string(&json)?);

    Ok(())
}
