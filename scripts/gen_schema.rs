use relnotes::config;
use schemars::schema_for;

fn main() -> color_eyre::Result<()> {
    let schema = schema_for!(config::Config);
    let schema_string = serde_json::to_string_pretty(&schema)?;
    println!("{}", schema_string);
    Ok(())
}
