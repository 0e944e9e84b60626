use crate::infra::Settings;
use anyhow::{Result, bail};
use clap::Subcommand;
use serde_json::Value;
use std::path::Path;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the merged settings document
    Show,
    /// Print the settings file location
    Path,
    /// Print one value by dotted key (e.g. distrobox_options.nvidia_support)
    Get { key: String },
    /// Set one value by dotted key; VALUE is parsed as JSON, else stored as text
    Set { key: String, value: String },
}

/// `true`, `5000` or `["a"]` keep their JSON type; anything else is a string
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

pub fn run(action: ConfigAction, config_dir: &Path) -> Result<()> {
    let mut settings = Settings::load(config_dir)?;

    match action {
        ConfigAction::Show => {
            println!("{}", serde_json::to_string_pretty(settings.document())?);
        }
        ConfigAction::Path => println!("{}", settings.path().display()),
        ConfigAction::Get { key } => match settings.get(&key) {
            Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
            None => bail!("setting '{key}' not found"),
        },
        ConfigAction::Set { key, value } => {
            settings.set(&key, parse_value(&value))?;
            println!("✅ {key} updated in {:?}", settings.path());
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_json_literals() {
        assert_eq!(parse_value("true"), json!(true));
        assert_eq!(parse_value("2500"), json!(2500));
        assert_eq!(parse_value(r#"["git"]"#), json!(["git"]));
    }

    #[test]
    fn falls_back_to_plain_text() {
        assert_eq!(parse_value("dark"), json!("dark"));
        assert_eq!(parse_value("fedora:latest"), json!("fedora:latest"));
    }
}
