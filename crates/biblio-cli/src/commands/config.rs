//! `biblio config`: read and write configuration values.

use crate::{
    cli::{ConfigCommands, GlobalArgs},
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

pub fn execute(
    cmd: ConfigCommands,
    global: &GlobalArgs,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = config.get(&key)?;
            if output.is_json() {
                return output.json(&value);
            }
            output.data(&render(&value))?;
        }
        ConfigCommands::Set { key, value } => {
            let path = AppConfig::target_path(global.config.as_ref());
            let updated = AppConfig::set_in_file(&path, &key, &value)?;
            let stored = updated.get(&key)?;
            output.success(&format!("{key} = {} in {}", render(&stored), path.display()))?;
        }
        ConfigCommands::List => {
            if output.is_json() {
                return output.json(config);
            }
            output.data(&config.to_toml()?)?;
        }
        ConfigCommands::Path => {
            output.data(&AppConfig::target_path(global.config.as_ref()).display().to_string())?;
        }
    }
    Ok(())
}

/// Strings print bare; everything else in TOML syntax.
fn render(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strings_render_without_quotes() {
        assert_eq!(render(&toml::Value::String(";".into())), ";");
        assert_eq!(render(&toml::Value::Integer(8069)), "8069");
        assert_eq!(render(&toml::Value::Boolean(true)), "true");
    }

    #[test]
    fn known_keys_resolve() {
        let cfg = AppConfig::default();
        assert_eq!(render(&cfg.get("library.max_active_loans").unwrap()), "5");
        assert_eq!(render(&cfg.get("output.format").unwrap()), "auto");
        assert!(cfg.get("does.not.exist").is_err());
    }
}
