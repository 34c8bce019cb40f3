//! `biblio init`: create a default configuration file.

use crate::{
    cli::{GlobalArgs, InitArgs},
    config::{AppConfig, write_file},
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Write the default settings to `-c <file>` or the default location.
pub fn execute(args: InitArgs, global: &GlobalArgs, output: &OutputManager) -> CliResult<()> {
    let path = AppConfig::target_path(global.config.as_ref());
    if path.exists() && !args.force {
        return Err(CliError::ConfigExists { path });
    }

    output.info("Initialising configuration...")?;
    write_file(&path, &AppConfig::default().to_toml()?)?;
    output.success(&format!("Configuration created at {}", path.display()))?;
    Ok(())
}
