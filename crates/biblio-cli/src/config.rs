//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by value.  The
//! CLI layer owns config; the core crate only sees the [`LibrarySettings`]
//! and import/export options derived from it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables, `BIBLIO__SECTION__KEY` (e.g. `BIBLIO__SERVER__PORT`)
//! 3. Config file (`--config`, or the platform config directory)
//! 4. Built-in defaults (always present)

use std::net::IpAddr;
use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use biblio_core::application::{CsvFormat, Delimiter, ImportOptions, LibrarySettings};
use biblio_server::ServerConfig;

use crate::error::{CliError, CliResult, IntoCli};

const ENV_PREFIX: &str = "BIBLIO";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Lending rules.
    pub library: LibrarySettings,
    pub storage: StorageConfig,
    /// Defaults for `biblio import`.
    pub import: ImportConfig,
    /// Defaults for `biblio export`.
    pub export: ExportConfig,
    pub server: ServerSection,
    pub output: OutputConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON snapshot of the whole library.
    pub data_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub delimiter: Delimiter,
    pub has_header: bool,
    pub date_format: String,
    pub skip_duplicates: bool,
    pub update_existing: bool,
    pub actor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub delimiter: Delimiter,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub address: IpAddr,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    pub format: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Append logs to this file as well as stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_file: directories::ProjectDirs::from("org", "biblio", "biblio")
                .map(|d| d.data_dir().join("library.json"))
                .unwrap_or_else(|| PathBuf::from("library.json")),
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        let options = ImportOptions::default();
        Self {
            delimiter: options.format.delimiter,
            has_header: options.format.has_header,
            date_format: options.date_format,
            skip_duplicates: options.skip_duplicates,
            update_existing: options.update_existing,
            actor: options.actor,
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: Delimiter::Semicolon,
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        let server = ServerConfig::default();
        Self {
            address: server.address,
            port: server.port,
            api_token: server.api_token,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "auto".into(),
        }
    }
}

impl ImportConfig {
    /// Import options seeded from the configured defaults.
    pub fn options(&self) -> ImportOptions {
        ImportOptions {
            format: CsvFormat {
                delimiter: self.delimiter,
                has_header: self.has_header,
            },
            date_format: self.date_format.clone(),
            skip_duplicates: self.skip_duplicates,
            update_existing: self.update_existing,
            actor: self.actor.clone(),
            file_name: None,
        }
    }
}

impl ServerSection {
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig {
            address: self.address,
            port: self.port,
            api_token: self.api_token.clone(),
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the TOML file, then `BIBLIO__*`
    /// environment variables.
    ///
    /// With `must_exist`, an explicit `config_file` has to be there; the
    /// default location is always optional.
    pub fn load(config_file: Option<&PathBuf>, must_exist: bool) -> CliResult<Self> {
        let (path, required) = match config_file {
            Some(path) => (path.clone(), must_exist),
            None => (Self::config_path(), false),
        };
        Self::load_from(&path, required)
    }

    fn load_from(path: &Path, required: bool) -> CliResult<Self> {
        let defaults =
            Config::try_from(&Self::default()).with_cli_context(|| "building defaults")?;

        Config::builder()
            .add_source(defaults)
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .with_cli_context(|| format!("reading {}", path.display()))?
            .try_deserialize()
            .with_cli_context(|| format!("invalid settings in {}", path.display()))
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs` for cross-platform correctness,
    /// falling back to `.biblio.toml` in the current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("org", "biblio", "biblio")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".biblio.toml"))
    }

    /// The file `init` and `config set` write to.
    pub fn target_path(config_file: Option<&PathBuf>) -> PathBuf {
        config_file.cloned().unwrap_or_else(Self::config_path)
    }

    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Value at a dotted key such as `server.port`.
    pub fn get(&self, key: &str) -> CliResult<toml::Value> {
        let root = toml::Value::try_from(self).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })?;
        key.split('.')
            .try_fold(&root, |value, part| value.get(part))
            .cloned()
            .ok_or_else(|| unknown_key(key))
    }

    /// Write `key = value` into the TOML file at `path`, keeping any other
    /// content. The result must still load.
    pub fn set_in_file(path: &Path, key: &str, raw: &str) -> CliResult<Self> {
        // Only keys that exist in the schema may be written.
        Self::default().get(key).or_else(|err| match key {
            "server.api_token" | "log.file" => Ok(toml::Value::String(String::new())),
            _ => Err(err),
        })?;

        let mut document: toml::Table = if path.exists() {
            let text = std::fs::read_to_string(path)
                .with_cli_context(|| format!("reading {}", path.display()))?;
            text.parse().map_err(|e: toml::de::Error| CliError::ConfigError {
                message: format!("{} is not valid TOML: {e}", path.display()),
                source: Some(Box::new(e)),
            })?
        } else {
            toml::Table::new()
        };

        let parts: Vec<&str> = key.split('.').collect();
        let (leaf, sections) = parts.split_last().ok_or_else(|| unknown_key(key))?;
        let mut table = &mut document;
        for section in sections {
            table = table
                .entry(section.to_string())
                .or_insert(toml::Value::Table(toml::Table::new()))
                .as_table_mut()
                .ok_or_else(|| unknown_key(key))?;
        }
        table.insert(leaf.to_string(), parse_value(raw));

        let text = toml::to_string_pretty(&document).map_err(|e| CliError::ConfigError {
            message: format!("Failed to serialise config: {e}"),
            source: Some(Box::new(e)),
        })?;

        let staged = path.with_extension("toml.new");
        write_file(&staged, &text)?;
        let loaded = match Self::load_from(&staged, true) {
            Ok(loaded) => loaded,
            Err(err) => {
                let _ = std::fs::remove_file(&staged);
                return Err(err);
            }
        };
        std::fs::rename(&staged, path)
            .with_cli_context(|| format!("replacing {}", path.display()))?;
        Ok(loaded)
    }
}

/// `true`/`false`, integers and floats keep their type; anything else is a
/// string.
fn parse_value(raw: &str) -> toml::Value {
    if let Ok(b) = raw.parse::<bool>() {
        toml::Value::Boolean(b)
    } else if let Ok(i) = raw.parse::<i64>() {
        toml::Value::Integer(i)
    } else if let Ok(f) = raw.parse::<f64>() {
        toml::Value::Float(f)
    } else {
        toml::Value::String(raw.to_string())
    }
}

fn unknown_key(key: &str) -> CliError {
    CliError::ConfigError {
        message: format!("Unknown config key: '{key}'"),
        source: None,
    }
}

pub fn write_file(path: &Path, contents: &str) -> CliResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_cli_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    std::fs::write(path, contents)
        .with_cli_context(|| format!("Failed to write '{}'", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_lending_rules() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.library.max_active_loans, 5);
        assert_eq!(cfg.library.default_loan_days, 14);
        assert_eq!(cfg.import.delimiter, Delimiter::Comma);
        assert_eq!(cfg.export.delimiter, Delimiter::Semicolon);
        assert_eq!(cfg.server.port, 8069);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let missing = PathBuf::from("/definitely/not/here/biblio.toml");
        assert!(matches!(
            AppConfig::load(Some(&missing), true),
            Err(CliError::ConfigError { .. })
        ));
    }

    #[test]
    fn file_values_override_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[library]\nmax_active_loans = 2\n\n[export]\ndelimiter = \"tab\"\n",
        )
        .unwrap();

        let cfg = AppConfig::load(Some(&path), true).unwrap();
        assert_eq!(cfg.library.max_active_loans, 2);
        assert_eq!(cfg.library.card_prefix, "MBR");
        assert_eq!(cfg.export.delimiter, Delimiter::Tab);
    }

    #[test]
    fn get_reads_dotted_keys() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.get("server.port").unwrap().as_integer(), Some(8069));
        assert_eq!(cfg.get("import.delimiter").unwrap().as_str(), Some(","));
        assert!(matches!(
            cfg.get("does.not.exist"),
            Err(CliError::ConfigError { .. })
        ));
    }

    #[test]
    fn set_writes_and_validates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let cfg = AppConfig::set_in_file(&path, "library.default_loan_days", "21").unwrap();
        assert_eq!(cfg.library.default_loan_days, 21);
        assert!(std::fs::read_to_string(&path).unwrap().contains("default_loan_days = 21"));

        assert!(AppConfig::set_in_file(&path, "server.port", "not-a-port").is_err());
        assert!(AppConfig::set_in_file(&path, "nope.key", "1").is_err());
        let reloaded = AppConfig::load(Some(&path), true).unwrap();
        assert_eq!(reloaded.server.port, 8069);
    }

    #[test]
    fn import_options_follow_config() {
        let mut cfg = AppConfig::default();
        cfg.import.delimiter = Delimiter::Pipe;
        cfg.import.skip_duplicates = false;
        let options = cfg.import.options();
        assert_eq!(options.format.delimiter, Delimiter::Pipe);
        assert!(!options.skip_duplicates);
    }
}
