//! `biblio import`: CSV intake with an audit log.

use std::path::Path;

use serde_json::json;
use tracing::{info, instrument, warn};

use biblio_core::application::{ImportOptions, ImportSummary};

use super::{emit, or_dash};
use crate::{
    cli::{ImportCommands, ImportFileArgs},
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
    session::Session,
};

#[instrument(skip_all)]
pub fn execute(
    cmd: ImportCommands,
    session: &Session,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let imports = &session.library.imports;
    match cmd {
        ImportCommands::Books(args) => {
            let options = options(&args, config);
            let bytes = read(&args.file)?;
            let spinner = output.spinner("Importing books...");
            let summary = imports.import_books(&bytes, &options);
            spinner.finish_and_clear();
            report(&summary?, output)
        }
        ImportCommands::Members(args) => {
            let mut options = options(&args.file, config);
            if let Some(format) = args.date_format {
                options.date_format = format;
            }
            if args.keep_duplicates {
                options.skip_duplicates = false;
            }
            let bytes = read(&args.file.file)?;
            let spinner = output.spinner("Importing members...");
            let summary = imports.import_members(&bytes, &options);
            spinner.finish_and_clear();
            report(&summary?, output)
        }
        ImportCommands::Preview { file, no_header } => {
            let bytes = read(&file)?;
            output.data(&imports.preview(&bytes, !no_header))?;
            Ok(())
        }
        ImportCommands::Template { kind, output: file } => {
            let template = imports.template(kind)?;
            emit(output, file.path.as_deref(), &template)
        }
        ImportCommands::Logs { id: Some(id) } => {
            let log = imports.log(id)?;
            if output.is_json() {
                return output.json(&log);
            }
            output.fields(&[
                ("Log", log.name.clone()),
                ("When", log.timestamp.format("%Y-%m-%d %H:%M:%S").to_string()),
                ("By", log.actor.clone()),
                ("Kind", log.kind.label().to_string()),
                ("File", or_dash(log.file_name.as_deref())),
                ("Processed", log.processed.to_string()),
                ("Succeeded", log.succeeded.to_string()),
                ("Failed", log.failed.to_string()),
                ("Success rate", format!("{:.1}%", log.success_rate())),
                ("State", log.state.to_string()),
                ("Created ids", log.created_ids_text()),
            ])?;
            if !log.errors.is_empty() {
                output.header("Errors")?;
                output.print(&log.errors)?;
            }
            Ok(())
        }
        ImportCommands::Logs { id: None } => {
            let logs = imports.logs()?;
            if output.is_json() {
                return output.json(&logs);
            }
            if logs.is_empty() {
                output.info("No imports yet")?;
                return Ok(());
            }
            let rows: Vec<Vec<String>> = logs
                .iter()
                .map(|log| {
                    vec![
                        log.id.to_string(),
                        log.timestamp.format("%Y-%m-%d %H:%M").to_string(),
                        log.kind.to_string(),
                        or_dash(log.file_name.as_deref()),
                        log.processed.to_string(),
                        log.succeeded.to_string(),
                        log.failed.to_string(),
                        log.state.to_string(),
                    ]
                })
                .collect();
            output.table(
                &["ID", "WHEN", "KIND", "FILE", "ROWS", "OK", "FAILED", "STATE"],
                &rows,
            )?;
            Ok(())
        }
    }
}

/// Configured defaults, overridden by the flags.
fn options(args: &ImportFileArgs, config: &AppConfig) -> ImportOptions {
    let mut options = config.import.options();
    if let Some(delimiter) = args.delimiter {
        options.format.delimiter = delimiter;
    }
    if args.no_header {
        options.format.has_header = false;
    }
    if args.update_existing {
        options.update_existing = true;
    }
    if let Some(actor) = &args.actor {
        options.actor = actor.clone();
    }
    options.file_name = args
        .file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned());
    options
}

fn read(path: &Path) -> CliResult<Vec<u8>> {
    std::fs::read(path).with_cli_context(|| format!("Failed to read '{}'", path.display()))
}

fn report(summary: &ImportSummary, output: &OutputManager) -> CliResult<()> {
    info!(
        log = %summary.log_id,
        processed = summary.processed,
        failed = summary.failed(),
        "Import finished"
    );
    if output.is_json() {
        return output.json(&json!({
            "log_id": summary.log_id,
            "kind": summary.kind,
            "processed": summary.processed,
            "created": summary.created,
            "updated": summary.updated,
            "skipped": summary.skipped,
            "succeeded": summary.succeeded(),
            "failed": summary.failed(),
            "errors": summary
                .errors
                .iter()
                .map(|e| json!({ "line": e.line, "message": e.message }))
                .collect::<Vec<_>>(),
            "created_ids": summary.created_ids,
        }));
    }

    output.print(&summary.report())?;
    if summary.failed() > 0 {
        warn!(failed = summary.failed(), "Rows rejected during import");
        output.warning(&format!(
            "{} row(s) rejected; see `biblio import logs {}`",
            summary.failed(),
            summary.log_id
        ))?;
    } else {
        output.success(&format!("Import log {}", summary.log_id))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use biblio_core::application::Delimiter;
    use std::path::PathBuf;

    fn args(file: &str) -> ImportFileArgs {
        ImportFileArgs {
            file: PathBuf::from(file),
            delimiter: None,
            no_header: false,
            update_existing: false,
            actor: None,
        }
    }

    #[test]
    fn options_follow_config_without_flags() {
        let mut config = AppConfig::default();
        config.import.delimiter = Delimiter::Semicolon;
        let options = options(&args("data/books.csv"), &config);
        assert_eq!(options.format.delimiter, Delimiter::Semicolon);
        assert!(options.format.has_header);
        assert_eq!(options.file_name.as_deref(), Some("books.csv"));
    }

    #[test]
    fn flags_override_config() {
        let mut a = args("books.csv");
        a.delimiter = Some(Delimiter::Pipe);
        a.no_header = true;
        a.update_existing = true;
        a.actor = Some("ana".into());
        let options = options(&a, &AppConfig::default());
        assert_eq!(options.format.delimiter, Delimiter::Pipe);
        assert!(!options.format.has_header);
        assert!(options.update_existing);
        assert_eq!(options.actor, "ana");
    }
}
