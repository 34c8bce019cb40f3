//! `biblio export`: CSV out.

use tracing::{info, instrument};

use biblio_core::application::{ExportRequest, ExportService};

use crate::{
    cli::ExportArgs,
    config::AppConfig,
    error::{CliResult, IntoCli},
    output::OutputManager,
    session::Session,
};

#[instrument(skip_all, fields(kind = %args.kind))]
pub fn execute(
    args: ExportArgs,
    session: &Session,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    if args.list_fields {
        let fields = ExportService::fields(args.kind)?;
        if output.is_json() {
            let items: Vec<_> = fields
                .iter()
                .map(|f| serde_json::json!({ "key": f.key, "label": f.label, "default": f.default }))
                .collect();
            return output.json(&items);
        }
        let rows: Vec<Vec<String>> = fields
            .iter()
            .map(|f| {
                vec![
                    f.key.to_string(),
                    f.label.to_string(),
                    if f.default { "*" } else { "" }.to_string(),
                ]
            })
            .collect();
        output.table(&["KEY", "LABEL", "DEFAULT"], &rows)?;
        return Ok(());
    }

    let request = ExportRequest {
        fields: args.fields,
        include_id: args.include_id,
        from: args.from,
        to: args.to,
        delimiter: args.delimiter.unwrap_or(config.export.delimiter),
        ..ExportRequest::new(args.kind)
    };
    let file = session.library.exports.export(&request)?;
    info!(records = file.records, file = %file.file_name, "Export built");

    if args.base64 {
        output.data(&file.base64())?;
        return Ok(());
    }

    let path = args
        .output
        .unwrap_or_else(|| file.file_name.clone().into());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_cli_context(|| format!("Failed to create directory '{}'", parent.display()))?;
    }
    std::fs::write(&path, &file.bytes)
        .with_cli_context(|| format!("Failed to write '{}'", path.display()))?;

    if output.is_json() {
        return output.json(&serde_json::json!({
            "file": path,
            "records": file.records,
        }));
    }
    output.success(&format!(
        "Exported {} record(s) to {}",
        file.records,
        path.display()
    ))?;
    Ok(())
}
