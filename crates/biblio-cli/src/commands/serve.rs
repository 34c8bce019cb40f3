//! `biblio serve`: run the HTTP API over the opened library.

use std::sync::Arc;

use tracing::info;

use biblio_server::Server;

use crate::{
    cli::ServeArgs,
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    session::Session,
};

pub fn execute(
    args: ServeArgs,
    session: Session,
    config: &AppConfig,
    output: &OutputManager,
) -> CliResult<()> {
    let mut cfg = config.server.to_server_config();
    if let Some(address) = args.address {
        cfg.address = address;
    }
    if let Some(port) = args.port {
        cfg.port = port;
    }
    if args.token.is_some() {
        cfg.api_token = args.token;
    }
    if cfg.api_token.is_none() {
        output.warning("No API token set; private endpoints are open")?;
    }

    let server = Server::builder()
        .config(cfg)
        .library(Arc::new(session.library))
        .build()
        .map_err(server_error)?;
    output.info(&format!(
        "Serving {} on http://{}",
        session.data_file.display(),
        server.address()
    ))?;
    info!(address = %server.address(), "Server configured");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| CliError::Server {
            message: format!("cannot start runtime: {e}"),
        })?;
    runtime.block_on(server.run()).map_err(server_error)
}

fn server_error(err: anyhow::Error) -> CliError {
    CliError::Server {
        message: format!("{err:#}"),
    }
}
