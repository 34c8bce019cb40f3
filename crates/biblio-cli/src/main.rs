//! # Biblio CLI
//!
//! Library lending from the terminal: catalogue, members, loans, stock,
//! CSV exchange, reports and the HTTP API.
//!
//! ## Startup sequence
//!
//! 1. Parse CLI arguments (clap handles `--help` / `--version` early-exit).
//! 2. Load configuration (defaults, file, `BIBLIO__*` environment).
//! 3. Initialise the tracing subscriber (logging).
//! 4. Build the [`OutputManager`].
//! 5. Open the data file and dispatch to the command handler.
//! 6. Translate any [`CliError`] into a user-facing message and exit code.
//!
//! ## Exit codes
//!
//! | Code | Meaning                              |
//! |------|--------------------------------------|
//! |  0   | Success                              |
//! |  1   | Internal / system error              |
//! |  2   | User / input error, refused action   |
//! |  3   | Resource not found                   |
//! |  4   | Configuration error                  |

use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, info, instrument};

use crate::{
    cli::{Cli, Commands},
    config::AppConfig,
    error::{CliError, CliResult},
    logging::init_logging,
    output::OutputManager,
    session::Session,
};

mod cli;
mod commands;
mod config;
mod error;
mod logging;
mod output;
mod session;

fn main() -> ExitCode {
    // Missing .env is fine.
    let _ = dotenvy::dotenv();

    // ── 1. Parse arguments ────────────────────────────────────────────────
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 2 } else { 0 };
            let _ = e.print();
            return ExitCode::from(code);
        }
    };
    let verbose = cli.global.verbose > 0;

    // ── 2. Load configuration ─────────────────────────────────────────────
    // Commands that create or locate the config file may name one that is
    // not there yet.
    let must_exist = !matches!(
        cli.command,
        Commands::Init(_) | Commands::Config(_) | Commands::Completions(_)
    );
    let config = match AppConfig::load(cli.global.config.as_ref(), must_exist) {
        Ok(cfg) => cfg,
        Err(e) => return handle_error(e, verbose),
    };

    // ── 3. Initialise tracing ─────────────────────────────────────────────
    let log_file = cli.global.log_file.as_ref().or(config.log.file.as_ref());
    let _guard = match init_logging(&cli.global, log_file.map(|p| p.as_path())) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialise logging: {e:#}");
            return ExitCode::from(1);
        }
    };

    debug!(
        verbose = cli.global.verbose,
        quiet = cli.global.quiet,
        no_color = cli.global.no_color,
        "CLI started"
    );

    // ── 4. Build output manager ───────────────────────────────────────────
    let output = OutputManager::new(&cli.global, &config);

    // ── 5. Dispatch + 6. Error handling ──────────────────────────────────
    match run(cli, &config, &output) {
        Ok(()) => {
            info!("Biblio completed successfully");
            ExitCode::SUCCESS
        }
        Err(e) => handle_error(e, verbose),
    }
}

/// Dispatch to the correct command handler.
#[instrument(skip_all)]
fn run(cli: Cli, config: &AppConfig, output: &OutputManager) -> CliResult<()> {
    let Cli { global, command } = cli;
    match command {
        Commands::Init(args) => return commands::init::execute(args, &global, output),
        Commands::Config(cmd) => return commands::config::execute(cmd, &global, config, output),
        Commands::Completions(args) => return commands::completions::execute(args),
        _ => {}
    }

    let session = Session::open(&global, config)?;
    match command {
        Commands::Book(cmd) => commands::book::execute(cmd, &session, output),
        Commands::Member(cmd) => commands::member::execute(cmd, &session, output),
        Commands::Author(cmd) => commands::author::execute(cmd, &session, output),
        Commands::Category(cmd) => commands::category::execute(cmd, &session, output),
        Commands::Loan(cmd) => commands::loan::execute(cmd, &session, output),
        Commands::Inventory(cmd) => commands::inventory::execute(cmd, &session, output),
        Commands::Import(cmd) => commands::import::execute(cmd, &session, config, output),
        Commands::Export(args) => commands::export::execute(args, &session, config, output),
        Commands::Report(cmd) => commands::report::execute(cmd, &session, output),
        Commands::Serve(args) => commands::serve::execute(args, session, config, output),
        Commands::Init(_) | Commands::Config(_) | Commands::Completions(_) => Ok(()),
    }
}

/// Translate a `CliError` into a user message and an appropriate exit code.
fn handle_error(err: CliError, verbose: bool) -> ExitCode {
    err.log();

    // stderr, so the message shows even when stdout is redirected.
    let msg = if std::io::IsTerminal::is_terminal(&std::io::stderr()) {
        err.format_colored(verbose)
    } else {
        err.format_plain(verbose)
    };
    eprint!("{msg}");

    ExitCode::from(err.exit_code())
}

// ── tests ─────────────────────────────────────────────────────────────────────
