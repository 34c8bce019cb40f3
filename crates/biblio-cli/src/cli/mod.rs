//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

mod catalog;
mod circulation;
mod exchange;
pub mod global;

pub use catalog::{
    AuthorCommands, BookAddArgs, BookCommands, BookListArgs, BookUpdateArgs, CategoryCommands,
};
pub use circulation::{
    InventoryCommands, LoanCheckoutArgs, LoanCommands, LoanListArgs, MemberAddArgs,
    MemberCommands, MemberUpdateArgs,
};
pub use exchange::{
    ExportArgs, ImportCommands, ImportFileArgs, ImportMembersArgs, LoanReportArgs, ReportCommands,
};
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "biblio",
    bin_name = "biblio",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "\u{1f4da} Library lending: catalogue, members, loans and stock",
    long_about = "Biblio keeps a library's catalogue, members, loans and stock \
                  in a single data file, exchanges them as CSV and serves the \
                  catalogue over HTTP.",
    after_help = "EXAMPLES:\n\
        \x20 biblio book add \"Rayuela\" --isbn 978-84-204-1214-6 --author \"Julio Cortázar\"\n\
        \x20 biblio member add \"Ana García\" --email ana@example.com\n\
        \x20 biblio loan checkout 1 MBR-0001\n\
        \x20 biblio import books catalogue.csv --delimiter ';'\n\
        \x20 biblio serve --port 8069",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Manage the book catalogue.
    #[command(subcommand, visible_alias = "b")]
    Book(BookCommands),

    /// Manage library members.
    #[command(subcommand, visible_alias = "m")]
    Member(MemberCommands),

    /// Register and list authors.
    #[command(subcommand)]
    Author(AuthorCommands),

    /// Manage book categories.
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Lend, return and renew books.
    #[command(
        subcommand,
        visible_alias = "l",
        after_help = "EXAMPLES:\n\
            \x20 biblio loan checkout 3 MBR-0001 --days 21\n\
            \x20 biblio loan return 7\n\
            \x20 biblio loan sweep"
    )]
    Loan(LoanCommands),

    /// Stock records per book.
    #[command(subcommand, visible_alias = "inv")]
    Inventory(InventoryCommands),

    /// Import books or members from CSV.
    #[command(
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 biblio import template books > books.csv\n\
            \x20 biblio import preview books.csv\n\
            \x20 biblio import books books.csv --update-existing\n\
            \x20 biblio import members socios.csv --date-format %d/%m/%Y"
    )]
    Import(ImportCommands),

    /// Export books, members or loans as CSV.
    #[command(after_help = "EXAMPLES:\n\
            \x20 biblio export book\n\
            \x20 biblio export member --fields name,email,numero_carnet --id\n\
            \x20 biblio export loan --from 2024-01-01 --to 2024-03-31 -o q1.csv")]
    Export(ExportArgs),

    /// Printable documents and the loan report.
    #[command(subcommand)]
    Report(ReportCommands),

    /// Serve the HTTP API.
    Serve(ServeArgs),

    /// Create a configuration file with the default settings.
    #[command(after_help = "EXAMPLES:\n\
            \x20 biblio init           # default location\n\
            \x20 biblio init --force   # overwrite\n\
            \x20 biblio -c ./biblio.toml init")]
    Init(InitArgs),

    /// Read and change configuration values.
    #[command(
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 biblio config get library.max_active_loans\n\
            \x20 biblio config set import.delimiter ';'\n\
            \x20 biblio config list"
    )]
    Config(ConfigCommands),

    /// Generate shell completion scripts.
    #[command(after_help = "EXAMPLES:\n\
            \x20 biblio completions bash > ~/.local/share/bash-completion/completions/biblio\n\
            \x20 biblio completions zsh  > ~/.zfunc/_biblio\n\
            \x20 biblio completions fish > ~/.config/fish/completions/biblio.fish")]
    Completions(CompletionsArgs),
}

// ── serve ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to bind. Defaults to `server.address`.
    #[arg(long, value_name = "IP")]
    pub address: Option<IpAddr>,

    /// Port to listen on. Defaults to `server.port`.
    #[arg(short = 'p', long, value_name = "PORT")]
    pub port: Option<u16>,

    /// Bearer token for the private endpoints. Defaults to `server.api_token`.
    #[arg(long, value_name = "TOKEN", env = "BIBLIO_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `server.port`.
        key: String,
    },
    /// Set a configuration key in the config file.
    Set {
        /// Dotted key path.
        key: String,
        /// New value.
        value: String,
    },
    /// Print the effective configuration.
    List,
    /// Print the path to the active configuration file.
    Path,
}

/// Where to write a generated file; stdout when absent.
#[derive(Debug, Args)]
pub struct OutputFile {
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub path: Option<PathBuf>,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemberRef;
    use biblio_core::domain::{BookId, BookStatus, LoanState};
    use clap::Parser;

    #[test]
    fn parse_book_add() {
        let cli = Cli::parse_from([
            "biblio",
            "book",
            "add",
            "Rayuela",
            "--isbn",
            "978-84-204-1214-6",
            "--pages",
            "736",
            "--status",
            "disponible",
        ]);
        let Commands::Book(BookCommands::Add(args)) = cli.command else {
            panic!("expected book add");
        };
        assert_eq!(args.title, "Rayuela");
        assert_eq!(args.pages, Some(736));
        assert_eq!(args.status, Some(BookStatus::Available));
    }

    #[test]
    fn checkout_accepts_card_numbers() {
        let cli = Cli::parse_from(["biblio", "loan", "checkout", "2", "mbr-0001"]);
        let Commands::Loan(LoanCommands::Checkout(args)) = cli.command else {
            panic!("expected loan checkout");
        };
        assert_eq!(args.book, BookId::new(2));
        assert_eq!(args.member, MemberRef::Card("MBR-0001".into()));
    }

    #[test]
    fn loan_list_parses_state() {
        let cli = Cli::parse_from(["biblio", "loan", "list", "--state", "overdue"]);
        let Commands::Loan(LoanCommands::List(args)) = cli.command else {
            panic!("expected loan list");
        };
        assert_eq!(args.state, Some(LoanState::Overdue));
    }

    #[test]
    fn data_flag_is_global() {
        let cli = Cli::parse_from(["biblio", "book", "list", "--data", "lib.json"]);
        assert_eq!(cli.global.data, Some(PathBuf::from("lib.json")));
    }

    #[test]
    fn bad_book_id_is_rejected() {
        assert!(Cli::try_parse_from(["biblio", "book", "show", "zero"]).is_err());
        assert!(Cli::try_parse_from(["biblio", "book", "show", "0"]).is_err());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["biblio", "--quiet", "--verbose", "book", "list"]);
        assert!(result.is_err());
    }
}
