//! `import`, `export` and `report` arguments.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use biblio_core::{
    application::{Delimiter, GroupBy},
    domain::{BookId, DataKind, ImportLogId, LoanState},
};

use super::OutputFile;
use crate::session::MemberRef;

// ── import ────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ImportCommands {
    /// Import books (name,isbn,autor,editorial,paginas,precio).
    Books(ImportFileArgs),

    /// Import members (name,email,telefono,direccion,fecha_alta).
    Members(ImportMembersArgs),

    /// Show the first lines of a file as they will be read.
    Preview {
        file: PathBuf,
        /// Treat the first line as data.
        #[arg(long)]
        no_header: bool,
    },

    /// Print a sample file for books or members.
    Template {
        kind: DataKind,
        #[command(flatten)]
        output: OutputFile,
    },

    /// List import logs, newest first, or show one.
    Logs {
        #[arg(value_name = "LOG_ID")]
        id: Option<ImportLogId>,
    },
}

#[derive(Debug, Args)]
pub struct ImportFileArgs {
    pub file: PathBuf,

    /// Field separator: , ; tab or |. Defaults to `import.delimiter`.
    #[arg(short = 'd', long)]
    pub delimiter: Option<Delimiter>,

    /// Treat the first line as data.
    #[arg(long)]
    pub no_header: bool,

    /// Update books whose ISBN already exists.
    #[arg(long)]
    pub update_existing: bool,

    /// Name recorded in the import log.
    #[arg(long)]
    pub actor: Option<String>,
}

#[derive(Debug, Args)]
pub struct ImportMembersArgs {
    #[command(flatten)]
    pub file: ImportFileArgs,

    /// Format of `fecha_alta`: %Y-%m-%d, %d/%m/%Y, %m/%d/%Y or %d-%m-%Y.
    #[arg(long, value_name = "FORMAT")]
    pub date_format: Option<String>,

    /// Create members even when the email is already registered.
    #[arg(long)]
    pub keep_duplicates: bool,
}

// ── export ────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// book, member or loan.
    pub kind: DataKind,

    /// Column keys in order. Defaults to the importable set.
    #[arg(short = 'f', long, value_delimiter = ',')]
    pub fields: Vec<String>,

    /// Prepend an `id` column.
    #[arg(long = "id")]
    pub include_id: bool,

    /// Earliest creation date.
    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    /// Latest creation date.
    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// Field separator: , ; or tab. Defaults to `export.delimiter`.
    #[arg(short = 'd', long)]
    pub delimiter: Option<Delimiter>,

    /// Write here instead of the generated file name.
    #[arg(short = 'o', long, value_name = "FILE", conflicts_with = "base64")]
    pub output: Option<PathBuf>,

    /// Print the file as base64 instead of writing it.
    #[arg(long)]
    pub base64: bool,

    /// List the selectable columns and exit.
    #[arg(long)]
    pub list_fields: bool,
}

// ── report ────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ReportCommands {
    /// Loan report with totals, optionally grouped.
    Loans(LoanReportArgs),

    /// Full description of one book.
    Book {
        #[arg(value_name = "BOOK_ID")]
        id: BookId,
    },

    /// Every book, one line each.
    Catalog,

    /// Membership card.
    MemberCard {
        #[arg(value_name = "MEMBER")]
        member: MemberRef,
    },

    /// Loan history of one member.
    MemberLoans {
        #[arg(value_name = "MEMBER")]
        member: MemberRef,
    },
}

#[derive(Debug, Args)]
pub struct LoanReportArgs {
    #[arg(long, value_name = "MEMBER")]
    pub member: Option<MemberRef>,

    /// active, overdue or returned. All states when omitted.
    #[arg(long)]
    pub state: Option<LoanState>,

    #[arg(long, value_name = "DATE")]
    pub from: Option<NaiveDate>,

    #[arg(long, value_name = "DATE")]
    pub to: Option<NaiveDate>,

    /// none, member, state or month.
    #[arg(short = 'g', long, default_value = "none")]
    pub group_by: GroupBy,

    #[command(flatten)]
    pub output: OutputFile,
}
