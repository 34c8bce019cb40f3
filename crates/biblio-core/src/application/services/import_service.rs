//! Import Service - CSV batches of books and members.
//!
//! A batch runs in a single pass:
//! 1. Open an import log in state `processing`
//! 2. Decode the bytes and split them into rows
//! 3. Check, coerce and store each row, collecting row failures
//! 4. Finalize the log with the totals
//!
//! A bad row never aborts the batch. Only an unreadable or empty file does,
//! and that still finalizes the log (state `error`).

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::{
    application::{
        ApplicationError,
        csv::{Columns, CsvFormat, Table, decode_text},
        ports::TableCodec,
        services::{CatalogService, MemberRegistration, MembershipService, Repositories},
    },
    domain::{
        BookDraft, BookPatch, ContactDraft, DataKind, DomainError, DomainValidator as validator,
        Email, ImportLog, ImportLogId, Isbn,
    },
    error::{LibraryError, LibraryResult},
};

/// Column keys of a book file, in positional order.
pub const BOOK_COLUMNS: [&str; 6] = ["name", "isbn", "autor", "editorial", "paginas", "precio"];

/// Column keys of a member file, in positional order.
pub const MEMBER_COLUMNS: [&str; 5] = ["name", "email", "telefono", "direccion", "fecha_alta"];

const PREVIEW_LINES: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOptions {
    pub format: CsvFormat,
    /// chrono format for `fecha_alta`.
    pub date_format: String,
    /// Skip member rows whose email already belongs to a member.
    pub skip_duplicates: bool,
    /// Update books whose ISBN already exists instead of failing the row.
    pub update_existing: bool,
    pub actor: String,
    pub file_name: Option<String>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            format: CsvFormat::default(),
            date_format: "%Y-%m-%d".into(),
            skip_duplicates: true,
            update_existing: false,
            actor: "biblio".into(),
            file_name: None,
        }
    }
}

/// A failed row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.message)
    }
}

/// What happened to one successful row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowOutcome {
    Created(u64),
    Updated,
    Skipped,
}

/// Totals of a finished batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub log_id: ImportLogId,
    pub kind: DataKind,
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
    pub created_ids: Vec<u64>,
}

impl ImportSummary {
    /// Rows that produced a record (created or updated).
    pub fn succeeded(&self) -> usize {
        self.created + self.updated
    }

    pub fn failed(&self) -> usize {
        self.errors.len()
    }

    /// Human readable summary, including up to ten row errors.
    pub fn report(&self) -> String {
        let mut out = format!(
            "Import of {} finished\n\
             Processed: {}\n\
             Created:   {}\n\
             Updated:   {}\n\
             Skipped:   {}\n\
             Failed:    {}\n",
            self.kind.label().to_lowercase(),
            self.processed,
            self.created,
            self.updated,
            self.skipped,
            self.failed(),
        );
        if !self.errors.is_empty() {
            out.push_str("\nErrors:\n");
            for err in self.errors.iter().take(10) {
                out.push_str(&format!("  {}\n", err));
            }
            if self.errors.len() > 10 {
                out.push_str(&format!("  ... and {} more\n", self.errors.len() - 10));
            }
        }
        out
    }
}

#[derive(Clone)]
pub struct ImportService {
    repos: Repositories,
    codec: Arc<dyn TableCodec>,
    catalog: CatalogService,
    members: MembershipService,
}

impl ImportService {
    pub fn new(
        repos: Repositories,
        codec: Arc<dyn TableCodec>,
        catalog: CatalogService,
        members: MembershipService,
    ) -> Self {
        Self {
            repos,
            codec,
            catalog,
            members,
        }
    }

    #[instrument(skip(self, bytes, options), fields(file = ?options.file_name))]
    pub fn import_books(&self, bytes: &[u8], options: &ImportOptions) -> LibraryResult<ImportSummary> {
        self.run(DataKind::Book, bytes, options, &BOOK_COLUMNS, |cols, cells| {
            self.book_row(cols, cells, options)
        })
    }

    #[instrument(skip(self, bytes, options), fields(file = ?options.file_name))]
    pub fn import_members(
        &self,
        bytes: &[u8],
        options: &ImportOptions,
    ) -> LibraryResult<ImportSummary> {
        if !validator::is_supported_date_format(&options.date_format) {
            return Err(ApplicationError::ValidationFailed(format!(
                "unsupported date format '{}'",
                options.date_format
            ))
            .into());
        }
        self.run(DataKind::Member, bytes, options, &MEMBER_COLUMNS, |cols, cells| {
            self.member_row(cols, cells, options)
        })
    }

    fn run<F>(
        &self,
        kind: DataKind,
        bytes: &[u8],
        options: &ImportOptions,
        keys: &[&'static str],
        mut handle: F,
    ) -> LibraryResult<ImportSummary>
    where
        F: FnMut(&Columns, &[String]) -> Result<RowOutcome, String>,
    {
        let mut log = ImportLog::start(
            self.repos.import_logs.next_id()?,
            kind,
            options.actor.clone(),
            options.file_name.clone(),
            self.repos.clock.now(),
        );
        self.repos.import_logs.insert(log.clone())?;

        let table = match self.read_table(bytes, &options.format) {
            Ok(table) => table,
            Err(err) => {
                warn!(log = %log.id, error = %err, "Import aborted");
                log.fail(err.to_string())?;
                self.repos.import_logs.update(log)?;
                return Err(ApplicationError::ImportFailed {
                    reason: err.to_string(),
                }
                .into());
            }
        };

        let columns = table.columns(keys);
        let mut summary = ImportSummary {
            log_id: log.id,
            kind,
            processed: 0,
            created: 0,
            updated: 0,
            skipped: 0,
            errors: Vec::new(),
            created_ids: Vec::new(),
        };
        let mut skipped_notes = Vec::new();

        for row in &table.rows {
            summary.processed += 1;
            let outcome = match &row.cells {
                Ok(cells) => handle(&columns, cells),
                Err(message) => Err(message.clone()),
            };
            match outcome {
                Ok(RowOutcome::Created(id)) => {
                    summary.created += 1;
                    summary.created_ids.push(id);
                }
                Ok(RowOutcome::Updated) => summary.updated += 1,
                Ok(RowOutcome::Skipped) => {
                    summary.skipped += 1;
                    skipped_notes.push(format!("Line {}: skipped duplicate", row.line));
                }
                Err(message) => {
                    let err = RowError {
                        line: row.line,
                        message,
                    };
                    warn!(row = row.line, error = %err.message, "Row failed");
                    summary.errors.push(err);
                }
            }
        }

        let mut notes: Vec<String> = summary.errors.iter().map(ToString::to_string).collect();
        notes.extend(skipped_notes);
        log.finalize(
            summary.processed,
            summary.succeeded(),
            &notes,
            summary.created_ids.clone(),
        )?;
        self.repos.import_logs.update(log.clone())?;

        info!(
            log = %log.id,
            processed = summary.processed,
            succeeded = summary.succeeded(),
            failed = summary.failed(),
            state = %log.state,
            "Import finished"
        );
        Ok(summary)
    }

    fn read_table(&self, bytes: &[u8], format: &CsvFormat) -> LibraryResult<Table> {
        let text = decode_text(bytes);
        let table = self.codec.parse(&text, format)?;
        if table.is_empty() {
            return Err(ApplicationError::Codec {
                reason: "the file contains no data rows".into(),
            }
            .into());
        }
        Ok(table)
    }

    fn book_row(
        &self,
        cols: &Columns,
        cells: &[String],
        options: &ImportOptions,
    ) -> Result<RowOutcome, String> {
        let title = cols.get(cells, "name");
        if title.is_empty() {
            return Err("Title (name) is required".into());
        }
        let pages_raw = cols.get(cells, "paginas");
        let pages = validator::parse_pages(pages_raw)
            .map_err(|_| format!("Pages must be a number: {}", pages_raw))?;
        let price_raw = cols.get(cells, "precio");
        let price = validator::parse_price(price_raw)
            .map_err(|_| format!("Price must be a number: {}", price_raw))?;

        let isbn_raw = cols.get(cells, "isbn");
        let isbn = if isbn_raw.is_empty() {
            None
        } else {
            Some(Isbn::parse(isbn_raw).map_err(|e| e.to_string())?)
        };
        let author = non_empty(cols.get(cells, "autor"));
        let publisher = non_empty(cols.get(cells, "editorial"));

        if let Some(isbn) = &isbn {
            let existing = self.repos.books.find_by_isbn(isbn).map_err(|e| e.to_string())?;
            if let Some(existing) = existing {
                if !options.update_existing {
                    return Err(DomainError::DuplicateIsbn {
                        isbn: isbn.to_string(),
                    }
                    .to_string());
                }
                let patch = BookPatch {
                    title: Some(title.to_string()),
                    author,
                    publisher,
                    pages: Some(pages),
                    price: Some(price),
                    ..BookPatch::default()
                };
                self.catalog
                    .update_book(existing.id, patch)
                    .map_err(|e| e.to_string())?;
                return Ok(RowOutcome::Updated);
            }
        }

        let draft = BookDraft {
            isbn: isbn.map(String::from),
            author,
            publisher,
            pages,
            price,
            ..BookDraft::new(title)
        };
        let book = self.catalog.create_book(draft).map_err(|e| e.to_string())?;
        Ok(RowOutcome::Created(book.id.get()))
    }

    fn member_row(
        &self,
        cols: &Columns,
        cells: &[String],
        options: &ImportOptions,
    ) -> Result<RowOutcome, String> {
        let name = cols.get(cells, "name");
        if name.is_empty() {
            return Err("Name is required".into());
        }
        let email_raw = cols.get(cells, "email");
        let email = if email_raw.is_empty() {
            None
        } else {
            Some(Email::parse(email_raw).map_err(|_| format!("Invalid email: {}", email_raw))?)
        };
        let date_raw = cols.get(cells, "fecha_alta");
        let registration_date: Option<NaiveDate> = if date_raw.is_empty() {
            None
        } else {
            Some(
                validator::parse_date(date_raw, &options.date_format)
                    .map_err(|_| format!("Invalid date format: {}", date_raw))?,
            )
        };

        if let Some(email) = &email {
            let existing = self.members.find_by_email(email).map_err(|e| e.to_string())?;
            if existing.is_some() && options.skip_duplicates {
                return Ok(RowOutcome::Skipped);
            }
        }

        let draft = ContactDraft {
            email: email.map(String::from),
            phone: non_empty(cols.get(cells, "telefono")),
            address: non_empty(cols.get(cells, "direccion")),
            ..ContactDraft::person(name)
        };
        let registration = MemberRegistration {
            registration_date,
            ..MemberRegistration::new_person(draft)
        };
        let profile = self
            .members
            .register(registration)
            .map_err(|e: LibraryError| e.to_string())?;
        Ok(RowOutcome::Created(profile.member.id.get()))
    }

    /// The first lines of a file as they will be read, for a quick check
    /// before importing.
    pub fn preview(&self, bytes: &[u8], has_header: bool) -> String {
        let text = decode_text(bytes);
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        let mut out = String::new();
        for (i, line) in lines.iter().take(PREVIEW_LINES).enumerate() {
            if i == 0 && has_header {
                out.push_str(&format!("[HEADER] {}\n", line));
            } else {
                let number = if has_header { i } else { i + 1 };
                out.push_str(&format!("[Line {}] {}\n", number, line));
            }
        }
        if lines.len() > PREVIEW_LINES {
            out.push_str(&format!("... and {} more lines\n", lines.len() - PREVIEW_LINES));
        }
        out
    }

    /// A sample file with the expected columns and three rows.
    pub fn template(&self, kind: DataKind) -> LibraryResult<String> {
        match kind {
            DataKind::Book => Ok([
                "name,isbn,autor,editorial,paginas,precio",
                "Cien años de soledad,978-84-376-0494-7,Gabriel García Márquez,Cátedra,471,19.90",
                "Rayuela,978-84-204-1214-6,Julio Cortázar,Alfaguara,736,22.50",
                "Ficciones,978-84-206-3380-0,Jorge Luis Borges,Alianza,224,\"12,95\"",
            ]
            .join("\n")
                + "\n"),
            DataKind::Member => Ok([
                "name,email,telefono,direccion,fecha_alta",
                "Ana García,ana.garcia@example.com,600111222,Calle Mayor 1,2024-01-15",
                "Luis Pérez,luis.perez@example.com,600333444,Avenida del Sol 12,2024-02-01",
                "Marta Ruiz,marta.ruiz@example.com,,Plaza Nueva 3,",
            ]
            .join("\n")
                + "\n"),
            other => Err(ApplicationError::ValidationFailed(format!(
                "no import template for {}",
                other
            ))
            .into()),
        }
    }

    /// Import logs, newest first.
    pub fn logs(&self) -> LibraryResult<Vec<ImportLog>> {
        self.repos.import_logs.list()
    }

    pub fn log(&self, id: ImportLogId) -> LibraryResult<ImportLog> {
        self.repos.import_logs.get(id)
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
