//! Export Service - books, members and loans as CSV.
//!
//! Column keys match the import files, so an export with the default fields
//! can be imported again.

use std::sync::Arc;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, instrument};

use crate::{
    application::{
        ApplicationError,
        csv::{Delimiter, with_bom},
        ports::TableCodec,
        services::{MembershipService, Repositories},
    },
    domain::{Book, DataKind, DomainValidator as validator, Loan, MemberProfile},
    error::{LibraryError, LibraryResult},
};

/// One selectable column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportField {
    pub key: &'static str,
    pub label: &'static str,
    pub default: bool,
}

const fn field(key: &'static str, label: &'static str, default: bool) -> ExportField {
    ExportField { key, label, default }
}

const BOOK_FIELDS: &[ExportField] = &[
    field("name", "Title", true),
    field("isbn", "ISBN", true),
    field("autor", "Author", true),
    field("editorial", "Publisher", true),
    field("paginas", "Pages", true),
    field("precio", "Price", true),
    field("estado", "Status", true),
    field("fecha_publicacion", "Publication date", false),
    field("disponible", "Available", false),
    field("categorias", "Categories", false),
    field("descripcion", "Description", false),
    field("creado", "Created", false),
];

const MEMBER_FIELDS: &[ExportField] = &[
    field("name", "Name", true),
    field("email", "Email", true),
    field("telefono", "Phone", true),
    field("direccion", "Address", true),
    field("fecha_alta", "Registration date", true),
    field("numero_carnet", "Card number", true),
    field("activo", "Active", true),
    field("fecha_expiracion", "Expiry date", false),
    field("prestamos_activos", "Active loans", false),
    field("creado", "Created", false),
];

const LOAN_FIELDS: &[ExportField] = &[
    field("libro", "Book", true),
    field("miembro", "Member", true),
    field("fecha_prestamo", "Loan date", true),
    field("fecha_devolucion", "Due date", true),
    field("estado", "State", true),
    field("dias_prestamo", "Loan days", false),
    field("fecha_devolucion_real", "Return date", false),
    field("dias_retraso", "Days late", false),
    field("creado", "Created", false),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRequest {
    pub kind: DataKind,
    /// Column keys in output order. Empty selects the default columns.
    pub fields: Vec<String>,
    /// Prepend an `id` column.
    pub include_id: bool,
    /// Inclusive bounds on the creation date.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub delimiter: Delimiter,
}

impl ExportRequest {
    pub fn new(kind: DataKind) -> Self {
        Self {
            kind,
            fields: Vec::new(),
            include_id: false,
            from: None,
            to: None,
            delimiter: Delimiter::Semicolon,
        }
    }
}

/// A finished export: UTF-8 with a byte order mark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub records: usize,
}

impl ExportFile {
    /// The file content as standard base64, for transports that need text.
    pub fn base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }
}

#[derive(Clone)]
pub struct ExportService {
    repos: Repositories,
    codec: Arc<dyn TableCodec>,
    members: MembershipService,
}

impl ExportService {
    pub fn new(repos: Repositories, codec: Arc<dyn TableCodec>, members: MembershipService) -> Self {
        Self {
            repos,
            codec,
            members,
        }
    }

    /// Columns available for a record kind.
    pub fn fields(kind: DataKind) -> LibraryResult<&'static [ExportField]> {
        match kind {
            DataKind::Book => Ok(BOOK_FIELDS),
            DataKind::Member => Ok(MEMBER_FIELDS),
            DataKind::Loan => Ok(LOAN_FIELDS),
            DataKind::Other => Err(ApplicationError::ValidationFailed(
                "only books, members and loans can be exported".into(),
            )
            .into()),
        }
    }

    #[instrument(skip_all, fields(kind = %request.kind))]
    pub fn export(&self, request: &ExportRequest) -> LibraryResult<ExportFile> {
        validator::validate_date_range(request.from, request.to)?;
        let keys = Self::selected_keys(request)?;

        let in_range = |created: DateTime<Utc>| {
            let day = created.date_naive();
            request.from.is_none_or(|f| day >= f) && request.to.is_none_or(|t| day <= t)
        };

        let rows: Vec<Vec<String>> = match request.kind {
            DataKind::Book => self
                .repos
                .books
                .list()?
                .into_iter()
                .filter(|b| in_range(b.created_at))
                .map(|b| self.row(request.include_id, b.id.get(), &keys, |k| self.book_value(&b, k)))
                .collect::<LibraryResult<_>>()?,
            DataKind::Member => {
                let mut rows = Vec::new();
                for member in self.repos.members.list()? {
                    if !in_range(member.created_at) {
                        continue;
                    }
                    let profile = self.members.profile(member)?;
                    rows.push(self.row(request.include_id, profile.member.id.get(), &keys, |k| {
                        Ok(member_value(&profile, k))
                    })?);
                }
                rows
            }
            DataKind::Loan => self
                .repos
                .loans
                .list()?
                .into_iter()
                .filter(|l| in_range(l.created_at))
                .map(|l| self.row(request.include_id, l.id.get(), &keys, |k| self.loan_value(&l, k)))
                .collect::<LibraryResult<_>>()?,
            DataKind::Other => Vec::new(),
        };

        if rows.is_empty() {
            return Err(ApplicationError::NothingToExport {
                kind: request.kind.to_string(),
            }
            .into());
        }

        let mut header: Vec<String> = Vec::with_capacity(keys.len() + 1);
        if request.include_id {
            header.push("id".into());
        }
        header.extend(keys.iter().map(|k| k.to_string()));

        let body = self.codec.write(&header, &rows, request.delimiter)?;
        let file = ExportFile {
            file_name: format!(
                "export_{}_{}.csv",
                request.kind,
                self.repos.clock.now().format("%Y%m%d_%H%M")
            ),
            bytes: with_bom(body),
            records: rows.len(),
        };
        info!(records = file.records, file = %file.file_name, "Export written");
        Ok(file)
    }

    fn selected_keys(request: &ExportRequest) -> LibraryResult<Vec<&'static str>> {
        let available = Self::fields(request.kind)?;
        if request.fields.is_empty() {
            return Ok(available.iter().filter(|f| f.default).map(|f| f.key).collect());
        }
        request
            .fields
            .iter()
            .map(|wanted| {
                available
                    .iter()
                    .find(|f| f.key == wanted.trim())
                    .map(|f| f.key)
                    .ok_or_else(|| {
                        LibraryError::from(ApplicationError::UnknownField {
                            kind: request.kind.to_string(),
                            field: wanted.trim().to_string(),
                        })
                    })
            })
            .collect()
    }

    fn row<F>(&self, include_id: bool, id: u64, keys: &[&str], mut value: F) -> LibraryResult<Vec<String>>
    where
        F: FnMut(&str) -> LibraryResult<String>,
    {
        let mut row = Vec::with_capacity(keys.len() + 1);
        if include_id {
            row.push(id.to_string());
        }
        for &key in keys {
            row.push(value(key)?);
        }
        Ok(row)
    }

    fn book_value(&self, book: &Book, key: &str) -> LibraryResult<String> {
        Ok(match key {
            "name" => book.title.clone(),
            "isbn" => opt(book.isbn.as_ref().map(|i| i.to_string())),
            "autor" => match (&book.author, book.author_id) {
                (Some(author), _) => author.clone(),
                (None, Some(id)) => self.repos.contacts.get(id)?.display_name(),
                (None, None) => String::new(),
            },
            "editorial" => opt(book.publisher.clone()),
            "paginas" => book.pages.to_string(),
            "precio" => format!("{:.2}", book.price),
            "estado" => book.status.to_string(),
            "fecha_publicacion" => date(book.published_on),
            "disponible" => yes_no(book.available()),
            "categorias" => book
                .categories
                .iter()
                .map(|id| self.repos.categories.get(*id).map(|c| c.name))
                .collect::<LibraryResult<Vec<_>>>()?
                .join(", "),
            "descripcion" => opt(book.description.clone()),
            "creado" => datetime(book.created_at),
            _ => String::new(),
        })
    }

    fn loan_value(&self, loan: &Loan, key: &str) -> LibraryResult<String> {
        Ok(match key {
            "libro" => self.repos.books.get(loan.book_id)?.label(),
            "miembro" => {
                let member = self.repos.members.get(loan.member_id)?;
                let contact = self.repos.contacts.get(member.contact_id)?;
                format!("{} - {}", member.card_number, contact.name)
            }
            "fecha_prestamo" => loan.start_date.format("%Y-%m-%d").to_string(),
            "fecha_devolucion" => loan.due_date().format("%Y-%m-%d").to_string(),
            "estado" => loan.state.to_string(),
            "dias_prestamo" => loan.duration_days.to_string(),
            "fecha_devolucion_real" => date(loan.return_date),
            "dias_retraso" => loan.days_late(self.repos.clock.today()).to_string(),
            "creado" => datetime(loan.created_at),
            _ => String::new(),
        })
    }
}

fn member_value(profile: &MemberProfile, key: &str) -> String {
    let member = &profile.member;
    match key {
        "name" => profile.name().to_string(),
        "email" => opt(profile.email().map(|e| e.to_string())),
        "telefono" => opt(profile.phone().map(str::to_string)),
        "direccion" => opt(profile.address().map(str::to_string)),
        "fecha_alta" => member.registration_date.format("%Y-%m-%d").to_string(),
        "numero_carnet" => member.card_number.clone(),
        "activo" => yes_no(member.active),
        "fecha_expiracion" => member.expiry_date().format("%Y-%m-%d").to_string(),
        "prestamos_activos" => profile.active_loans.to_string(),
        "creado" => datetime(member.created_at),
        _ => String::new(),
    }
}

fn opt(value: Option<String>) -> String {
    value.unwrap_or_default()
}

fn date(value: Option<NaiveDate>) -> String {
    value.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

fn datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M:%S").to_string()
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}
