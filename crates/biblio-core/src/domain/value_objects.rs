//! Domain value objects: statuses, tiers, and validated identifiers.
//!
//! # Design
//!
//! These are pure value types with equality-by-value and no identity. Each
//! enum carries its string representation (`as_str`), a `Display` impl and a
//! `FromStr` parser that reports a [`DomainError`] on unknown input. The two
//! newtypes ([`Isbn`], [`Email`]) can only be built through their parsers, so
//! holding one means the value already passed its check.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── BookStatus ───────────────────────────────────────────────────────────────

/// Circulation status of a book.
///
/// A book is *available* exactly when its status is [`BookStatus::Available`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    #[default]
    Available,
    Loaned,
    Reserved,
    Maintenance,
}

impl BookStatus {
    pub const ALL: [Self; 4] = [
        Self::Available,
        Self::Loaned,
        Self::Reserved,
        Self::Maintenance,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Loaned => "loaned",
            Self::Reserved => "reserved",
            Self::Maintenance => "maintenance",
        }
    }

    pub const fn is_available(self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "available" | "disponible" => Ok(Self::Available),
            "loaned" | "prestado" => Ok(Self::Loaned),
            "reserved" | "reservado" => Ok(Self::Reserved),
            "maintenance" | "mantenimiento" => Ok(Self::Maintenance),
            other => Err(DomainError::InvalidValue {
                field: "status",
                value: other.to_string(),
                expected: "available, loaned, reserved or maintenance".into(),
            }),
        }
    }
}

// ── LoanState ────────────────────────────────────────────────────────────────

/// Lifecycle state of a loan.
///
/// ```text
/// active ──return──▶ returned
///   │                   ▲
///   └─sweep─▶ overdue ──┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanState {
    #[default]
    Active,
    Returned,
    Overdue,
}

impl LoanState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Returned => "returned",
            Self::Overdue => "overdue",
        }
    }

    /// Whether the loan still holds the book (not yet returned).
    pub const fn is_open(self) -> bool {
        matches!(self, Self::Active | Self::Overdue)
    }
}

impl fmt::Display for LoanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LoanState {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" | "activo" => Ok(Self::Active),
            "returned" | "devuelto" => Ok(Self::Returned),
            "overdue" | "vencido" => Ok(Self::Overdue),
            other => Err(DomainError::InvalidValue {
                field: "loan state",
                value: other.to_string(),
                expected: "active, returned or overdue".into(),
            }),
        }
    }
}

// ── StockTier ────────────────────────────────────────────────────────────────

/// Stock level bucket derived from the number of available copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockTier {
    Critical,
    Low,
    Normal,
    High,
}

impl StockTier {
    /// `< 2` critical, `< 5` low, `<= 10` normal, otherwise high.
    pub const fn from_available(available: i64) -> Self {
        if available < 2 {
            Self::Critical
        } else if available < 5 {
            Self::Low
        } else if available <= 10 {
            Self::Normal
        } else {
            Self::High
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl fmt::Display for StockTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockTier {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => Ok(Self::Critical),
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            other => Err(DomainError::InvalidValue {
                field: "stock tier",
                value: other.to_string(),
                expected: "critical, low, normal or high".into(),
            }),
        }
    }
}

// ── LiteraryGenre ────────────────────────────────────────────────────────────

/// Main genre of an author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LiteraryGenre {
    Novel,
    Poetry,
    Essay,
    ShortStory,
    Theatre,
    Other,
}

impl LiteraryGenre {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Novel => "novel",
            Self::Poetry => "poetry",
            Self::Essay => "essay",
            Self::ShortStory => "short_story",
            Self::Theatre => "theatre",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for LiteraryGenre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LiteraryGenre {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "novel" | "novela" => Ok(Self::Novel),
            "poetry" | "poesia" => Ok(Self::Poetry),
            "essay" | "ensayo" => Ok(Self::Essay),
            "short_story" | "story" | "cuento" => Ok(Self::ShortStory),
            "theatre" | "theater" | "teatro" => Ok(Self::Theatre),
            "other" | "otro" => Ok(Self::Other),
            other => Err(DomainError::InvalidValue {
                field: "literary genre",
                value: other.to_string(),
                expected: "novel, poetry, essay, short_story, theatre or other".into(),
            }),
        }
    }
}

// ── DataKind ─────────────────────────────────────────────────────────────────

/// Kind of record carried by an import or export batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataKind {
    Book,
    Member,
    Loan,
    Other,
}

impl DataKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Member => "member",
            Self::Loan => "loan",
            Self::Other => "other",
        }
    }

    /// Title-cased plural used in log names and reports.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Book => "Books",
            Self::Member => "Members",
            Self::Loan => "Loans",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "book" | "books" => Ok(Self::Book),
            "member" | "members" => Ok(Self::Member),
            "loan" | "loans" => Ok(Self::Loan),
            "other" => Ok(Self::Other),
            other => Err(DomainError::InvalidValue {
                field: "data kind",
                value: other.to_string(),
                expected: "book, member, loan or other".into(),
            }),
        }
    }
}

// ── ImportState ──────────────────────────────────────────────────────────────

/// Processing state of an import batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportState {
    #[default]
    Draft,
    Processing,
    Completed,
    CompletedWithErrors,
    Error,
}

impl ImportState {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::CompletedWithErrors => "completed_with_errors",
            Self::Error => "error",
        }
    }

    /// Outcome for a finished batch.
    pub const fn from_totals(succeeded: usize, failed: usize) -> Self {
        if failed == 0 {
            Self::Completed
        } else if succeeded > 0 {
            Self::CompletedWithErrors
        } else {
            Self::Error
        }
    }
}

impl fmt::Display for ImportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Isbn ─────────────────────────────────────────────────────────────────────

/// A normalized book identifier (ISBN-10 or ISBN-13).
///
/// Normalization strips dashes and spaces and upper-cases the value. The
/// result must be 10 or 13 characters long, all digits except the final
/// character, which may also be `X`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Isbn(String);

impl Isbn {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized: String = raw
            .chars()
            .filter(|c| *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        if !normalized.is_ascii() {
            return Err(DomainError::InvalidIsbn {
                value: raw.to_string(),
                reason: "must contain only digits",
            });
        }
        if normalized.len() != 10 && normalized.len() != 13 {
            return Err(DomainError::InvalidIsbn {
                value: raw.to_string(),
                reason: "must have 10 or 13 digits",
            });
        }

        let (body, check) = normalized.split_at(normalized.len() - 1);
        if !body.chars().all(|c| c.is_ascii_digit()) {
            return Err(DomainError::InvalidIsbn {
                value: raw.to_string(),
                reason: "must contain only digits",
            });
        }
        if !check.chars().all(|c| c.is_ascii_digit() || c == 'X') {
            return Err(DomainError::InvalidIsbn {
                value: raw.to_string(),
                reason: "check character must be a digit or X",
            });
        }

        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Isbn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Isbn {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Isbn {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Isbn> for String {
    fn from(value: Isbn) -> Self {
        value.0
    }
}

// ── Email ────────────────────────────────────────────────────────────────────

/// A trimmed, lower-cased email address with a dotted domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let normalized = raw.trim().to_lowercase();
        let valid = match normalized.split_once('@') {
            Some((local, domain)) => {
                !local.is_empty()
                    && !domain.contains('@')
                    && domain.contains('.')
                    && !domain.starts_with('.')
                    && !domain.ends_with('.')
            }
            None => false,
        };

        if valid {
            Ok(Self(normalized))
        } else {
            Err(DomainError::InvalidEmail {
                value: raw.trim().to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}
