//! Report Service - loan reports and printable documents.
//!
//! Each report is prepared from the repositories into a plain struct and
//! rendered as text. No templating is involved.

use std::collections::BTreeMap;
use std::fmt::{self, Write as _};
use std::str::FromStr;

use chrono::NaiveDate;
use tracing::{debug, instrument};

use crate::{
    application::{
        ApplicationError,
        services::{
            BookQuery, CatalogService, InventoryService, InventoryView, LoanQuery, LoanService,
            LoanView, MembershipService, Repositories,
        },
    },
    domain::{Book, BookId, DomainError, LoanState, MemberId, MemberProfile},
    error::{Context, LibraryResult},
};

/// How report rows are grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupBy {
    #[default]
    None,
    Member,
    State,
    Month,
}

impl GroupBy {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Member => "member",
            Self::State => "state",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GroupBy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "" => Ok(Self::None),
            "member" => Ok(Self::Member),
            "state" => Ok(Self::State),
            "month" => Ok(Self::Month),
            other => Err(DomainError::InvalidValue {
                field: "group by",
                value: other.to_string(),
                expected: "none, member, state or month".into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanReportRequest {
    pub member: Option<MemberId>,
    /// `None` means every state.
    pub state: Option<LoanState>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub group_by: GroupBy,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoanTotals {
    pub active: usize,
    pub overdue: usize,
    pub returned: usize,
}

impl LoanTotals {
    fn count(rows: &[LoanView]) -> Self {
        rows.iter().fold(Self::default(), |mut t, row| {
            match row.loan.state {
                LoanState::Active => t.active += 1,
                LoanState::Overdue => t.overdue += 1,
                LoanState::Returned => t.returned += 1,
            }
            t
        })
    }

    pub const fn total(&self) -> usize {
        self.active + self.overdue + self.returned
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportGroup {
    pub key: String,
    pub rows: Vec<LoanView>,
}

/// Prepared loan report. Rows are sorted by start date, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanReport {
    pub generated_on: NaiveDate,
    pub request: LoanReportRequest,
    pub totals: LoanTotals,
    pub groups: Vec<ReportGroup>,
}

impl LoanReport {
    pub fn rows(&self) -> impl Iterator<Item = &LoanView> {
        self.groups.iter().flat_map(|g| g.rows.iter())
    }

    pub fn render(&self) -> LibraryResult<String> {
        self.write_text().context("rendering loan report")
    }

    fn write_text(&self) -> Result<String, fmt::Error> {
        let mut out = String::new();
        writeln!(out, "LOAN REPORT")?;
        writeln!(out, "Generated: {}", self.generated_on)?;
        if let Some(state) = self.request.state {
            writeln!(out, "State: {}", state)?;
        }
        match (self.request.from, self.request.to) {
            (None, None) => {}
            (from, to) => writeln!(
                out,
                "Period: {} .. {}",
                from.map_or_else(|| "start".to_string(), |d| d.to_string()),
                to.map_or_else(|| "today".to_string(), |d| d.to_string())
            )?,
        }
        writeln!(out)?;

        for group in &self.groups {
            if self.request.group_by != GroupBy::None {
                writeln!(out, "== {} ({}) ==", group.key, group.rows.len())?;
            }
            for row in &group.rows {
                write_loan_line(&mut out, row)?;
            }
            writeln!(out)?;
        }

        writeln!(
            out,
            "Total: {}  Active: {}  Overdue: {}  Returned: {}",
            self.totals.total(),
            self.totals.active,
            self.totals.overdue,
            self.totals.returned
        )?;
        Ok(out)
    }
}

fn write_loan_line(out: &mut String, row: &LoanView) -> fmt::Result {
    writeln!(
        out,
        "#{:<5} {}  due {}  {:<8} {:>3}d late  {}  ->  {}",
        row.loan.id,
        row.loan.start_date,
        row.due_date,
        row.loan.state.as_str(),
        row.days_late,
        row.book_title,
        row.member_label()
    )
}

#[derive(Clone)]
pub struct ReportService {
    repos: Repositories,
    catalog: CatalogService,
    members: MembershipService,
    loans: LoanService,
    inventory: InventoryService,
}

impl ReportService {
    pub fn new(
        repos: Repositories,
        catalog: CatalogService,
        members: MembershipService,
        loans: LoanService,
        inventory: InventoryService,
    ) -> Self {
        Self {
            repos,
            catalog,
            members,
            loans,
            inventory,
        }
    }

    /// Collect and group the loans matching a request.
    #[instrument(skip(self))]
    pub fn loan_report(&self, request: &LoanReportRequest) -> LibraryResult<LoanReport> {
        let query = LoanQuery {
            member: request.member,
            book: None,
            state: request.state,
            from: request.from,
            to: request.to,
        };
        let rows: Vec<LoanView> = self
            .loans
            .list(&query)?
            .into_iter()
            .map(|loan| self.loans.describe(loan))
            .collect::<LibraryResult<_>>()?;
        if rows.is_empty() {
            return Err(ApplicationError::EmptyReport.into());
        }
        debug!(rows = rows.len(), "Loan report prepared");

        let totals = LoanTotals::count(&rows);
        let groups = match request.group_by {
            GroupBy::None => vec![ReportGroup {
                key: "all".into(),
                rows,
            }],
            GroupBy::Member => group(rows, |r| r.member_label()),
            GroupBy::State => group(rows, |r| r.loan.state.to_string()),
            GroupBy::Month => group(rows, |r| r.loan.start_date.format("%Y-%m").to_string()),
        };

        Ok(LoanReport {
            generated_on: self.repos.clock.today(),
            request: request.clone(),
            totals,
            groups,
        })
    }

    /// A full description of one book.
    pub fn book_detail(&self, id: BookId) -> LibraryResult<String> {
        let book = self.catalog.get_book(id)?;
        let categories = self.catalog.category_names(&book)?;
        let loans = self.repos.loans.for_book(id)?;
        let stock = match self.repos.inventory.find_by_book(id)? {
            Some(_) => Some(self.inventory.for_book(id)?),
            None => None,
        };

        let mut out = String::new();
        write_book_detail(&mut out, &book, &categories, stock.as_ref(), loans.len())
            .context("rendering book detail")?;
        Ok(out)
    }

    /// Every book, one line each, ordered by title.
    pub fn catalog(&self) -> LibraryResult<String> {
        let books = self.catalog.list_books(&BookQuery::default())?;
        let mut out = String::new();
        write_catalog(&mut out, self.repos.clock.today(), &books).context("rendering catalogue")?;
        Ok(out)
    }

    /// The loan history of one member, newest first.
    pub fn member_loans(&self, id: MemberId) -> LibraryResult<String> {
        let profile = self.members.get(id)?;
        let rows: Vec<LoanView> = self
            .loans
            .list(&LoanQuery {
                member: Some(id),
                ..LoanQuery::default()
            })?
            .into_iter()
            .map(|loan| self.loans.describe(loan))
            .collect::<LibraryResult<_>>()?;

        let mut out = String::new();
        write_member_loans(&mut out, &profile, &rows).context("rendering member loans")?;
        Ok(out)
    }

    /// The membership card of one member.
    pub fn member_card(&self, id: MemberId) -> LibraryResult<String> {
        let profile = self.members.get(id)?;
        let status = if !profile.member.active {
            "INACTIVE"
        } else if self.members.is_expired(&profile.member) {
            "EXPIRED"
        } else {
            "VALID"
        };

        let mut out = String::new();
        write_member_card(&mut out, &profile, status).context("rendering member card")?;
        Ok(out)
    }
}

fn write_book_detail(
    out: &mut String,
    book: &Book,
    categories: &[String],
    stock: Option<&InventoryView>,
    loans: usize,
) -> fmt::Result {
    writeln!(out, "{}", book.title)?;
    writeln!(out, "{}", "=".repeat(book.title.chars().count()))?;
    field(out, "ISBN", book.isbn.as_ref().map(|i| i.to_string()))?;
    field(out, "Author", book.author.clone())?;
    field(out, "Publisher", book.publisher.clone())?;
    field(out, "Published", book.published_on.map(|d| d.to_string()))?;
    writeln!(out, "Pages:       {}", book.pages)?;
    writeln!(out, "Price:       {:.2}", book.price)?;
    writeln!(out, "Status:      {}", book.status)?;
    writeln!(out, "Available:   {}", if book.available() { "yes" } else { "no" })?;
    if !categories.is_empty() {
        writeln!(out, "Categories:  {}", categories.join(", "))?;
    }
    if let Some(stock) = stock {
        let s = &stock.snapshot;
        writeln!(
            out,
            "Stock:       {} total, {} loaned, {} available ({})",
            s.total, s.loaned, s.available, s.tier
        )?;
    }
    writeln!(out, "Loans:       {}", loans)?;
    if let Some(description) = &book.description {
        writeln!(out)?;
        writeln!(out, "{}", description)?;
    }
    Ok(())
}

fn write_catalog(out: &mut String, today: NaiveDate, books: &[Book]) -> fmt::Result {
    writeln!(out, "CATALOGUE")?;
    writeln!(out, "Generated: {}", today)?;
    writeln!(out)?;
    for book in books {
        writeln!(
            out,
            "#{:<5} {:<40} {:<25} {:<13} {}",
            book.id,
            book.title,
            book.author.as_deref().unwrap_or("-"),
            book.isbn.as_ref().map_or("-", |i| i.as_str()),
            book.status
        )?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "{} book(s), {} available",
        books.len(),
        books.iter().filter(|b| b.available()).count()
    )
}

fn write_member_loans(out: &mut String, profile: &MemberProfile, rows: &[LoanView]) -> fmt::Result {
    let totals = LoanTotals::count(rows);
    writeln!(out, "LOANS OF {}", profile.label())?;
    writeln!(out)?;
    if rows.is_empty() {
        writeln!(out, "No loans.")?;
    }
    for row in rows {
        write_loan_line(out, row)?;
    }
    writeln!(out)?;
    writeln!(
        out,
        "Total: {}  Open: {}  Returned: {}",
        totals.total(),
        totals.active + totals.overdue,
        totals.returned
    )
}

fn write_member_card(out: &mut String, profile: &MemberProfile, status: &str) -> fmt::Result {
    let rule = "-".repeat(40);
    writeln!(out, "{}", rule)?;
    writeln!(out, "LIBRARY MEMBERSHIP CARD")?;
    writeln!(out, "{}", rule)?;
    writeln!(out, "Card:        {}", profile.card_number())?;
    writeln!(out, "Name:        {}", profile.name())?;
    field(out, "Email", profile.email().map(|e| e.to_string()))?;
    field(out, "Phone", profile.phone().map(str::to_string))?;
    writeln!(out, "Registered:  {}", profile.member.registration_date)?;
    writeln!(out, "Expires:     {}", profile.member.expiry_date())?;
    writeln!(out, "Status:      {}", status)?;
    writeln!(out, "Open loans:  {}", profile.active_loans)?;
    writeln!(out, "{}", rule)
}

fn field(out: &mut String, label: &str, value: Option<String>) -> fmt::Result {
    match value {
        Some(value) => writeln!(out, "{:<12} {}", format!("{}:", label), value),
        None => Ok(()),
    }
}

/// Group rows by key, keeping groups in key order and rows in their order.
fn group<F>(rows: Vec<LoanView>, key: F) -> Vec<ReportGroup>
where
    F: Fn(&LoanView) -> String,
{
    let mut groups: BTreeMap<String, Vec<LoanView>> = BTreeMap::new();
    for row in rows {
        groups.entry(key(&row)).or_default().push(row);
    }
    groups
        .into_iter()
        .map(|(key, rows)| ReportGroup { key, rows })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_by_parses() {
        assert_eq!("Month".parse::<GroupBy>().unwrap(), GroupBy::Month);
        assert_eq!("".parse::<GroupBy>().unwrap(), GroupBy::None);
        assert!("year".parse::<GroupBy>().is_err());
    }
}
