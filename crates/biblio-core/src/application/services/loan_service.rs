//! Loan Service - the lending workflow.
//!
//! Checkout and return touch two records (the loan and the book). Each is
//! written as a small unit of work: the loan is written first and undone if
//! the book update fails, so a book is never left loaned without a loan or
//! the other way around.

use chrono::NaiveDate;
use tracing::{debug, error, info, instrument, warn};

use crate::{
    application::{LibrarySettings, services::Repositories},
    domain::{
        BookId, BookStatus, DomainError, DomainValidator as validator, Loan, LoanId, LoanState,
        MemberId,
    },
    error::LibraryResult,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutRequest {
    pub book_id: BookId,
    pub member_id: MemberId,
    /// Defaults to today.
    pub start_date: Option<NaiveDate>,
    /// Defaults to the configured loan length.
    pub duration_days: Option<i64>,
    pub notes: Option<String>,
}

impl CheckoutRequest {
    pub fn new(book_id: BookId, member_id: MemberId) -> Self {
        Self {
            book_id,
            member_id,
            start_date: None,
            duration_days: None,
            notes: None,
        }
    }
}

/// A completed checkout plus anything the librarian should know.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub loan: Loan,
    pub warnings: Vec<String>,
}

/// Filters for listing loans, newest start date first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoanQuery {
    pub member: Option<MemberId>,
    pub book: Option<BookId>,
    pub state: Option<LoanState>,
    /// Inclusive bounds on the start date.
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

/// A loan with the labels and derived values needed for display.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanView {
    pub loan: Loan,
    pub book_title: String,
    pub member_name: String,
    pub card_number: String,
    pub due_date: NaiveDate,
    pub days_late: i64,
}

impl LoanView {
    pub fn member_label(&self) -> String {
        format!("{} - {}", self.card_number, self.member_name)
    }
}

#[derive(Clone)]
pub struct LoanService {
    repos: Repositories,
    settings: LibrarySettings,
}

impl LoanService {
    pub fn new(repos: Repositories, settings: LibrarySettings) -> Self {
        Self { repos, settings }
    }

    /// Lend a book to a member.
    #[instrument(skip_all, fields(book = %request.book_id, member = %request.member_id))]
    pub fn checkout(&self, request: CheckoutRequest) -> LibraryResult<Checkout> {
        let mut book = self.repos.books.get(request.book_id)?;
        let member = self.repos.members.get(request.member_id)?;

        if let Some(open) = self.repos.loans.open_for_book(book.id)? {
            let holder = self.member_name(open.member_id)?;
            return Err(DomainError::BookAlreadyLoaned {
                book: book.title.clone(),
                member: holder,
            }
            .into());
        }
        if !book.available() {
            return Err(DomainError::BookUnavailable {
                book: book.title.clone(),
                status: book.status.to_string(),
            }
            .into());
        }
        if !member.active {
            return Err(DomainError::MemberInactive {
                card: member.card_number.clone(),
            }
            .into());
        }
        let open_loans = self
            .repos
            .loans
            .for_member(member.id)?
            .iter()
            .filter(|l| l.is_open())
            .count();
        if open_loans >= self.settings.max_active_loans {
            return Err(DomainError::LoanLimitReached {
                card: member.card_number.clone(),
                limit: self.settings.max_active_loans,
            }
            .into());
        }

        let today = self.repos.clock.today();
        let now = self.repos.clock.now();
        let mut warnings = Vec::new();
        if member.is_expired(today) {
            warn!(card = %member.card_number, expired = %member.expiry_date(), "Membership expired");
            warnings.push(format!(
                "Membership {} expired on {}",
                member.card_number,
                member.expiry_date()
            ));
        }

        let loan = Loan::open(
            self.repos.loans.next_id()?,
            book.id,
            member.id,
            request.start_date.unwrap_or(today),
            request
                .duration_days
                .unwrap_or(self.settings.default_loan_days),
            request.notes,
            now,
        )?;

        self.repos.loans.insert(loan.clone())?;
        book.set_status(BookStatus::Loaned, now);
        if let Err(err) = self.repos.books.update(book) {
            error!(loan = %loan.id, error = %err, "Book update failed, removing loan");
            self.repos.loans.remove(loan.id)?;
            return Err(err);
        }

        info!(loan = %loan.id, due = %loan.due_date(), "Book checked out");
        Ok(Checkout { loan, warnings })
    }

    /// Close an active or overdue loan and put the book back on the shelf.
    #[instrument(skip(self), fields(loan = %id))]
    pub fn return_loan(&self, id: LoanId) -> LibraryResult<Loan> {
        let before = self.repos.loans.get(id)?;
        let mut loan = before.clone();
        loan.mark_returned(self.repos.clock.today(), self.repos.clock.now())?;
        self.repos.loans.update(loan.clone())?;

        if let Err(err) = self.release_book(loan.book_id) {
            error!(error = %err, "Book update failed, reopening loan");
            self.repos.loans.update(before)?;
            return Err(err);
        }

        info!(days_late = loan.days_late(self.repos.clock.today()), "Loan returned");
        Ok(loan)
    }

    fn release_book(&self, id: BookId) -> LibraryResult<()> {
        let mut book = self.repos.books.get(id)?;
        if book.status == BookStatus::Loaned {
            book.set_status(BookStatus::Available, self.repos.clock.now());
            self.repos.books.update(book)?;
        }
        Ok(())
    }

    /// Extend an active loan that is not late; the term restarts today.
    #[instrument(skip(self), fields(loan = %id))]
    pub fn renew(&self, id: LoanId) -> LibraryResult<Loan> {
        let mut loan = self.repos.loans.get(id)?;
        loan.renew(self.repos.clock.today(), self.repos.clock.now())?;
        self.repos.loans.update(loan.clone())?;
        info!(due = %loan.due_date(), "Loan renewed");
        Ok(loan)
    }

    /// Move every active loan past its due date to overdue.
    ///
    /// Returns how many loans changed.
    #[instrument(skip(self))]
    pub fn sweep_overdue(&self) -> LibraryResult<usize> {
        let today = self.repos.clock.today();
        let now = self.repos.clock.now();
        let mut changed = 0;
        for mut loan in self.repos.loans.list()? {
            if loan.mark_overdue_if_due(today, now) {
                debug!(loan = %loan.id, "Loan is overdue");
                self.repos.loans.update(loan)?;
                changed += 1;
            }
        }
        info!(changed, "Overdue sweep finished");
        Ok(changed)
    }

    #[instrument(skip(self), fields(loan = %id))]
    pub fn delete(&self, id: LoanId) -> LibraryResult<Loan> {
        let loan = self.repos.loans.get(id)?;
        loan.ensure_deletable()?;
        self.repos.loans.remove(id)?;
        info!("Loan deleted");
        Ok(loan)
    }

    pub fn get(&self, id: LoanId) -> LibraryResult<Loan> {
        self.repos.loans.get(id)
    }

    pub fn list(&self, query: &LoanQuery) -> LibraryResult<Vec<Loan>> {
        validator::validate_date_range(query.from, query.to)?;
        let mut loans: Vec<Loan> = self
            .repos
            .loans
            .list()?
            .into_iter()
            .filter(|l| query.member.is_none_or(|m| m == l.member_id))
            .filter(|l| query.book.is_none_or(|b| b == l.book_id))
            .filter(|l| query.state.is_none_or(|s| s == l.state))
            .filter(|l| query.from.is_none_or(|d| l.start_date >= d))
            .filter(|l| query.to.is_none_or(|d| l.start_date <= d))
            .collect();
        loans.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));
        Ok(loans)
    }

    /// Attach titles, member labels and lateness as of today.
    pub fn describe(&self, loan: Loan) -> LibraryResult<LoanView> {
        let book = self.repos.books.get(loan.book_id)?;
        let member = self.repos.members.get(loan.member_id)?;
        let contact = self.repos.contacts.get(member.contact_id)?;
        Ok(LoanView {
            book_title: book.title,
            member_name: contact.name,
            card_number: member.card_number,
            due_date: loan.due_date(),
            days_late: loan.days_late(self.repos.clock.today()),
            loan,
        })
    }

    fn member_name(&self, id: MemberId) -> LibraryResult<String> {
        let member = self.repos.members.get(id)?;
        Ok(self.repos.contacts.get(member.contact_id)?.name)
    }
}
