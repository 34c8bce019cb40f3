//! The `Loan` aggregate and its state machine.
//!
//! Transitions:
//!
//! | From              | Action  | To        | Guard                        |
//! |-------------------|---------|-----------|------------------------------|
//! | (new)             | open    | active    | duration >= 1 day            |
//! | active / overdue  | return  | returned  |                              |
//! | active            | sweep   | overdue   | due date < today             |
//! | active            | renew   | active    | zero days late               |
//!
//! Deletion is only allowed once the loan is returned.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{error::DomainError, value_objects::LoanState};

use super::common::{BookId, LoanId, MemberId, clean_text};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub start_date: NaiveDate,
    pub duration_days: u32,
    pub return_date: Option<NaiveDate>,
    pub state: LoanState,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Loan {
    /// Open a new active loan.
    pub fn open(
        id: LoanId,
        book_id: BookId,
        member_id: MemberId,
        start_date: NaiveDate,
        duration_days: i64,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let duration_days = u32::try_from(duration_days)
            .ok()
            .filter(|d| *d >= 1)
            .ok_or(DomainError::InvalidLoanDuration {
                days: duration_days,
            })?;

        Ok(Self {
            id,
            book_id,
            member_id,
            start_date,
            duration_days,
            return_date: None,
            state: LoanState::Active,
            notes: clean_text(notes),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn due_date(&self) -> NaiveDate {
        self.start_date
            .checked_add_days(Days::new(u64::from(self.duration_days)))
            .unwrap_or(NaiveDate::MAX)
    }

    pub const fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Days past the due date.
    ///
    /// Returned loans measure against the return date, open loans against
    /// `today`. Never negative.
    pub fn days_late(&self, today: NaiveDate) -> i64 {
        let reference = match (self.state, self.return_date) {
            (LoanState::Returned, Some(returned)) => returned,
            (LoanState::Returned, None) => return 0,
            _ => today,
        };
        (reference - self.due_date()).num_days().max(0)
    }

    pub fn mark_returned(&mut self, today: NaiveDate, now: DateTime<Utc>) -> Result<(), DomainError> {
        if !self.is_open() {
            return Err(DomainError::LoanAlreadyReturned { loan: self.id.get() });
        }
        self.state = LoanState::Returned;
        self.return_date = Some(today);
        self.updated_at = now;
        Ok(())
    }

    /// Restart the loan period from `today`.
    pub fn renew(&mut self, today: NaiveDate, now: DateTime<Utc>) -> Result<(), DomainError> {
        if self.state != LoanState::Active {
            return Err(DomainError::LoanNotActive {
                loan: self.id.get(),
                state: self.state.to_string(),
            });
        }
        let late = self.days_late(today);
        if late > 0 {
            return Err(DomainError::LoanOverdue {
                loan: self.id.get(),
                days: late,
            });
        }
        self.start_date = today;
        self.updated_at = now;
        Ok(())
    }

    /// Flip an active loan past its due date to overdue. Returns whether it changed.
    pub fn mark_overdue_if_due(&mut self, today: NaiveDate, now: DateTime<Utc>) -> bool {
        if self.state == LoanState::Active && self.due_date() < today {
            self.state = LoanState::Overdue;
            self.updated_at = now;
            return true;
        }
        false
    }

    pub fn ensure_deletable(&self) -> Result<(), DomainError> {
        if self.is_open() {
            return Err(DomainError::OpenLoanDeletion {
                loan: self.id.get(),
                state: self.state.to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn loan(start: NaiveDate) -> Loan {
        Loan::open(
            LoanId::new(1),
            BookId::new(1),
            MemberId::new(1),
            start,
            14,
            None,
            now(),
        )
        .unwrap()
    }

    #[test]
    fn due_date_adds_duration() {
        assert_eq!(loan(date(2024, 1, 25)).due_date(), date(2024, 2, 8));
    }

    #[test]
    fn zero_duration_rejected() {
        let err = Loan::open(
            LoanId::new(1),
            BookId::new(1),
            MemberId::new(1),
            date(2024, 1, 1),
            0,
            None,
            now(),
        )
        .unwrap_err();
        assert_eq!(err, DomainError::InvalidLoanDuration { days: 0 });
    }

    #[test]
    fn lateness_for_open_loan_uses_today() {
        let l = loan(date(2024, 1, 1)); // due 2024-01-15
        assert_eq!(l.days_late(date(2024, 1, 10)), 0);
        assert_eq!(l.days_late(date(2024, 1, 15)), 0);
        assert_eq!(l.days_late(date(2024, 1, 20)), 5);
    }

    #[test]
    fn lateness_for_returned_loan_uses_return_date() {
        let mut l = loan(date(2024, 1, 1));
        l.mark_returned(date(2024, 1, 18), now()).unwrap();
        assert_eq!(l.days_late(date(2024, 12, 31)), 3);

        let mut early = loan(date(2024, 1, 1));
        early.mark_returned(date(2024, 1, 5), now()).unwrap();
        assert_eq!(early.days_late(date(2024, 12, 31)), 0);
    }

    #[test]
    fn return_twice_fails() {
        let mut l = loan(date(2024, 1, 1));
        l.mark_returned(date(2024, 1, 2), now()).unwrap();
        assert_eq!(l.state, LoanState::Returned);
        assert_eq!(l.return_date, Some(date(2024, 1, 2)));
        assert_eq!(
            l.mark_returned(date(2024, 1, 3), now()),
            Err(DomainError::LoanAlreadyReturned { loan: 1 })
        );
    }

    #[test]
    fn overdue_loan_can_be_returned() {
        let mut l = loan(date(2024, 1, 1));
        assert!(l.mark_overdue_if_due(date(2024, 2, 1), now()));
        assert_eq!(l.state, LoanState::Overdue);
        l.mark_returned(date(2024, 2, 2), now()).unwrap();
        assert_eq!(l.days_late(date(2024, 3, 1)), 18);
    }

    #[test]
    fn sweep_leaves_loans_within_term() {
        let mut l = loan(date(2024, 1, 1));
        assert!(!l.mark_overdue_if_due(date(2024, 1, 15), now()));
        assert_eq!(l.state, LoanState::Active);
    }

    #[test]
    fn renew_resets_start_date() {
        let mut l = loan(date(2024, 1, 1));
        l.renew(date(2024, 1, 10), now()).unwrap();
        assert_eq!(l.start_date, date(2024, 1, 10));
        assert_eq!(l.due_date(), date(2024, 1, 24));
    }

    #[test]
    fn renew_rejects_late_loan() {
        let mut l = loan(date(2024, 1, 1));
        assert_eq!(
            l.renew(date(2024, 1, 17), now()),
            Err(DomainError::LoanOverdue { loan: 1, days: 2 })
        );
    }

    #[test]
    fn renew_rejects_overdue_state() {
        let mut l = loan(date(2024, 1, 1));
        l.mark_overdue_if_due(date(2024, 2, 1), now());
        assert!(matches!(
            l.renew(date(2024, 1, 2), now()),
            Err(DomainError::LoanNotActive { .. })
        ));
    }

    #[test]
    fn only_returned_loans_are_deletable() {
        let mut l = loan(date(2024, 1, 1));
        assert!(l.ensure_deletable().is_err());
        l.mark_returned(date(2024, 1, 2), now()).unwrap();
        assert!(l.ensure_deletable().is_ok());
    }
}
