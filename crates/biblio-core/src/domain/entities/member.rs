//! Library membership, composed over a [`Contact`].

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::Email;

use super::common::{ContactId, MemberId, clean_text};
use super::contact::Contact;

/// A membership card held by exactly one contact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub contact_id: ContactId,
    pub card_number: String,
    pub registration_date: NaiveDate,
    pub term_months: u32,
    pub active: bool,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    pub fn new(
        id: MemberId,
        contact_id: ContactId,
        card_prefix: &str,
        registration_date: NaiveDate,
        term_months: u32,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            contact_id,
            card_number: card_number(card_prefix, id),
            registration_date,
            term_months,
            active: true,
            notes: clean_text(notes),
            created_at: now,
            updated_at: now,
        }
    }

    /// Registration date plus the membership term.
    pub fn expiry_date(&self) -> NaiveDate {
        self.registration_date
            .checked_add_months(Months::new(self.term_months))
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.expiry_date() < today
    }

    /// Restart the membership term from `today`.
    pub fn renew(&mut self, today: NaiveDate, now: DateTime<Utc>) {
        self.registration_date = today;
        self.updated_at = now;
    }

    pub fn set_active(&mut self, active: bool, now: DateTime<Utc>) {
        self.active = active;
        self.updated_at = now;
    }
}

/// `PREFIX-0001` style card numbers derived from the member id.
pub fn card_number(prefix: &str, id: MemberId) -> String {
    format!("{}-{:04}", prefix, id.get())
}

/// A member together with its contact and loan counters.
///
/// Identity fields (name, email, phone) live on the contact; the accessors
/// here forward to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberProfile {
    pub member: Member,
    pub contact: Contact,
    pub active_loans: usize,
    pub total_loans: usize,
}

impl MemberProfile {
    pub fn name(&self) -> &str {
        &self.contact.name
    }

    pub fn email(&self) -> Option<&Email> {
        self.contact.email.as_ref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.contact.phone.as_deref()
    }

    pub fn address(&self) -> Option<&str> {
        self.contact.address.as_deref()
    }

    pub fn card_number(&self) -> &str {
        &self.member.card_number
    }

    /// `"MBR-0001 - Name"`, used as the relation label.
    pub fn label(&self) -> String {
        format!("{} - {}", self.member.card_number, self.contact.name)
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

    fn member(registered: NaiveDate) -> Member {
        Member::new(
            MemberId::new(7),
            ContactId::new(3),
            "MBR",
            registered,
            12,
            None,
            now(),
        )
    }

    #[test]
    fn card_number_is_zero_padded() {
        assert_eq!(member(date(2024, 1, 1)).card_number, "MBR-0007");
        assert_eq!(card_number("SOC", MemberId::new(12345)), "SOC-12345");
    }

    #[test]
    fn expiry_is_one_year_after_registration() {
        assert_eq!(member(date(2024, 3, 15)).expiry_date(), date(2025, 3, 15));
        // Feb 29 clamps to Feb 28
        assert_eq!(member(date(2024, 2, 29)).expiry_date(), date(2025, 2, 28));
    }

    #[test]
    fn expired_after_expiry_day() {
        let m = member(date(2023, 1, 1));
        assert!(!m.is_expired(date(2024, 1, 1)));
        assert!(m.is_expired(date(2024, 1, 2)));
    }

    #[test]
    fn renew_resets_registration() {
        let mut m = member(date(2020, 1, 1));
        m.renew(date(2024, 6, 1), now());
        assert_eq!(m.registration_date, date(2024, 6, 1));
        assert_eq!(m.expiry_date(), date(2025, 6, 1));
    }
}
