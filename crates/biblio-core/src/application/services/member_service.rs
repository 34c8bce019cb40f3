//! Membership Service - members and the contacts behind them.

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::{
    application::{LibrarySettings, services::Repositories},
    domain::{
        Contact, ContactDraft, ContactId, DomainError, Email, Member, MemberId, MemberProfile,
    },
    error::LibraryResult,
};

/// Who a new member is.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberContact {
    Existing(ContactId),
    New(ContactDraft),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MemberRegistration {
    pub contact: MemberContact,
    /// Defaults to today.
    pub registration_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

impl MemberRegistration {
    pub fn new_person(draft: ContactDraft) -> Self {
        Self {
            contact: MemberContact::New(draft),
            registration_date: None,
            notes: None,
        }
    }
}

/// Contact and note changes. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberQuery {
    pub active: Option<bool>,
    /// Case-insensitive match on name, email or card number.
    pub search: Option<String>,
}

#[derive(Clone)]
pub struct MembershipService {
    repos: Repositories,
    settings: LibrarySettings,
}

impl MembershipService {
    pub fn new(repos: Repositories, settings: LibrarySettings) -> Self {
        Self { repos, settings }
    }

    /// Register a member, creating the contact first when needed.
    ///
    /// A newly created contact is removed again if the member cannot be
    /// stored.
    #[instrument(skip_all)]
    pub fn register(&self, registration: MemberRegistration) -> LibraryResult<MemberProfile> {
        let now = self.repos.clock.now();
        let (contact, created) = match registration.contact {
            MemberContact::Existing(id) => (self.repos.contacts.get(id)?, false),
            MemberContact::New(draft) => {
                let id = self.repos.contacts.next_id()?;
                let contact = Contact::new(id, draft, now)?;
                self.repos.contacts.insert(contact.clone())?;
                (contact, true)
            }
        };

        let member = match self.new_member(&contact, registration.registration_date, registration.notes) {
            Ok(member) => member,
            Err(err) => {
                if created {
                    self.repos.contacts.remove(contact.id)?;
                }
                return Err(err);
            }
        };

        info!(member = %member.id, card = %member.card_number, "Member registered");
        Ok(MemberProfile {
            member,
            contact,
            active_loans: 0,
            total_loans: 0,
        })
    }

    fn new_member(
        &self,
        contact: &Contact,
        registration_date: Option<NaiveDate>,
        notes: Option<String>,
    ) -> LibraryResult<Member> {
        if contact.is_company {
            return Err(DomainError::CompanyCannotBeMember {
                contact: contact.name.clone(),
            }
            .into());
        }
        if let Some(existing) = self.repos.members.find_by_contact(contact.id)? {
            return Err(DomainError::ContactAlreadyMember {
                contact: contact.name.clone(),
                card: existing.card_number,
            }
            .into());
        }

        let id = self.repos.members.next_id()?;
        let member = Member::new(
            id,
            contact.id,
            &self.settings.card_prefix,
            registration_date.unwrap_or_else(|| self.repos.clock.today()),
            self.settings.membership_months,
            notes,
            self.repos.clock.now(),
        );
        self.repos.members.insert(member.clone())?;
        Ok(member)
    }

    pub fn get(&self, id: MemberId) -> LibraryResult<MemberProfile> {
        let member = self.repos.members.get(id)?;
        self.profile(member)
    }

    /// Members ordered by card number.
    pub fn list(&self, query: &MemberQuery) -> LibraryResult<Vec<MemberProfile>> {
        let term = query
            .search
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let mut profiles = Vec::new();
        for member in self.repos.members.list()? {
            if query.active.is_some_and(|a| a != member.active) {
                continue;
            }
            let profile = self.profile(member)?;
            if let Some(term) = &term {
                let hit = profile.name().to_lowercase().contains(term)
                    || profile.card_number().to_lowercase().contains(term)
                    || profile.email().is_some_and(|e| e.as_str().contains(term));
                if !hit {
                    continue;
                }
            }
            profiles.push(profile);
        }
        profiles.sort_by(|a, b| a.card_number().cmp(b.card_number()));
        Ok(profiles)
    }

    /// Look a member up by card number (`MBR-0007`), ignoring case.
    pub fn find_by_card(&self, card: &str) -> LibraryResult<Option<MemberProfile>> {
        let card = card.trim();
        match self
            .repos
            .members
            .list()?
            .into_iter()
            .find(|m| m.card_number.eq_ignore_ascii_case(card))
        {
            Some(member) => self.profile(member).map(Some),
            None => Ok(None),
        }
    }

    /// The member whose contact has this email.
    pub fn find_by_email(&self, email: &Email) -> LibraryResult<Option<MemberProfile>> {
        let Some(contact) = self.repos.contacts.find_by_email(email)? else {
            return Ok(None);
        };
        match self.repos.members.find_by_contact(contact.id)? {
            Some(member) => self.profile(member).map(Some),
            None => Ok(None),
        }
    }

    #[instrument(skip(self, patch), fields(member = %id))]
    pub fn update(&self, id: MemberId, patch: MemberPatch) -> LibraryResult<MemberProfile> {
        let mut member = self.repos.members.get(id)?;
        let contact = self.repos.contacts.get(member.contact_id)?;
        let now = self.repos.clock.now();

        let draft = ContactDraft {
            name: patch.name.unwrap_or_else(|| contact.name.clone()),
            email: patch
                .email
                .or_else(|| contact.email.as_ref().map(|e| e.to_string())),
            phone: patch.phone.or_else(|| contact.phone.clone()),
            address: patch.address.or_else(|| contact.address.clone()),
            is_company: contact.is_company,
            author: contact.author.clone(),
        };
        let updated = Contact {
            created_at: contact.created_at,
            ..Contact::new(contact.id, draft, now)?
        };
        self.repos.contacts.update(updated)?;

        if patch.notes.is_some() {
            member.notes = patch.notes.filter(|n| !n.trim().is_empty());
            member.updated_at = now;
            self.repos.members.update(member.clone())?;
        }
        self.profile(member)
    }

    /// Restart the membership term from today.
    #[instrument(skip(self), fields(member = %id))]
    pub fn renew(&self, id: MemberId) -> LibraryResult<MemberProfile> {
        let mut member = self.repos.members.get(id)?;
        member.renew(self.repos.clock.today(), self.repos.clock.now());
        self.repos.members.update(member.clone())?;
        info!(expires = %member.expiry_date(), "Membership renewed");
        self.profile(member)
    }

    #[instrument(skip(self), fields(member = %id))]
    pub fn set_active(&self, id: MemberId, active: bool) -> LibraryResult<MemberProfile> {
        let mut member = self.repos.members.get(id)?;
        member.set_active(active, self.repos.clock.now());
        self.repos.members.update(member.clone())?;
        info!(active, "Member activation changed");
        self.profile(member)
    }

    /// Whether the membership has run past its expiry date today.
    pub fn is_expired(&self, member: &Member) -> bool {
        member.is_expired(self.repos.clock.today())
    }

    /// Delete a member and their closed loans. The contact is kept.
    #[instrument(skip(self), fields(member = %id))]
    pub fn delete(&self, id: MemberId) -> LibraryResult<Member> {
        let member = self.repos.members.get(id)?;
        let loans = self.repos.loans.for_member(id)?;
        let open = loans.iter().filter(|l| l.is_open()).count();
        if open > 0 {
            warn!(open, "Refusing to delete member with open loans");
            return Err(DomainError::MemberHasOpenLoans {
                card: member.card_number.clone(),
                count: open,
            }
            .into());
        }
        for loan in loans {
            self.repos.loans.remove(loan.id)?;
        }
        self.repos.members.remove(id)?;
        info!("Member deleted");
        Ok(member)
    }

    pub(crate) fn profile(&self, member: Member) -> LibraryResult<MemberProfile> {
        let contact = self.repos.contacts.get(member.contact_id)?;
        let loans = self.repos.loans.for_member(member.id)?;
        Ok(MemberProfile {
            active_loans: loans.iter().filter(|l| l.is_open()).count(),
            total_loans: loans.len(),
            member,
            contact,
        })
    }
}
