//! Contacts: the identity behind members and authors.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    value_objects::{Email, LiteraryGenre},
};

use super::common::{ContactId, clean_text, required_text};

/// A person or organisation known to the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_company: bool,
    pub author: Option<AuthorProfile>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Extra data carried by contacts that write books.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorProfile {
    pub biography: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub death_date: Option<NaiveDate>,
    pub nationality: Option<String>,
    pub genre: Option<LiteraryGenre>,
}

impl AuthorProfile {
    pub fn validate(&self) -> Result<(), DomainError> {
        if let (Some(birth), Some(death)) = (self.birth_date, self.death_date) {
            if death < birth {
                return Err(DomainError::InvalidLifespan {
                    birth: birth.to_string(),
                    death: death.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Input for creating a contact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactDraft {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_company: bool,
    pub author: Option<AuthorProfile>,
}

impl ContactDraft {
    pub fn person(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl Contact {
    pub fn new(id: ContactId, draft: ContactDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let email = match clean_text(draft.email) {
            Some(raw) => Some(Email::parse(&raw)?),
            None => None,
        };
        if let Some(profile) = &draft.author {
            profile.validate()?;
        }
        Ok(Self {
            id,
            name: required_text(&draft.name, "name")?,
            email,
            phone: clean_text(draft.phone),
            address: clean_text(draft.address),
            is_company: draft.is_company,
            author: draft.author.map(|p| AuthorProfile {
                biography: clean_text(p.biography),
                nationality: clean_text(p.nationality),
                ..p
            }),
            created_at: now,
            updated_at: now,
        })
    }

    pub const fn is_author(&self) -> bool {
        self.author.is_some()
    }

    /// `"Name (Nationality)"` for authors with a known nationality.
    pub fn display_name(&self) -> String {
        match self.author.as_ref().and_then(|a| a.nationality.as_deref()) {
            Some(nationality) => format!("{} ({})", self.name, nationality),
            None => self.name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn author_display_name_includes_nationality() {
        let draft = ContactDraft {
            author: Some(AuthorProfile {
                nationality: Some("Colombiana".into()),
                genre: Some(LiteraryGenre::Novel),
                ..AuthorProfile::default()
            }),
            ..ContactDraft::person("Gabriel García Márquez")
        };
        let contact = Contact::new(ContactId::new(1), draft, now()).unwrap();
        assert!(contact.is_author());
        assert_eq!(contact.display_name(), "Gabriel García Márquez (Colombiana)");
    }

    #[test]
    fn plain_contact_display_name_is_name() {
        let contact = Contact::new(ContactId::new(1), ContactDraft::person("Ana"), now()).unwrap();
        assert!(!contact.is_author());
        assert_eq!(contact.display_name(), "Ana");
    }

    #[test]
    fn email_is_normalized() {
        let draft = ContactDraft::person("Ana").email("  Ana@Example.COM ");
        let contact = Contact::new(ContactId::new(1), draft, now()).unwrap();
        assert_eq!(contact.email.unwrap().as_str(), "ana@example.com");
    }

    #[test]
    fn death_before_birth_is_rejected() {
        let draft = ContactDraft {
            author: Some(AuthorProfile {
                birth_date: NaiveDate::from_ymd_opt(1950, 1, 1),
                death_date: NaiveDate::from_ymd_opt(1940, 1, 1),
                ..AuthorProfile::default()
            }),
            ..ContactDraft::person("X")
        };
        assert!(matches!(
            Contact::new(ContactId::new(1), draft, now()),
            Err(DomainError::InvalidLifespan { .. })
        ));
    }
}
