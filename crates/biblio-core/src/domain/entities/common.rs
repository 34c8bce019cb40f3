use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

/// Declares a store-assigned numeric identifier.
///
/// Identifiers are positive and never reused; the store hands them out
/// through `next_id` on each repository port.
macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(value: u64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }

        impl FromStr for $name {
            type Err = DomainError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .trim_start_matches('#')
                    .parse::<u64>()
                    .ok()
                    .filter(|v| *v > 0)
                    .map(Self)
                    .ok_or_else(|| DomainError::InvalidValue {
                        field: $label,
                        value: s.to_string(),
                        expected: "a positive integer".into(),
                    })
            }
        }

        impl From<u64> for $name {
            fn from(value: u64) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Identifier of a [`super::Book`].
    BookId,
    "book id"
);
entity_id!(
    /// Identifier of a [`super::Contact`].
    ContactId,
    "contact id"
);
entity_id!(
    /// Identifier of a [`super::Member`].
    MemberId,
    "member id"
);
entity_id!(
    /// Identifier of a [`super::Loan`].
    LoanId,
    "loan id"
);
entity_id!(
    /// Identifier of a [`super::Category`].
    CategoryId,
    "category id"
);
entity_id!(
    /// Identifier of an [`super::InventoryRecord`].
    InventoryId,
    "inventory id"
);
entity_id!(
    /// Identifier of an [`super::ImportLog`].
    ImportLogId,
    "import log id"
);

/// Trims a free-text field and drops it when blank.
pub(crate) fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Trims a required text field, failing when blank.
pub(crate) fn required_text(value: &str, field: &'static str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::MissingRequiredField { field });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_parse_with_optional_hash() {
        assert_eq!("#12".parse::<BookId>().unwrap(), BookId::new(12));
        assert_eq!(" 7 ".parse::<LoanId>().unwrap(), LoanId::new(7));
    }

    #[test]
    fn zero_and_garbage_ids_are_rejected() {
        assert!("0".parse::<MemberId>().is_err());
        assert!("abc".parse::<MemberId>().is_err());
        assert!("-3".parse::<MemberId>().is_err());
    }

    #[test]
    fn blank_text_is_dropped() {
        assert_eq!(clean_text(Some("   ".into())), None);
        assert_eq!(clean_text(Some(" Anagrama ".into())), Some("Anagrama".into()));
        assert!(required_text("  ", "title").is_err());
    }
}
