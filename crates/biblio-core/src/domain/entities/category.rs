use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;

use super::common::{CategoryId, clean_text, required_text};

/// Number of colour slots a category can pick from.
pub const CATEGORY_COLORS: u8 = 12;

/// A shelf label; books may carry any number of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub description: Option<String>,
    pub color: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    pub fn new(
        id: CategoryId,
        name: &str,
        description: Option<String>,
        color: u8,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        check_color(color)?;
        Ok(Self {
            id,
            name: required_text(name, "name")?,
            description: clean_text(description),
            color,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn rename(&mut self, name: &str, now: DateTime<Utc>) -> Result<(), DomainError> {
        self.name = required_text(name, "name")?;
        self.updated_at = now;
        Ok(())
    }

    pub fn recolor(&mut self, color: u8, now: DateTime<Utc>) -> Result<(), DomainError> {
        check_color(color)?;
        self.color = color;
        self.updated_at = now;
        Ok(())
    }

    /// Case-insensitive name comparison used for uniqueness.
    pub fn same_name(&self, other: &str) -> bool {
        self.name.to_lowercase() == other.trim().to_lowercase()
    }
}

fn check_color(color: u8) -> Result<(), DomainError> {
    if color >= CATEGORY_COLORS {
        return Err(DomainError::InvalidValue {
            field: "color",
            value: color.to_string(),
            expected: format!("0 to {}", CATEGORY_COLORS - 1),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn color_out_of_range_rejected() {
        assert!(Category::new(CategoryId::new(1), "Novela", None, 12, now()).is_err());
        assert!(Category::new(CategoryId::new(1), "Novela", None, 11, now()).is_ok());
    }

    #[test]
    fn names_compare_case_insensitively() {
        let c = Category::new(CategoryId::new(1), "Ciencia Ficción", None, 0, now()).unwrap();
        assert!(c.same_name(" ciencia ficción "));
        assert!(!c.same_name("Historia"));
    }
}
