use chrono::NaiveDate;

use crate::domain::{
    entities::{Book, InventoryRecord},
    error::DomainError,
};

/// Date formats accepted for dates typed by people (import files, CLI).
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%d-%m-%Y"];

/// Centralized domain validation.
///
/// Entity invariants live on the entities; this is the single entry point
/// services use, plus the value coercions shared by the importers and the
/// command line.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_book(book: &Book) -> Result<(), DomainError> {
        book.validate()
    }

    pub fn validate_inventory(record: &InventoryRecord) -> Result<(), DomainError> {
        record.validate()
    }

    pub fn validate_date_range(
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> Result<(), DomainError> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(DomainError::InvalidDateRange {
                    from: from.to_string(),
                    to: to.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Whole page count; blank means zero.
    pub fn parse_pages(raw: &str) -> Result<i32, DomainError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse::<i32>().map_err(|_| DomainError::InvalidValue {
            field: "pages",
            value: raw.to_string(),
            expected: "a whole number".into(),
        })
    }

    /// Decimal price accepting `,` as the decimal separator; blank means zero.
    pub fn parse_price(raw: &str) -> Result<f64, DomainError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(0.0);
        }
        raw.replace(',', ".")
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| DomainError::InvalidValue {
                field: "price",
                value: raw.to_string(),
                expected: "a decimal number".into(),
            })
    }

    /// Parse a date with one specific format.
    pub fn parse_date(raw: &str, format: &str) -> Result<NaiveDate, DomainError> {
        NaiveDate::parse_from_str(raw.trim(), format).map_err(|_| DomainError::InvalidValue {
            field: "date",
            value: raw.trim().to_string(),
            expected: format!("format {}", format),
        })
    }

    /// Parse a date trying every accepted format in order.
    pub fn parse_any_date(raw: &str) -> Result<NaiveDate, DomainError> {
        DATE_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(raw.trim(), format).ok())
            .ok_or_else(|| DomainError::InvalidValue {
                field: "date",
                value: raw.trim().to_string(),
                expected: "YYYY-MM-DD".into(),
            })
    }

    pub fn is_supported_date_format(format: &str) -> bool {
        DATE_FORMATS.contains(&format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_accepts_comma_decimal() {
        assert_eq!(DomainValidator::parse_price("12,50").unwrap(), 12.5);
        assert_eq!(DomainValidator::parse_price(" 3.2 ").unwrap(), 3.2);
        assert_eq!(DomainValidator::parse_price("").unwrap(), 0.0);
        assert!(DomainValidator::parse_price("cheap").is_err());
    }

    #[test]
    fn pages_must_be_integer() {
        assert_eq!(DomainValidator::parse_pages("320").unwrap(), 320);
        assert_eq!(DomainValidator::parse_pages("").unwrap(), 0);
        assert!(DomainValidator::parse_pages("12.5").is_err());
        assert!(DomainValidator::parse_pages("many").is_err());
    }

    #[test]
    fn dates_follow_selected_format() {
        let d = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(DomainValidator::parse_date("05/03/2024", "%d/%m/%Y").unwrap(), d);
        assert_eq!(DomainValidator::parse_date("03/05/2024", "%m/%d/%Y").unwrap(), d);
        assert_eq!(DomainValidator::parse_date("05-03-2024", "%d-%m-%Y").unwrap(), d);
        assert!(DomainValidator::parse_date("2024-03-05", "%d/%m/%Y").is_err());
        assert_eq!(DomainValidator::parse_any_date("2024-03-05").unwrap(), d);
    }

    #[test]
    fn reversed_range_rejected() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 1);
        let b = NaiveDate::from_ymd_opt(2024, 2, 1);
        assert!(DomainValidator::validate_date_range(a, b).is_ok());
        assert!(DomainValidator::validate_date_range(b, a).is_err());
        assert!(DomainValidator::validate_date_range(None, a).is_ok());
    }
}
