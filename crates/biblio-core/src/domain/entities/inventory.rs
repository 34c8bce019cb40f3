//! Per-book stock counters and the figures derived from them.
//!
//! Only the three counters are stored. Everything else is recomputed by
//! [`InventoryRecord::snapshot`] from the counters, the number of open loans
//! and the book price.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{error::DomainError, value_objects::StockTier};

use super::common::{BookId, InventoryId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub id: InventoryId,
    pub book_id: BookId,
    pub initial_stock: i64,
    pub inflows: i64,
    pub outflows: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Derived stock figures at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InventorySnapshot {
    pub total: i64,
    pub loaned: i64,
    pub available: i64,
    pub value: f64,
    pub loaned_percentage: f64,
    pub tier: StockTier,
}

impl InventoryRecord {
    pub fn new(
        id: InventoryId,
        book_id: BookId,
        initial_stock: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let record = Self {
            id,
            book_id,
            initial_stock,
            inflows: 0,
            outflows: 0,
            created_at: now,
            updated_at: now,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        for (field, value) in [
            ("initial stock", self.initial_stock),
            ("inflows", self.inflows),
            ("outflows", self.outflows),
        ] {
            if value < 0 {
                return Err(DomainError::NegativeValue {
                    field,
                    value: value.to_string(),
                });
            }
        }
        let received = self
            .initial_stock
            .checked_add(self.inflows)
            .ok_or(DomainError::StockOverflow { field: "inflows" })?;
        if self.outflows > received {
            return Err(DomainError::StockInconsistent {
                outflows: self.outflows,
                received,
            });
        }
        Ok(())
    }

    pub const fn total(&self) -> i64 {
        self.initial_stock
            .saturating_add(self.inflows)
            .saturating_sub(self.outflows)
    }

    pub fn snapshot(&self, open_loans: usize, unit_price: f64) -> InventorySnapshot {
        let total = self.total();
        let loaned = i64::try_from(open_loans).unwrap_or(i64::MAX);
        let available = total.saturating_sub(loaned);
        let loaned_percentage = if total > 0 {
            loaned as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        InventorySnapshot {
            total,
            loaned,
            available,
            value: available as f64 * unit_price,
            loaned_percentage,
            tier: StockTier::from_available(available),
        }
    }

    pub fn add_stock(&mut self, quantity: i64, now: DateTime<Utc>) -> Result<(), DomainError> {
        if quantity < 0 {
            return Err(DomainError::NegativeValue {
                field: "quantity",
                value: quantity.to_string(),
            });
        }
        let inflows = self
            .inflows
            .checked_add(quantity)
            .ok_or(DomainError::StockOverflow { field: "inflows" })?;
        let next = Self {
            inflows,
            updated_at: now,
            ..self.clone()
        };
        next.validate()?;
        *self = next;
        Ok(())
    }

    /// Remove one copy from stock. Needs at least one copy not on loan.
    pub fn write_off(
        &mut self,
        open_loans: usize,
        book_title: &str,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        if self.snapshot(open_loans, 0.0).available <= 0 {
            return Err(DomainError::NoStockAvailable {
                book: book_title.to_string(),
            });
        }
        self.outflows += 1;
        self.updated_at = now;
        Ok(())
    }

    /// Replace all counters at once, validating the result.
    pub fn adjust(
        &mut self,
        initial_stock: i64,
        inflows: i64,
        outflows: i64,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        let next = Self {
            initial_stock,
            inflows,
            outflows,
            updated_at: now,
            ..self.clone()
        };
        next.validate()?;
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn record(initial: i64) -> InventoryRecord {
        InventoryRecord::new(InventoryId::new(1), BookId::new(1), initial, now()).unwrap()
    }

    #[test]
    fn snapshot_derives_all_figures() {
        let mut r = record(10);
        r.add_stock(3, now()).unwrap();
        r.outflows = 1;
        let s = r.snapshot(2, 15.0);
        assert_eq!(s.total, 12);
        assert_eq!(s.loaned, 2);
        assert_eq!(s.available, 10);
        assert_eq!(s.value, 150.0);
        assert!((s.loaned_percentage - 16.666_666).abs() < 1e-3);
        assert_eq!(s.tier, StockTier::Normal);
    }

    #[test]
    fn percentage_is_zero_without_stock() {
        assert_eq!(record(0).snapshot(0, 9.0).loaned_percentage, 0.0);
    }

    #[test]
    fn tier_boundaries() {
        let tier = |available| StockTier::from_available(available);
        assert_eq!(tier(0), StockTier::Critical);
        assert_eq!(tier(1), StockTier::Critical);
        assert_eq!(tier(2), StockTier::Low);
        assert_eq!(tier(4), StockTier::Low);
        assert_eq!(tier(5), StockTier::Normal);
        assert_eq!(tier(10), StockTier::Normal);
        assert_eq!(tier(11), StockTier::High);
    }

    #[test]
    fn negative_counters_rejected() {
        assert!(matches!(
            InventoryRecord::new(InventoryId::new(1), BookId::new(1), -1, now()),
            Err(DomainError::NegativeValue { .. })
        ));
        assert!(record(1).add_stock(-2, now()).is_err());
    }

    #[test]
    fn outflows_cannot_exceed_received() {
        let mut r = record(2);
        assert!(matches!(
            r.adjust(2, 1, 4, now()),
            Err(DomainError::StockInconsistent { outflows: 4, received: 3 })
        ));
        assert_eq!(r.outflows, 0);
    }

    #[test]
    fn oversized_quantities_are_rejected() {
        let mut r = record(1);
        assert!(matches!(
            r.add_stock(i64::MAX, now()),
            Err(DomainError::StockOverflow { .. })
        ));
        assert_eq!(r.inflows, 0);
        assert_eq!(r.total(), 1);

        r.add_stock(i64::MAX - 1, now()).unwrap();
        assert_eq!(r.total(), i64::MAX);
        assert!(r.add_stock(1, now()).is_err());

        let mut r = record(1);
        assert!(matches!(
            r.adjust(i64::MAX, i64::MAX, 0, now()),
            Err(DomainError::StockOverflow { .. })
        ));
        assert_eq!(r.initial_stock, 1);
    }

    #[test]
    fn write_off_requires_free_copy() {
        let mut r = record(1);
        assert!(matches!(
            r.write_off(1, "Rayuela", now()),
            Err(DomainError::NoStockAvailable { .. })
        ));
        r.write_off(0, "Rayuela", now()).unwrap();
        assert_eq!(r.outflows, 1);
        assert_eq!(r.total(), 0);
    }
}
