use serde::{Deserialize, Serialize};

/// Tunable lending rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Loan length used when checkout does not give one.
    pub default_loan_days: i64,
    /// Concurrent open loans allowed per member.
    pub max_active_loans: usize,
    /// Membership term from the registration date.
    pub membership_months: u32,
    /// Card numbers are `{prefix}-{id:04}`.
    pub card_prefix: String,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            default_loan_days: 14,
            max_active_loans: 5,
            membership_months: 12,
            card_prefix: "MBR".into(),
        }
    }
}
