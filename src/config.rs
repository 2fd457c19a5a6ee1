use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};

/// loan product configuration
///
/// pricing and schedule constants for one microloan product. the fee rate is
/// quoted per reference term: a loan of `reference_weeks` pays
/// `principal * base_rate` in fees, longer and shorter terms scale linearly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanProductConfig {
    pub base_rate: Rate,
    pub reference_weeks: u32,
    pub period_length_days: u32,
    pub min_term_weeks: u32,
    pub max_term_weeks: u32,
    pub min_principal: Money,
    /// principal ceiling applied when the borrower profile carries no
    /// credit limit of its own
    pub default_credit_limit: Money,
}

impl LoanProductConfig {
    /// standard weekly microloan product: 2.5% per 4-week reference term,
    /// weekly installments, 1 to 12 week terms
    pub fn standard() -> Self {
        Self {
            base_rate: Rate::from_decimal(dec!(0.025)),
            reference_weeks: 4,
            period_length_days: 7,
            min_term_weeks: 1,
            max_term_weeks: 12,
            min_principal: Money::from_units(200),
            default_credit_limit: Money::from_units(2500),
        }
    }

    /// check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.reference_weeks == 0 || self.period_length_days == 0 {
            return Err(LoanError::InvalidRecord {
                message: "reference_weeks and period_length_days must be positive".to_string(),
            });
        }
        if self.min_term_weeks == 0 || self.min_term_weeks > self.max_term_weeks {
            return Err(LoanError::InvalidRecord {
                message: format!(
                    "inconsistent term bounds: {}..={}",
                    self.min_term_weeks, self.max_term_weeks
                ),
            });
        }
        if !self.min_principal.is_positive() {
            return Err(LoanError::InvalidRecord {
                message: format!("min_principal must be positive, got {}", self.min_principal),
            });
        }
        if self.default_credit_limit < self.min_principal {
            return Err(LoanError::InvalidRecord {
                message: format!(
                    "default_credit_limit {} below min_principal {}",
                    self.default_credit_limit, self.min_principal
                ),
            });
        }
        Ok(())
    }

    /// principal ceiling for a borrower, falling back to the product default
    /// when the profile carries none
    pub fn credit_limit_for(&self, profile_limit: Option<Money>) -> Money {
        profile_limit.unwrap_or(self.default_credit_limit)
    }
}

impl Default for LoanProductConfig {
    fn default() -> Self {
        Self::standard()
    }
}
