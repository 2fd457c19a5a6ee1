use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::LoanProductConfig;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};

/// priced loan offer derived from `(principal, term)`
///
/// not stored independently; the fields are copied onto the loan record at
/// request time and are immutable from then on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingQuote {
    pub principal: Money,
    pub term_weeks: u32,
    pub fee: Money,
    pub weekly_payment: Money,
}

impl PricingQuote {
    /// total the borrower repays over the term
    pub fn total_repayable(&self) -> Money {
        self.principal + self.fee
    }

    /// amount collected if every installment is paid at the scheduled
    /// weekly payment; exceeds `total_repayable` by at most `term - 1`
    /// units of rounding
    pub fn total_collected(&self) -> Money {
        self.weekly_payment * self.term_weeks
    }
}

/// pricing engine
///
/// pure and deterministic: the same `(principal, term)` always produces the
/// same quote, and quoting has no side effects.
pub struct PricingEngine {
    config: LoanProductConfig,
}

impl PricingEngine {
    pub fn new(config: LoanProductConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoanProductConfig {
        &self.config
    }

    /// price a loan of `principal` over `term_weeks`
    ///
    /// fee = round(principal * base_rate * term / reference_term), rounded
    /// half-away-from-zero to whole units. weekly payment is the ceiling of
    /// (principal + fee) / term, so the sum of payments never under-covers
    /// the repayable total.
    pub fn quote(&self, principal: Money, term_weeks: u32) -> Result<PricingQuote> {
        if !principal.is_positive() {
            return Err(LoanError::InvalidPrincipal { amount: principal });
        }
        if term_weeks < self.config.min_term_weeks || term_weeks > self.config.max_term_weeks {
            return Err(LoanError::InvalidTerm {
                weeks: term_weeks,
                min: self.config.min_term_weeks,
                max: self.config.max_term_weeks,
            });
        }

        let fee_exact = principal.as_decimal()
            * self.config.base_rate.as_decimal()
            * Decimal::from(term_weeks)
            / Decimal::from(self.config.reference_weeks);
        let fee = Money::from_decimal_rounded(fee_exact);
        let weekly_payment = (principal + fee).ceil_div(term_weeks);

        Ok(PricingQuote {
            principal,
            term_weeks,
            fee,
            weekly_payment,
        })
    }

    /// price a loan for a specific borrower, enforcing the product floor and
    /// the borrower's credit limit (profile limit, or the product default
    /// when the profile carries none)
    pub fn quote_within_limit(
        &self,
        principal: Money,
        term_weeks: u32,
        profile_limit: Option<Money>,
    ) -> Result<PricingQuote> {
        if principal < self.config.min_principal {
            return Err(LoanError::InvalidPrincipal { amount: principal });
        }
        let limit = self.config.credit_limit_for(profile_limit);
        if principal > limit {
            return Err(LoanError::PrincipalOverLimit {
                limit,
                requested: principal,
            });
        }
        self.quote(principal, term_weeks)
    }
}
