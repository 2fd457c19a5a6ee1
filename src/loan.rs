use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::pricing::PricingQuote;
use crate::types::{LoanId, LoanStatus, UserId};

/// loan entity
///
/// pricing fields are copied from the quote at request time and never change
/// afterwards; only `status` (and its change timestamp) mutates, and only
/// along the forward edges of [`LoanStatus::can_transition_to`]. loans are
/// never deleted, they end in a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    pub user_id: UserId,
    pub principal: Money,
    pub fee: Money,
    pub term_weeks: u32,
    pub weekly_payment: Money,
    pub status: LoanStatus,
    pub created_at: DateTime<Utc>,
    pub last_status_change: DateTime<Utc>,
}

impl Loan {
    /// create a requested loan from a validated quote
    pub fn request(user_id: UserId, quote: PricingQuote, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            principal: quote.principal,
            fee: quote.fee,
            term_weeks: quote.term_weeks,
            weekly_payment: quote.weekly_payment,
            status: LoanStatus::Requested,
            created_at: now,
            last_status_change: now,
        }
    }

    /// total the borrower repays over the term
    pub fn total_repayable(&self) -> Money {
        self.principal + self.fee
    }

    /// check whether a repayment schedule may exist for this loan
    pub fn is_active(&self) -> bool {
        self.status.is_active()
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// move to `next`, rejecting anything but a forward edge
    pub fn transition_to(&mut self, next: LoanStatus, now: DateTime<Utc>) -> Result<()> {
        if !self.status.can_transition_to(next) {
            return Err(LoanError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        self.last_status_change = now;
        Ok(())
    }

    pub fn approve(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition_to(LoanStatus::Approved, now)
    }

    pub fn disburse(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition_to(LoanStatus::Disbursed, now)
    }

    pub fn reject(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition_to(LoanStatus::Rejected, now)
    }

    pub fn close(&mut self, now: DateTime<Utc>) -> Result<()> {
        self.transition_to(LoanStatus::Closed, now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LoanProductConfig;
    use crate::pricing::PricingEngine;
    use chrono::TimeZone;

    fn requested_loan() -> Loan {
        let engine = PricingEngine::new(LoanProductConfig::standard());
        let quote = engine.quote(Money::from_units(1000), 4).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Loan::request(Uuid::new_v4(), quote, now)
    }

    #[test]
    fn test_request_copies_quote_fields() {
        let loan = requested_loan();
        assert_eq!(loan.status, LoanStatus::Requested);
        assert_eq!(loan.principal, Money::from_units(1000));
        assert_eq!(loan.fee, Money::from_units(25));
        assert_eq!(loan.term_weeks, 4);
        assert_eq!(loan.weekly_payment, Money::from_units(257));
        assert_eq!(loan.total_repayable(), Money::from_units(1025));
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut loan = requested_loan();
        let now = loan.created_at;

        loan.approve(now).unwrap();
        assert_eq!(loan.status, LoanStatus::Approved);
        assert!(loan.is_active());

        loan.disburse(now).unwrap();
        assert_eq!(loan.status, LoanStatus::Disbursed);

        loan.close(now).unwrap();
        assert_eq!(loan.status, LoanStatus::Closed);
        assert!(loan.is_terminal());
    }

    #[test]
    fn test_direct_disbursement_from_requested() {
        let mut loan = requested_loan();
        loan.disburse(loan.created_at).unwrap();
        assert_eq!(loan.status, LoanStatus::Disbursed);
    }

    #[test]
    fn test_rejected_is_terminal() {
        let mut loan = requested_loan();
        let now = loan.created_at;
        loan.reject(now).unwrap();

        let err = loan.approve(now).unwrap_err();
        assert!(matches!(err, LoanError::InvalidTransition { .. }));
        assert_eq!(loan.status, LoanStatus::Rejected);
    }

    #[test]
    fn test_no_backward_transitions() {
        let mut loan = requested_loan();
        let now = loan.created_at;
        loan.disburse(now).unwrap();

        assert!(loan.approve(now).is_err());
        assert!(loan.reject(now).is_err());
        assert!(loan.transition_to(LoanStatus::Requested, now).is_err());
    }

    #[test]
    fn test_status_change_updates_timestamp() {
        let mut loan = requested_loan();
        let later = loan.created_at + chrono::Duration::hours(2);
        loan.approve(later).unwrap();
        assert_eq!(loan.last_status_change, later);
        assert_eq!(loan.created_at + chrono::Duration::hours(2), later);
    }
}
