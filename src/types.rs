use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;

/// unique identifier for a loan
pub type LoanId = Uuid;

/// unique identifier for an installment
pub type InstallmentId = Uuid;

/// opaque borrower identity supplied by the external auth collaborator
pub type UserId = Uuid;

/// loan lifecycle status
///
/// transitions are one-directional; no state is re-enterable. serialized in
/// the wire casing the backing store uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LoanStatus {
    /// created by borrower submission, awaiting underwriting
    Requested,
    /// underwriting passed, funds not yet delivered
    Approved,
    /// funds delivered, repayment cycle running
    Disbursed,
    /// underwriting declined, terminal
    Rejected,
    /// every installment paid, terminal
    Closed,
}

impl LoanStatus {
    /// states in which a repayment schedule may exist
    pub fn is_active(&self) -> bool {
        matches!(self, LoanStatus::Approved | LoanStatus::Disbursed)
    }

    /// states with no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Rejected | LoanStatus::Closed)
    }

    /// check whether a forward edge exists to `next`
    ///
    /// the observed disbursement flow moves a requested loan straight to
    /// disbursed, so `Requested -> Disbursed` is a legal edge alongside the
    /// explicit approval step.
    pub fn can_transition_to(&self, next: LoanStatus) -> bool {
        matches!(
            (self, next),
            (LoanStatus::Requested, LoanStatus::Approved)
                | (LoanStatus::Requested, LoanStatus::Disbursed)
                | (LoanStatus::Requested, LoanStatus::Rejected)
                | (LoanStatus::Approved, LoanStatus::Disbursed)
                | (LoanStatus::Approved, LoanStatus::Closed)
                | (LoanStatus::Disbursed, LoanStatus::Closed)
        )
    }
}

/// installment status
///
/// `Pending -> Paid` is final; `Pending -> Overdue` is observable but not
/// final, a late payment still moves an overdue installment to paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstallmentStatus {
    Pending,
    Paid,
    Overdue,
}

impl InstallmentStatus {
    pub fn is_paid(&self) -> bool {
        matches!(self, InstallmentStatus::Paid)
    }

    /// pending and overdue installments are both still collectible
    pub fn is_outstanding(&self) -> bool {
        !self.is_paid()
    }
}

/// repayment progress summary for a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentProgress {
    pub total_installments: u32,
    pub paid_installments: u32,
    pub outstanding_balance: Money,
    pub next_due_date: Option<DateTime<Utc>>,
    pub next_due_amount: Option<Money>,
}

impl RepaymentProgress {
    pub fn is_complete(&self) -> bool {
        self.total_installments == self.paid_installments
    }
}
