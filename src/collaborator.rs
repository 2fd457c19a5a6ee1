//! wire shapes for the external backend boundary.
//!
//! the backing store persists loans, payments, and borrower profiles; this
//! module mirrors its row shapes exactly and validates them into the closed
//! domain enums on the way in. everything here is data only: no client, no
//! retries, no I/O. failures crossing this boundary arrive as the
//! collaborator variants of [`LoanError`].
//!
//! the store, not this crate, enforces at-most-one active loan per user; the
//! query contract callers rely on is "most recent non-terminal loan", i.e.
//! status in (APPROVED, DISBURSED) ordered by created_at descending, limit 1.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::LoanProductConfig;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::loan::Loan;
use crate::schedule::Installment;
use crate::types::{InstallmentId, InstallmentStatus, LoanId, LoanStatus, UserId};

/// permission-policy denial code the backing store returns on row-level
/// security violations
pub const PERMISSION_DENIED_CODE: &str = "42501";

/// loan row as persisted by the collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub id: LoanId,
    pub user_id: UserId,
    pub amount: Money,
    pub total_fee: Money,
    pub duration_weeks: u32,
    pub weekly_payment: Money,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Loan> for LoanRecord {
    fn from(loan: &Loan) -> Self {
        Self {
            id: loan.id,
            user_id: loan.user_id,
            amount: loan.principal,
            total_fee: loan.fee,
            duration_weeks: loan.term_weeks,
            weekly_payment: loan.weekly_payment,
            status: status_to_wire(loan.status).to_string(),
            created_at: loan.created_at,
        }
    }
}

impl TryFrom<LoanRecord> for Loan {
    type Error = LoanError;

    fn try_from(record: LoanRecord) -> Result<Self> {
        if !record.amount.is_positive() {
            return Err(LoanError::InvalidRecord {
                message: format!("loan {}: non-positive amount {}", record.id, record.amount),
            });
        }
        if record.duration_weeks == 0 {
            return Err(LoanError::InvalidRecord {
                message: format!("loan {}: zero duration", record.id),
            });
        }
        let status = parse_loan_status(&record.status).ok_or_else(|| LoanError::InvalidRecord {
            message: format!("loan {}: unknown status {:?}", record.id, record.status),
        })?;

        Ok(Loan {
            id: record.id,
            user_id: record.user_id,
            principal: record.amount,
            fee: record.total_fee,
            term_weeks: record.duration_weeks,
            weekly_payment: record.weekly_payment,
            status,
            created_at: record.created_at,
            last_status_change: record.created_at,
        })
    }
}

/// payment row as persisted by the collaborator
///
/// the store keeps no sequence column; ordering is by due date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub id: InstallmentId,
    pub loan_id: LoanId,
    pub amount: Money,
    pub due_date: DateTime<Utc>,
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
}

impl From<&Installment> for PaymentRecord {
    fn from(installment: &Installment) -> Self {
        Self {
            id: installment.id,
            loan_id: installment.loan_id,
            amount: installment.amount,
            due_date: installment.due_date,
            status: installment_status_to_wire(installment.status).to_string(),
            paid_at: installment.paid_at,
        }
    }
}

/// validate a batch of payment rows into installments, ordered by due date
/// and renumbered 1..=n
pub fn installments_from_records(
    loan_id: LoanId,
    mut records: Vec<PaymentRecord>,
) -> Result<Vec<Installment>> {
    records.sort_by_key(|r| r.due_date);
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            if record.loan_id != loan_id {
                return Err(LoanError::InvalidRecord {
                    message: format!(
                        "payment {} belongs to loan {}, expected {}",
                        record.id, record.loan_id, loan_id
                    ),
                });
            }
            let status = parse_installment_status(&record.status).ok_or_else(|| {
                LoanError::InvalidRecord {
                    message: format!(
                        "payment {}: unknown status {:?}",
                        record.id, record.status
                    ),
                }
            })?;
            if status.is_paid() && record.paid_at.is_none() {
                return Err(LoanError::InvalidRecord {
                    message: format!("payment {}: paid without paid_at", record.id),
                });
            }

            Ok(Installment {
                id: record.id,
                loan_id: record.loan_id,
                sequence: index as u32 + 1,
                amount: record.amount,
                due_date: record.due_date,
                status,
                paid_at: record.paid_at,
            })
        })
        .collect()
}

/// borrower profile row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRecord {
    pub id: UserId,
    pub full_name: String,
    pub phone: Option<String>,
    pub credit_limit: Option<Money>,
    pub current_level: u32,
    pub kyc_verified: bool,
}

impl ProfileRecord {
    /// principal ceiling for this borrower under the given product
    pub fn credit_limit_or_default(&self, config: &LoanProductConfig) -> Money {
        config.credit_limit_for(self.credit_limit)
    }
}

/// identity documents the verification flow expects, in capture order. the
/// profile's `kyc_verified` flag is only set once every kind has been
/// uploaded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    IdFront,
    Selfie,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::IdFront, DocumentKind::Selfie];

    fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::IdFront => "id_front",
            DocumentKind::Selfie => "selfie",
        }
    }
}

/// object-storage key for an identity document:
/// `{user_id}/{document_kind}_{timestamp}.{ext}` with a millisecond epoch
/// timestamp. contents are opaque to this crate.
pub fn document_storage_key(
    user_id: UserId,
    kind: DocumentKind,
    uploaded_at: DateTime<Utc>,
    extension: &str,
) -> String {
    format!(
        "{}/{}_{}.{}",
        user_id,
        kind.as_str(),
        uploaded_at.timestamp_millis(),
        extension
    )
}

/// map a collaborator failure into the error taxonomy, keeping permission
/// denials distinguishable from generic failures
pub fn collaborator_error(operation: &str, entity_id: &str, code: Option<&str>, message: &str) -> LoanError {
    match code {
        Some(PERMISSION_DENIED_CODE) => LoanError::PermissionDenied {
            operation: operation.to_string(),
            entity_id: entity_id.to_string(),
        },
        _ => LoanError::Collaborator {
            operation: operation.to_string(),
            message: message.to_string(),
        },
    }
}

fn status_to_wire(status: LoanStatus) -> &'static str {
    match status {
        LoanStatus::Requested => "REQUESTED",
        LoanStatus::Approved => "APPROVED",
        LoanStatus::Disbursed => "DISBURSED",
        LoanStatus::Rejected => "REJECTED",
        LoanStatus::Closed => "CLOSED",
    }
}

fn parse_loan_status(s: &str) -> Option<LoanStatus> {
    match s {
        "REQUESTED" => Some(LoanStatus::Requested),
        "APPROVED" => Some(LoanStatus::Approved),
        "DISBURSED" => Some(LoanStatus::Disbursed),
        "REJECTED" => Some(LoanStatus::Rejected),
        "CLOSED" => Some(LoanStatus::Closed),
        _ => None,
    }
}

fn installment_status_to_wire(status: InstallmentStatus) -> &'static str {
    match status {
        InstallmentStatus::Pending => "PENDING",
        InstallmentStatus::Paid => "PAID",
        InstallmentStatus::Overdue => "OVERDUE",
    }
}

fn parse_installment_status(s: &str) -> Option<InstallmentStatus> {
    match s {
        "PENDING" => Some(InstallmentStatus::Pending),
        "PAID" => Some(InstallmentStatus::Paid),
        "OVERDUE" => Some(InstallmentStatus::Overdue),
        _ => None,
    }
}
