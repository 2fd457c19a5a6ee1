use thiserror::Error;

use crate::decimal::Money;
use crate::types::{InstallmentId, LoanId, LoanStatus};

#[derive(Error, Debug)]
pub enum LoanError {
    // invalid input: fail fast, never retried
    #[error("invalid principal: {amount}, must be positive")]
    InvalidPrincipal { amount: Money },

    #[error("invalid term: {weeks} weeks, allowed range {min}..={max}")]
    InvalidTerm { weeks: u32, min: u32, max: u32 },

    #[error("principal over credit limit: limit {limit}, requested {requested}")]
    PrincipalOverLimit { limit: Money, requested: Money },

    // lifecycle conflicts
    #[error("loan not active: current status is {status:?}")]
    LoanNotActive { status: LoanStatus },

    #[error("invalid transition: {from:?} -> {to:?}")]
    InvalidTransition { from: LoanStatus, to: LoanStatus },

    #[error("schedule conflict for loan {loan_id}: expected {expected} installments, found {found}")]
    ScheduleConflict {
        loan_id: LoanId,
        expected: u32,
        found: u32,
    },

    #[error("installment not found: {id}")]
    InstallmentNotFound { id: InstallmentId },

    #[error("installment already paid: {id}")]
    InstallmentAlreadyPaid { id: InstallmentId },

    // collaborator boundary: propagated without retry
    #[error("permission denied by collaborator during {operation} on {entity_id}")]
    PermissionDenied { operation: String, entity_id: String },

    #[error("entity not found during {operation}: {entity_id}")]
    NotFound { operation: String, entity_id: String },

    #[error("collaborator failure during {operation}: {message}")]
    Collaborator { operation: String, message: String },

    #[error("invalid record from collaborator: {message}")]
    InvalidRecord { message: String },
}

impl LoanError {
    /// permission-denial failures get an actionable user-facing message, so
    /// callers need to tell them apart from generic collaborator failures
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, LoanError::PermissionDenied { .. })
    }
}

pub type Result<T> = std::result::Result<T, LoanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_denial_is_distinguishable() {
        let denied = LoanError::PermissionDenied {
            operation: "insert loan".to_string(),
            entity_id: "loans".to_string(),
        };
        let generic = LoanError::Collaborator {
            operation: "insert loan".to_string(),
            message: "network unreachable".to_string(),
        };
        assert!(denied.is_permission_denied());
        assert!(!generic.is_permission_denied());
    }

    #[test]
    fn test_error_messages_carry_context() {
        let err = LoanError::InvalidTerm {
            weeks: 0,
            min: 1,
            max: 12,
        };
        assert_eq!(err.to_string(), "invalid term: 0 weeks, allowed range 1..=12");
    }
}
