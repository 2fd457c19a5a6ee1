use chrono::{DateTime, Duration, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LoanProductConfig;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::loan::Loan;
use crate::types::{InstallmentId, InstallmentStatus, LoanId, RepaymentProgress};

/// one scheduled periodic payment obligation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installment {
    pub id: InstallmentId,
    pub loan_id: LoanId,
    /// 1-indexed position within the schedule
    pub sequence: u32,
    pub amount: Money,
    pub due_date: DateTime<Utc>,
    pub status: InstallmentStatus,
    pub paid_at: Option<DateTime<Utc>>,
}

impl Installment {
    /// mark paid with a payment timestamp; paying twice is an error. an
    /// overdue installment is still payable.
    pub fn mark_paid(&mut self, paid_at: DateTime<Utc>) -> Result<()> {
        if self.status.is_paid() {
            return Err(LoanError::InstallmentAlreadyPaid { id: self.id });
        }
        self.status = InstallmentStatus::Paid;
        self.paid_at = Some(paid_at);
        Ok(())
    }

    /// check whether the due date has passed without payment
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.status.is_outstanding() && self.due_date < now
    }
}

/// pure predicate: true iff every installment is paid. vacuously true for an
/// empty slice.
pub fn is_fully_repaid(installments: &[Installment]) -> bool {
    installments.iter().all(|i| i.status.is_paid())
}

/// repayment schedule for one loan
///
/// the full batch is materialized in memory in one call; callers persisting
/// it must write all rows or none, and must serialize generation per loan
/// (unique constraint on the loan reference, or an equivalent
/// compare-and-set) rather than racing read-then-write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepaymentSchedule {
    pub loan_id: LoanId,
    /// single timestamp all due dates derive from, captured once at
    /// generation time
    pub anchor: DateTime<Utc>,
    pub installments: Vec<Installment>,
}

impl RepaymentSchedule {
    /// generate the installment batch for a loan entering the active state
    ///
    /// installment `i` (1-indexed) falls due `i * period_length_days` days
    /// after the anchor. every installment carries the flat weekly payment;
    /// the ceiling rounding overage stays in the final week rather than
    /// being corrected away.
    pub fn generate(
        loan: &Loan,
        config: &LoanProductConfig,
        time_provider: &SafeTimeProvider,
    ) -> Result<Self> {
        if !loan.is_active() {
            return Err(LoanError::LoanNotActive {
                status: loan.status,
            });
        }

        let anchor = time_provider.now();
        let period = i64::from(config.period_length_days);

        let installments = (1..=loan.term_weeks)
            .map(|sequence| Installment {
                id: Uuid::new_v4(),
                loan_id: loan.id,
                sequence,
                amount: loan.weekly_payment,
                due_date: anchor + Duration::days(i64::from(sequence) * period),
                status: InstallmentStatus::Pending,
                paid_at: None,
            })
            .collect();

        Ok(Self {
            loan_id: loan.id,
            anchor,
            installments,
        })
    }

    /// verify this schedule is the complete batch for `loan`
    ///
    /// a partially generated set must never be silently topped up or
    /// regenerated; it surfaces as a conflict for the integrator to resolve.
    pub fn verify_complete(&self, loan: &Loan) -> Result<()> {
        if self.loan_id != loan.id || self.installments.len() != loan.term_weeks as usize {
            return Err(LoanError::ScheduleConflict {
                loan_id: loan.id,
                expected: loan.term_weeks,
                found: self.installments.len() as u32,
            });
        }
        Ok(())
    }

    /// earliest installment still owed
    pub fn next_outstanding(&self) -> Option<&Installment> {
        self.installments
            .iter()
            .filter(|i| i.status.is_outstanding())
            .min_by_key(|i| i.due_date)
    }

    /// mark one installment paid in response to a repayment event
    pub fn record_payment(
        &mut self,
        installment_id: InstallmentId,
        paid_at: DateTime<Utc>,
    ) -> Result<&Installment> {
        let installment = self
            .installments
            .iter_mut()
            .find(|i| i.id == installment_id)
            .ok_or(LoanError::InstallmentNotFound { id: installment_id })?;
        installment.mark_paid(paid_at)?;
        Ok(installment)
    }

    /// time-based sweep: flag pending installments whose due date has
    /// passed. invoked explicitly by the integrator, never automatically.
    /// returns the installments flagged by this sweep.
    pub fn mark_overdue(&mut self, time_provider: &SafeTimeProvider) -> Vec<InstallmentId> {
        let now = time_provider.now();
        self.installments
            .iter_mut()
            .filter(|i| i.status == InstallmentStatus::Pending && i.due_date < now)
            .map(|i| {
                i.status = InstallmentStatus::Overdue;
                i.id
            })
            .collect()
    }

    /// true iff every installment is paid
    pub fn is_fully_repaid(&self) -> bool {
        is_fully_repaid(&self.installments)
    }

    /// outstanding balance and next due summary
    pub fn progress(&self) -> RepaymentProgress {
        let paid = self
            .installments
            .iter()
            .filter(|i| i.status.is_paid())
            .count() as u32;
        let outstanding_balance = self
            .installments
            .iter()
            .filter(|i| i.status.is_outstanding())
            .map(|i| i.amount)
            .sum();
        let next = self.next_outstanding();

        RepaymentProgress {
            total_installments: self.installments.len() as u32,
            paid_installments: paid,
            outstanding_balance,
            next_due_date: next.map(|i| i.due_date),
            next_due_amount: next.map(|i| i.amount),
        }
    }

    /// sum of all scheduled amounts
    pub fn total_scheduled(&self) -> Money {
        self.installments.iter().map(|i| i.amount).sum()
    }
}
