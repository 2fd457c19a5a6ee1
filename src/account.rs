use hourglass_rs::SafeTimeProvider;

use crate::config::LoanProductConfig;
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::events::{Event, EventStore};
use crate::loan::Loan;
use crate::pricing::PricingEngine;
use crate::schedule::RepaymentSchedule;
use crate::types::{InstallmentId, LoanId, LoanStatus, RepaymentProgress, UserId};

/// core loan account struct
///
/// wires quote -> request -> activation -> schedule -> repayment -> closure,
/// collecting events along the way. persistence stays with the external
/// collaborator; this struct only owns the in-memory state.
#[derive(Debug)]
pub struct LoanAccount {
    pub id: LoanId,
    pub config: LoanProductConfig,
    pub loan: Loan,
    pub schedule: Option<RepaymentSchedule>,
    pub events: EventStore,
}

impl LoanAccount {
    /// price and create a requested loan for a borrower
    pub fn request(
        config: LoanProductConfig,
        user_id: UserId,
        principal: Money,
        term_weeks: u32,
        profile_limit: Option<Money>,
        time_provider: &SafeTimeProvider,
    ) -> Result<Self> {
        config.validate()?;

        let engine = PricingEngine::new(config.clone());
        let quote = engine.quote_within_limit(principal, term_weeks, profile_limit)?;

        let now = time_provider.now();
        let loan = Loan::request(user_id, quote, now);

        let mut events = EventStore::new();
        events.emit(Event::LoanRequested {
            loan_id: loan.id,
            user_id,
            principal: quote.principal,
            fee: quote.fee,
            term_weeks: quote.term_weeks,
            weekly_payment: quote.weekly_payment,
            timestamp: now,
        });

        Ok(Self {
            id: loan.id,
            config,
            loan,
            schedule: None,
            events,
        })
    }

    /// rebuild an account from previously persisted state
    pub fn from_parts(
        config: LoanProductConfig,
        loan: Loan,
        schedule: Option<RepaymentSchedule>,
    ) -> Result<Self> {
        if let Some(s) = &schedule {
            s.verify_complete(&loan)?;
        }
        Ok(Self {
            id: loan.id,
            config,
            loan,
            schedule,
            events: EventStore::new(),
        })
    }

    /// approve the loan; entering the active set materializes the schedule
    pub fn approve(&mut self, time_provider: &SafeTimeProvider) -> Result<()> {
        let now = time_provider.now();
        self.set_status(LoanStatus::Approved, now)?;
        self.events.emit(Event::LoanApproved {
            loan_id: self.id,
            timestamp: now,
        });
        self.generate_schedule(time_provider)?;
        Ok(())
    }

    /// disburse funds to the borrower
    ///
    /// legal both from `Approved` and straight from `Requested`; either way
    /// the schedule exists exactly once afterwards.
    pub fn disburse(&mut self, time_provider: &SafeTimeProvider) -> Result<()> {
        let now = time_provider.now();
        self.set_status(LoanStatus::Disbursed, now)?;
        self.events.emit(Event::LoanDisbursed {
            loan_id: self.id,
            amount: self.loan.principal,
            timestamp: now,
        });
        self.generate_schedule(time_provider)?;
        Ok(())
    }

    /// decline the request, terminal
    pub fn reject(&mut self, time_provider: &SafeTimeProvider) -> Result<()> {
        let now = time_provider.now();
        self.set_status(LoanStatus::Rejected, now)?;
        self.events.emit(Event::LoanRejected {
            loan_id: self.id,
            timestamp: now,
        });
        Ok(())
    }

    /// materialize the installment batch, exactly once per loan
    ///
    /// idempotent: a complete existing schedule is returned unchanged, never
    /// regenerated; a partial one is a conflict. callers MUST still treat
    /// generation as requiring mutual exclusion per loan when persisting
    /// (unique constraint on the loan reference), since two racing callers
    /// could both observe an empty store.
    pub fn generate_schedule(
        &mut self,
        time_provider: &SafeTimeProvider,
    ) -> Result<&RepaymentSchedule> {
        if self.schedule.is_none() {
            let schedule = RepaymentSchedule::generate(&self.loan, &self.config, time_provider)?;
            self.events.emit(Event::ScheduleGenerated {
                loan_id: self.id,
                installment_count: schedule.installments.len() as u32,
                anchor: schedule.anchor,
                first_due: schedule.installments.first().map(|i| i.due_date),
                total_scheduled: schedule.total_scheduled(),
            });
            self.schedule = Some(schedule);
        }

        let schedule = self.schedule.as_ref().ok_or(LoanError::ScheduleConflict {
            loan_id: self.id,
            expected: self.loan.term_weeks,
            found: 0,
        })?;
        schedule.verify_complete(&self.loan)?;
        Ok(schedule)
    }

    /// apply a repayment event from the collaborator to one installment,
    /// closing the loan once the last installment is paid
    pub fn record_repayment(
        &mut self,
        installment_id: InstallmentId,
        time_provider: &SafeTimeProvider,
    ) -> Result<()> {
        if !self.loan.is_active() {
            return Err(LoanError::LoanNotActive {
                status: self.loan.status,
            });
        }
        let schedule = self
            .schedule
            .as_mut()
            .ok_or(LoanError::ScheduleConflict {
                loan_id: self.loan.id,
                expected: self.loan.term_weeks,
                found: 0,
            })?;

        let now = time_provider.now();
        let paid = schedule.record_payment(installment_id, now)?;
        self.events.emit(Event::InstallmentPaid {
            loan_id: self.loan.id,
            installment_id,
            sequence: paid.sequence,
            amount: paid.amount,
            paid_at: now,
        });

        if schedule.is_fully_repaid() {
            let total_collected = schedule.total_scheduled();
            self.set_status(LoanStatus::Closed, now)?;
            self.events.emit(Event::LoanClosed {
                loan_id: self.id,
                total_collected,
                timestamp: now,
            });
        }

        Ok(())
    }

    /// run the overdue sweep and emit one event per newly flagged installment
    pub fn mark_overdue(&mut self, time_provider: &SafeTimeProvider) -> Result<Vec<InstallmentId>> {
        let schedule = match self.schedule.as_mut() {
            Some(s) => s,
            None => return Ok(Vec::new()),
        };

        let now = time_provider.now();
        let flagged = schedule.mark_overdue(time_provider);
        for installment in schedule
            .installments
            .iter()
            .filter(|i| flagged.contains(&i.id))
        {
            self.events.emit(Event::InstallmentOverdue {
                loan_id: self.id,
                installment_id: installment.id,
                due_date: installment.due_date,
                timestamp: now,
            });
        }
        Ok(flagged)
    }

    pub fn is_fully_repaid(&self) -> bool {
        self.schedule
            .as_ref()
            .map(|s| s.is_fully_repaid())
            .unwrap_or(false)
    }

    pub fn progress(&self) -> Option<RepaymentProgress> {
        self.schedule.as_ref().map(|s| s.progress())
    }

    /// get events
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    fn set_status(
        &mut self,
        next: LoanStatus,
        now: chrono::DateTime<chrono::Utc>,
    ) -> Result<()> {
        let old_status = self.loan.status;
        self.loan.transition_to(next, now)?;
        self.events.emit(Event::StatusChanged {
            loan_id: self.id,
            old_status,
            new_status: next,
            timestamp: now,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use uuid::Uuid;

    fn provider() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        ))
    }

    fn requested_account(time: &SafeTimeProvider) -> LoanAccount {
        LoanAccount::request(
            LoanProductConfig::standard(),
            Uuid::new_v4(),
            Money::from_units(1000),
            4,
            None,
            time,
        )
        .unwrap()
    }

    #[test]
    fn test_request_emits_pricing_fields() {
        let time = provider();
        let mut account = requested_account(&time);

        let events = account.take_events();
        assert!(matches!(
            events[0],
            Event::LoanRequested {
                principal,
                fee,
                weekly_payment,
                term_weeks: 4,
                ..
            } if principal == Money::from_units(1000)
                && fee == Money::from_units(25)
                && weekly_payment == Money::from_units(257)
        ));
        assert_eq!(account.loan.status, LoanStatus::Requested);
        assert!(account.schedule.is_none());
    }

    #[test]
    fn test_disburse_generates_schedule_once() {
        let time = provider();
        let mut account = requested_account(&time);
        account.disburse(&time).unwrap();

        let schedule = account.schedule.as_ref().unwrap();
        assert_eq!(schedule.installments.len(), 4);
        assert_eq!(schedule.anchor, time.now());

        // double invocation returns the same sequence, no duplicate batch
        let before = schedule.clone();
        account.generate_schedule(&time).unwrap();
        assert_eq!(*account.schedule.as_ref().unwrap(), before);
    }

    #[test]
    fn test_approve_then_disburse_keeps_original_schedule() {
        let time = provider();
        let mut account = requested_account(&time);
        account.approve(&time).unwrap();
        let original = account.schedule.clone().unwrap();

        account.disburse(&time).unwrap();
        assert_eq!(account.schedule.unwrap(), original);
    }

    #[test]
    fn test_rejected_loan_never_gets_a_schedule() {
        let time = provider();
        let mut account = requested_account(&time);
        account.reject(&time).unwrap();

        assert!(account.schedule.is_none());
        assert!(matches!(
            account.disburse(&time),
            Err(LoanError::InvalidTransition { .. })
        ));
        assert!(matches!(
            account.generate_schedule(&time),
            Err(LoanError::LoanNotActive { .. })
        ));
    }

    #[test]
    fn test_full_repayment_closes_the_loan() {
        let time = provider();
        let mut account = requested_account(&time);
        account.disburse(&time).unwrap();
        account.take_events();

        let ids: Vec<_> = account
            .schedule
            .as_ref()
            .unwrap()
            .installments
            .iter()
            .map(|i| i.id)
            .collect();
        for id in &ids {
            account.record_repayment(*id, &time).unwrap();
        }

        assert!(account.is_fully_repaid());
        assert_eq!(account.loan.status, LoanStatus::Closed);

        let events = account.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, Event::LoanClosed { total_collected, .. }
                if *total_collected == Money::from_units(257 * 4))));

        // closed loans accept no further repayment events
        assert!(matches!(
            account.record_repayment(ids[0], &time),
            Err(LoanError::LoanNotActive { .. })
        ));
    }

    #[test]
    fn test_repayment_before_activation_is_rejected() {
        let time = provider();
        let mut account = requested_account(&time);
        assert!(matches!(
            account.record_repayment(Uuid::new_v4(), &time),
            Err(LoanError::LoanNotActive { .. })
        ));
    }

    #[test]
    fn test_overdue_sweep_emits_events() {
        let time = provider();
        let mut account = requested_account(&time);
        account.disburse(&time).unwrap();
        account.take_events();

        let later = SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(9),
        ));
        let flagged = account.mark_overdue(&later).unwrap();
        assert_eq!(flagged.len(), 1);

        let events = account.take_events();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::InstallmentOverdue { .. }));
    }

    #[test]
    fn test_from_parts_rejects_partial_schedule() {
        let time = provider();
        let mut account = requested_account(&time);
        account.disburse(&time).unwrap();

        let loan = account.loan.clone();
        let mut schedule = account.schedule.clone().unwrap();
        schedule.installments.truncate(2);

        let err = LoanAccount::from_parts(LoanProductConfig::standard(), loan, Some(schedule))
            .unwrap_err();
        assert!(matches!(err, LoanError::ScheduleConflict { .. }));
    }

    #[test]
    fn test_limit_violation_surfaces_from_request() {
        let time = provider();
        let err = LoanAccount::request(
            LoanProductConfig::standard(),
            Uuid::new_v4(),
            Money::from_units(3000),
            4,
            None,
            &time,
        )
        .unwrap_err();
        assert!(matches!(err, LoanError::PrincipalOverLimit { .. }));
    }
}
