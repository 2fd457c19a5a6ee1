use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{InstallmentId, LoanId, LoanStatus, UserId};

/// all events emitted while operating a loan account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    LoanRequested {
        loan_id: LoanId,
        user_id: UserId,
        principal: Money,
        fee: Money,
        term_weeks: u32,
        weekly_payment: Money,
        timestamp: DateTime<Utc>,
    },
    LoanApproved {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    LoanDisbursed {
        loan_id: LoanId,
        amount: Money,
        timestamp: DateTime<Utc>,
    },
    LoanRejected {
        loan_id: LoanId,
        timestamp: DateTime<Utc>,
    },
    LoanClosed {
        loan_id: LoanId,
        total_collected: Money,
        timestamp: DateTime<Utc>,
    },

    // schedule events
    ScheduleGenerated {
        loan_id: LoanId,
        installment_count: u32,
        anchor: DateTime<Utc>,
        first_due: Option<DateTime<Utc>>,
        total_scheduled: Money,
    },
    InstallmentPaid {
        loan_id: LoanId,
        installment_id: InstallmentId,
        sequence: u32,
        amount: Money,
        paid_at: DateTime<Utc>,
    },
    InstallmentOverdue {
        loan_id: LoanId,
        installment_id: InstallmentId,
        due_date: DateTime<Utc>,
        timestamp: DateTime<Utc>,
    },

    // status change events
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        timestamp: DateTime<Utc>,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
