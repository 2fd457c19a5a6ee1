pub mod account;
pub mod collaborator;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod pricing;
pub mod schedule;
pub mod types;

// re-export key types
pub use account::LoanAccount;
pub use collaborator::{
    collaborator_error, document_storage_key, installments_from_records, DocumentKind, LoanRecord,
    PaymentRecord, ProfileRecord,
};
pub use config::LoanProductConfig;
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use events::{Event, EventStore};
pub use loan::Loan;
pub use pricing::{PricingEngine, PricingQuote};
pub use schedule::{is_fully_repaid, Installment, RepaymentSchedule};
pub use types::{
    InstallmentId, InstallmentStatus, LoanId, LoanStatus, RepaymentProgress, UserId,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
