pub mod config;
pub mod credit;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod locks;
pub mod payments;
pub mod state;
pub mod store;
pub mod types;
pub mod validation;

// re-export key types
pub use config::{LedgerConfig, OriginationPolicy, RepaymentPolicy};
pub use credit::CreditLimitGuard;
pub use decimal::{Money, Rate};
pub use errors::{ErrorCategory, ErrorResponse, LedgerError, Result};
pub use events::{Event, EventStore};
pub use ledger::LoanLedger;
pub use payments::{Allocation, AmortizationSchedule, PaymentAllocator, ScheduledInstallment};
pub use state::{LoanStateManager, Origination, Settlement};
pub use store::{
    CustomerStore, InMemoryStore, InstallmentStore, LedgerStore, LoanStore, UnitOfWork,
};
pub use types::{
    Customer, CustomerId, InstallmentId, Loan, LoanId, LoanInstallment, LoanRequest, NewInstallment,
    NewLoan, PaymentRequest, PaymentResult,
};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
