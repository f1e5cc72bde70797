pub mod allocation;
pub mod amortization;

pub use allocation::{Allocation, PaymentAllocator};
pub use amortization::{add_months, first_of_next_month, AmortizationSchedule, ScheduledInstallment};
