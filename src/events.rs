use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::Money;
use crate::types::{CustomerId, InstallmentId, LoanId};

/// all events that can be emitted by the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // origination events
    LoanOriginated {
        loan_id: LoanId,
        customer_id: CustomerId,
        loan_amount: Money,
        total_loan_amount: Money,
        installment_amount: Money,
        number_of_installments: u32,
        timestamp: DateTime<Utc>,
    },
    CreditReserved {
        customer_id: CustomerId,
        amount: Money,
        used_credit_limit: Money,
        credit_limit: Money,
        timestamp: DateTime<Utc>,
    },

    // payment events
    PaymentReceived {
        payment_id: Uuid,
        loan_id: LoanId,
        amount: Money,
        installments_paid: u32,
        total_paid: Money,
        unapplied: Money,
        timestamp: DateTime<Utc>,
    },
    InstallmentPaid {
        payment_id: Uuid,
        loan_id: LoanId,
        installment_id: InstallmentId,
        amount: Money,
        due_date: NaiveDate,
        payment_date: NaiveDate,
    },
    LoanSettled {
        loan_id: LoanId,
        customer_id: CustomerId,
        total_loan_amount: Money,
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
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
