use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};

/// unique identifier for a customer
pub type CustomerId = u64;

/// unique identifier for a loan
pub type LoanId = u64;

/// unique identifier for an installment
pub type InstallmentId = u64;

/// customer holding a revolving credit allowance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub surname: String,
    pub credit_limit: Money,
    pub used_credit_limit: Money,
}

impl Customer {
    /// credit still free for new loans
    pub fn available_credit(&self) -> Money {
        self.credit_limit - self.used_credit_limit
    }
}

/// installment loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loan {
    pub id: LoanId,
    pub customer_id: CustomerId,
    pub loan_amount: Money,
    /// principal grown by the interest rate, fixed at creation
    pub total_loan_amount: Money,
    pub interest_rate: Rate,
    pub number_of_installments: u32,
    pub create_date: DateTime<Utc>,
    pub is_paid: bool,
}

/// loan before the store assigns it an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLoan {
    pub customer_id: CustomerId,
    pub loan_amount: Money,
    pub total_loan_amount: Money,
    pub interest_rate: Rate,
    pub number_of_installments: u32,
    pub create_date: DateTime<Utc>,
}

impl NewLoan {
    pub fn with_id(self, id: LoanId) -> Loan {
        Loan {
            id,
            customer_id: self.customer_id,
            loan_amount: self.loan_amount,
            total_loan_amount: self.total_loan_amount,
            interest_rate: self.interest_rate,
            number_of_installments: self.number_of_installments,
            create_date: self.create_date,
            is_paid: false,
        }
    }
}

/// single scheduled installment of a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanInstallment {
    pub id: InstallmentId,
    pub loan_id: LoanId,
    pub amount: Money,
    /// carried for reporting, never adjusted by allocation
    pub paid_amount: Money,
    pub due_date: NaiveDate,
    pub is_paid: bool,
    pub payment_date: Option<NaiveDate>,
}

impl LoanInstallment {
    /// mark paid on the given date
    pub fn mark_paid(&mut self, on: NaiveDate) {
        self.is_paid = true;
        self.payment_date = Some(on);
    }
}

/// installment before the store assigns it an id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInstallment {
    pub amount: Money,
    pub due_date: NaiveDate,
}

impl NewInstallment {
    pub fn with_id(self, id: InstallmentId, loan_id: LoanId) -> LoanInstallment {
        LoanInstallment {
            id,
            loan_id,
            amount: self.amount,
            paid_amount: Money::ZERO,
            due_date: self.due_date,
            is_paid: false,
            payment_date: None,
        }
    }
}

/// loan origination request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequest {
    pub customer_id: CustomerId,
    pub loan_amount: Money,
    pub interest_rate: Rate,
    pub number_of_installments: u32,
}

/// payment request against a loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub loan_id: LoanId,
    pub payment_amount: Money,
}

/// outcome of a payment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResult {
    pub installments_paid: u32,
    pub total_paid: Money,
    pub loan_fully_paid: bool,
}
