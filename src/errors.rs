use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decimal::{Money, Rate};
use crate::types::{CustomerId, InstallmentId, LoanId};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("invalid argument: {message}")]
    InvalidArgument {
        message: String,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid number of installments: {count}")]
    InvalidInstallmentCount {
        count: u32,
    },

    #[error("insufficient credit limit: available {available}, requested {requested}")]
    InsufficientCredit {
        available: Money,
        requested: Money,
    },

    #[error("installment {installment_id} is not due yet (due {due_date})")]
    InstallmentNotYetPayable {
        installment_id: InstallmentId,
        due_date: NaiveDate,
    },

    #[error("not enough to pay full installment {installment_id}: required {required}, provided {provided}")]
    InsufficientPaymentForInstallment {
        installment_id: InstallmentId,
        required: Money,
        provided: Money,
    },

    #[error("customer not found: {id}")]
    CustomerNotFound {
        id: CustomerId,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("storage error: {message}")]
    Storage {
        message: String,
    },
}

/// how a caller should treat a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// malformed or out-of-policy input, fixable by the caller
    Validation,
    /// well-formed request refused by the current loan state
    PolicyConflict,
    /// referenced customer or loan does not exist
    NotFound,
    /// configuration, calendar or storage failure
    Internal,
}

impl LedgerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LedgerError::InvalidArgument { .. }
            | LedgerError::InvalidInterestRate { .. }
            | LedgerError::InvalidInstallmentCount { .. }
            | LedgerError::InsufficientCredit { .. } => ErrorCategory::Validation,
            LedgerError::InstallmentNotYetPayable { .. }
            | LedgerError::InsufficientPaymentForInstallment { .. } => ErrorCategory::PolicyConflict,
            LedgerError::CustomerNotFound { .. } | LedgerError::LoanNotFound { .. } => {
                ErrorCategory::NotFound
            }
            LedgerError::InvalidConfiguration { .. }
            | LedgerError::InvalidDate { .. }
            | LedgerError::Storage { .. } => ErrorCategory::Internal,
        }
    }

    /// transport-neutral error body
    pub fn to_response(&self) -> ErrorResponse {
        let title = match self {
            LedgerError::CustomerNotFound { .. } => "Customer not found",
            LedgerError::LoanNotFound { .. } => "Loan not found",
            LedgerError::InstallmentNotYetPayable { .. }
            | LedgerError::InsufficientPaymentForInstallment { .. } => "Payment failed",
            LedgerError::InvalidConfiguration { .. }
            | LedgerError::InvalidDate { .. }
            | LedgerError::Storage { .. } => "Internal error",
            _ => "Illegal argument",
        };

        ErrorResponse {
            title: title.to_string(),
            detail: self.to_string(),
        }
    }
}

/// error body handed to whatever transport sits in front of the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub title: String,
    pub detail: String,
}

pub type Result<T> = std::result::Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categories() {
        let credit = LedgerError::InsufficientCredit {
            available: Money::from_major(100),
            requested: Money::from_major(200),
        };
        assert_eq!(credit.category(), ErrorCategory::Validation);

        let early = LedgerError::InstallmentNotYetPayable {
            installment_id: 4,
            due_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        };
        assert_eq!(early.category(), ErrorCategory::PolicyConflict);

        assert_eq!(LedgerError::LoanNotFound { id: 3 }.category(), ErrorCategory::NotFound);
        assert_eq!(
            LedgerError::Storage { message: "disk".to_string() }.category(),
            ErrorCategory::Internal
        );
    }

    #[test]
    fn test_response_titles() {
        let response = LedgerError::InsufficientPaymentForInstallment {
            installment_id: 1,
            required: Money::from_major(1_000),
            provided: Money::from_major(500),
        }
        .to_response();
        assert_eq!(response.title, "Payment failed");
        assert_eq!(
            response.detail,
            "not enough to pay full installment 1: required 1000, provided 500"
        );

        let response = LedgerError::InvalidInstallmentCount { count: 7 }.to_response();
        assert_eq!(response.title, "Illegal argument");

        let response = LedgerError::CustomerNotFound { id: 42 }.to_response();
        assert_eq!(response.title, "Customer not found");
        assert_eq!(response.detail, "customer not found: 42");
    }
}
