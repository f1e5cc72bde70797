//! Pre-mutation checks. Each check fails fast; the first failing rule wins.

use crate::config::OriginationPolicy;
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};

/// identifiers are positive integers
pub fn validate_id(kind: &str, id: u64) -> Result<()> {
    if id < 1 {
        return Err(LedgerError::InvalidArgument {
            message: format!("{} id must be a positive number", kind),
        });
    }
    Ok(())
}

pub fn validate_loan_amount(amount: Money) -> Result<()> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidArgument {
            message: format!("loan amount must be a positive number, got {}", amount),
        });
    }
    Ok(())
}

pub fn validate_payment_amount(amount: Money) -> Result<()> {
    if !amount.is_positive() {
        return Err(LedgerError::InvalidArgument {
            message: format!("payment amount must be a positive number, got {}", amount),
        });
    }
    Ok(())
}

pub fn validate_installment_count(count: u32, policy: &OriginationPolicy) -> Result<()> {
    if !policy.allowed_installment_counts.contains(&count) {
        return Err(LedgerError::InvalidInstallmentCount { count });
    }
    Ok(())
}

/// bounds are inclusive on both ends
pub fn validate_interest_rate(rate: Rate, policy: &OriginationPolicy) -> Result<()> {
    if rate < policy.min_interest_rate || rate > policy.max_interest_rate {
        return Err(LedgerError::InvalidInterestRate { rate });
    }
    Ok(())
}

/// loan terms, checked after the credit limit: installment count, then rate
pub fn validate_loan_terms(count: u32, rate: Rate, policy: &OriginationPolicy) -> Result<()> {
    validate_installment_count(count, policy)?;
    validate_interest_rate(rate, policy)
}
