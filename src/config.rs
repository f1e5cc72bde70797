use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{LedgerError, Result};

/// decimal places every installment amount is rounded to
pub const INSTALLMENT_SCALE: u32 = 2;

/// lending policy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub origination: OriginationPolicy,
    pub repayment: RepaymentPolicy,
}

/// constraints applied when a loan is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OriginationPolicy {
    pub allowed_installment_counts: Vec<u32>,
    pub min_interest_rate: Rate,
    pub max_interest_rate: Rate,
}

/// constraints applied when a payment is allocated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepaymentPolicy {
    /// installments due more than this many calendar months after today are refused
    pub payable_window_months: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl LedgerConfig {
    /// 6/9/12/24 installments, 10%..=50% flat interest, three months of prepayment
    pub fn standard() -> Self {
        Self {
            origination: OriginationPolicy {
                allowed_installment_counts: vec![6, 9, 12, 24],
                min_interest_rate: Rate::from_decimal(dec!(0.1)),
                max_interest_rate: Rate::from_decimal(dec!(0.5)),
            },
            repayment: RepaymentPolicy {
                payable_window_months: 3,
            },
        }
    }

    /// load from a json document and validate it
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LedgerConfig = serde_json::from_str(json).map_err(|e| {
            LedgerError::InvalidConfiguration {
                message: e.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::InvalidConfiguration {
            message: e.to_string(),
        })
    }

    /// reject policies no loan could ever satisfy
    pub fn validate(&self) -> Result<()> {
        let origination = &self.origination;

        if origination.allowed_installment_counts.is_empty() {
            return Err(LedgerError::InvalidConfiguration {
                message: "at least one installment count must be allowed".to_string(),
            });
        }

        if origination.allowed_installment_counts.contains(&0) {
            return Err(LedgerError::InvalidConfiguration {
                message: "installment count must be positive".to_string(),
            });
        }

        if origination.min_interest_rate < Rate::ZERO {
            return Err(LedgerError::InvalidConfiguration {
                message: format!("minimum interest rate {} is negative", origination.min_interest_rate),
            });
        }

        if origination.min_interest_rate > origination.max_interest_rate {
            return Err(LedgerError::InvalidConfiguration {
                message: format!(
                    "minimum interest rate {} exceeds maximum {}",
                    origination.min_interest_rate, origination.max_interest_rate
                ),
            });
        }

        Ok(())
    }
}
