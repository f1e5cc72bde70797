use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::Customer;

/// guards a customer's credit limit against over-lending
pub struct CreditLimitGuard;

impl CreditLimitGuard {
    /// fail unless `amount` fits in the customer's unused credit
    pub fn check(customer: &Customer, amount: Money) -> Result<()> {
        let available = customer.available_credit();
        if available < amount {
            return Err(LedgerError::InsufficientCredit {
                available,
                requested: amount,
            });
        }
        Ok(())
    }

    /// reserve `amount` against the limit; the caller persists the returned customer
    /// in the same transaction as the loan
    pub fn reserve(customer: &Customer, amount: Money) -> Result<Customer> {
        Self::check(customer, amount)?;

        let mut updated = customer.clone();
        updated.used_credit_limit += amount;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn customer(limit: i64, used: i64) -> Customer {
        Customer {
            id: 1,
            name: "Grace".to_string(),
            surname: "Hopper".to_string(),
            credit_limit: Money::from_major(limit),
            used_credit_limit: Money::from_major(used),
        }
    }

    #[test]
    fn test_reserve_increments_used_credit() {
        let before = customer(10_000, 0);
        let after = CreditLimitGuard::reserve(&before, Money::from_major(5_000)).unwrap();

        assert_eq!(after.used_credit_limit, Money::from_major(5_000));
        assert_eq!(after.credit_limit, before.credit_limit);
        // input is untouched
        assert_eq!(before.used_credit_limit, Money::ZERO);
    }

    #[test]
    fn test_exact_fit_is_allowed() {
        let c = customer(10_000, 4_000);
        let after = CreditLimitGuard::reserve(&c, Money::from_major(6_000)).unwrap();
        assert_eq!(after.used_credit_limit, after.credit_limit);
    }

    #[test]
    fn test_over_limit_rejected() {
        let c = customer(10_000, 4_000);
        let err = CreditLimitGuard::reserve(&c, Money::from(dec!(6000.01))).unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientCredit {
                available: Money::from_major(6_000),
                requested: Money::from(dec!(6000.01)),
            }
        );
    }

    #[test]
    fn test_exhausted_limit_rejects_any_amount() {
        let c = customer(1_000, 1_000);
        assert!(CreditLimitGuard::check(&c, Money::CENT).is_err());
    }
}
