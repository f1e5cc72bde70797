use chrono::NaiveDate;

use crate::config::RepaymentPolicy;
use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::LoanInstallment;

use super::amortization::add_months;

/// outcome of allocating one payment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub installments_paid: u32,
    pub total_paid: Money,
    /// installments marked paid by this allocation, in due-date order
    pub paid: Vec<LoanInstallment>,
    /// part of the payment too small for the next installment; it is not carried anywhere
    pub unapplied: Money,
}

impl Allocation {
    fn empty(amount: Money) -> Self {
        Self {
            installments_paid: 0,
            total_paid: Money::ZERO,
            paid: Vec::new(),
            unapplied: amount,
        }
    }
}

/// allocates a payment across outstanding installments, oldest due date first
///
/// Only whole installments are paid. The first installment the payment cannot
/// cover ends the allocation, or rejects it when nothing has been paid yet.
/// Any installment due beyond the payable window rejects the whole allocation.
pub struct PaymentAllocator {
    payable_window_months: u32,
}

impl PaymentAllocator {
    pub fn new(policy: &RepaymentPolicy) -> Self {
        Self {
            payable_window_months: policy.payable_window_months,
        }
    }

    /// last due date still payable today
    pub fn payable_until(&self, today: NaiveDate) -> Result<NaiveDate> {
        add_months(today, self.payable_window_months)
    }

    /// `outstanding` must be the loan's unpaid installments sorted by due date
    pub fn allocate(
        &self,
        amount: Money,
        outstanding: &[LoanInstallment],
        today: NaiveDate,
    ) -> Result<Allocation> {
        let payable_until = self.payable_until(today)?;
        let mut allocation = Allocation::empty(amount);
        let mut remaining = amount;

        for installment in outstanding {
            if remaining < installment.amount {
                if allocation.installments_paid == 0 {
                    return Err(LedgerError::InsufficientPaymentForInstallment {
                        installment_id: installment.id,
                        required: installment.amount,
                        provided: remaining,
                    });
                }
                break;
            }

            if installment.due_date > payable_until {
                return Err(LedgerError::InstallmentNotYetPayable {
                    installment_id: installment.id,
                    due_date: installment.due_date,
                });
            }

            let mut paid = installment.clone();
            paid.mark_paid(today);

            remaining -= paid.amount;
            allocation.installments_paid += 1;
            allocation.total_paid += paid.amount;
            allocation.paid.push(paid);
        }

        allocation.unapplied = remaining;
        Ok(allocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LedgerConfig;
    use crate::types::NewInstallment;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn allocator() -> PaymentAllocator {
        PaymentAllocator::new(&LedgerConfig::standard().repayment)
    }

    /// monthly installments of `amount`, ids from 1, first due on `first_due`
    fn installments(count: u32, amount: Money, first_due: NaiveDate) -> Vec<LoanInstallment> {
        (0..count)
            .map(|i| {
                NewInstallment {
                    amount,
                    due_date: add_months(first_due, i).unwrap(),
                }
                .with_id(u64::from(i) + 1, 1)
            })
            .collect()
    }

    #[test]
    fn test_pays_exactly_one_installment() {
        let today = date(2024, 3, 1);
        let outstanding = installments(2, Money::from_major(1_000), today);

        let allocation = allocator()
            .allocate(Money::from_major(1_000), &outstanding, today)
            .unwrap();

        assert_eq!(allocation.installments_paid, 1);
        assert_eq!(allocation.total_paid, Money::from_major(1_000));
        assert_eq!(allocation.paid.len(), 1);
        assert_eq!(allocation.paid[0].id, 1);
        assert!(allocation.paid[0].is_paid);
        assert_eq!(allocation.paid[0].payment_date, Some(today));
        assert_eq!(allocation.unapplied, Money::ZERO);
    }

    #[test]
    fn test_insufficient_for_first_installment() {
        let today = date(2024, 3, 1);
        let outstanding = installments(1, Money::from_major(1_000), today);

        let err = allocator()
            .allocate(Money::from_major(500), &outstanding, today)
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::InsufficientPaymentForInstallment {
                installment_id: 1,
                required: Money::from_major(1_000),
                provided: Money::from_major(500),
            }
        );
    }

    #[test]
    fn test_leftover_after_paid_installment_is_unapplied() {
        let today = date(2024, 3, 1);
        let outstanding = installments(3, Money::from_major(1_000), today);

        let allocation = allocator()
            .allocate(Money::from_major(1_750), &outstanding, today)
            .unwrap();

        assert_eq!(allocation.installments_paid, 1);
        assert_eq!(allocation.total_paid, Money::from_major(1_000));
        assert_eq!(allocation.unapplied, Money::from_major(750));
    }

    #[test]
    fn test_installment_beyond_window_rejects_everything() {
        let today = date(2024, 1, 1);
        // first due four months out
        let outstanding = installments(1, Money::from_major(1_000), date(2024, 5, 1));

        let err = allocator()
            .allocate(Money::from_major(1_000), &outstanding, today)
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::InstallmentNotYetPayable {
                installment_id: 1,
                due_date: date(2024, 5, 1),
            }
        );
    }

    #[test]
    fn test_window_failure_after_earlier_payments_still_rejects() {
        let today = date(2024, 1, 1);
        // due jan, feb, mar, apr, may: may is past the window
        let outstanding = installments(5, Money::from_major(100), today);

        let err = allocator()
            .allocate(Money::from_major(500), &outstanding, today)
            .unwrap_err();

        assert!(matches!(err, LedgerError::InstallmentNotYetPayable { installment_id: 5, .. }));
        // input installments are untouched
        assert!(outstanding.iter().all(|i| !i.is_paid));
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let today = date(2024, 1, 1);
        // exactly three months ahead is still payable
        let outstanding = installments(1, Money::from_major(100), date(2024, 4, 1));

        let allocation = allocator()
            .allocate(Money::from_major(100), &outstanding, today)
            .unwrap();
        assert_eq!(allocation.installments_paid, 1);

        // one day later is not
        let outstanding = installments(1, Money::from_major(100), date(2024, 4, 2));
        assert!(allocator()
            .allocate(Money::from_major(100), &outstanding, today)
            .is_err());
    }

    #[test]
    fn test_due_today_and_overdue_are_payable() {
        let today = date(2024, 6, 1);
        let outstanding = installments(3, Money::from_major(250), date(2024, 4, 1));

        let allocation = allocator()
            .allocate(Money::from_major(750), &outstanding, today)
            .unwrap();

        assert_eq!(allocation.installments_paid, 3);
        assert_eq!(allocation.total_paid, Money::from_major(750));
    }

    #[test]
    fn test_small_payment_does_not_reach_window_check() {
        let today = date(2024, 1, 1);
        let outstanding = installments(1, Money::from_major(1_000), date(2024, 9, 1));

        // insufficiency is evaluated before the window
        let err = allocator()
            .allocate(Money::from_major(10), &outstanding, today)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientPaymentForInstallment { .. }));
    }

    #[test]
    fn test_no_outstanding_installments() {
        let allocation = allocator()
            .allocate(Money::from_major(1_000), &[], date(2024, 1, 1))
            .unwrap();

        assert_eq!(allocation.installments_paid, 0);
        assert_eq!(allocation.total_paid, Money::ZERO);
        assert!(allocation.paid.is_empty());
    }

    #[test]
    fn test_never_pays_more_than_payment_covers() {
        let today = date(2024, 1, 1);
        let amount = Money::from(dec!(333.34));
        // all within the window: due jan..apr
        let outstanding = installments(4, amount, today);

        for cents in [33_334i64, 50_000, 66_667, 66_668, 99_999, 100_002, 133_336, 500_000] {
            let payment = Money::from_minor(cents, 2);
            let allocation = allocator().allocate(payment, &outstanding, today).unwrap();

            let affordable = (payment.as_decimal() / amount.as_decimal()).floor();
            let expected = affordable.min(rust_decimal::Decimal::from(4));
            assert_eq!(rust_decimal::Decimal::from(allocation.installments_paid), expected);
            assert!(allocation.total_paid <= payment);
        }
    }

    #[test]
    fn test_custom_window() {
        let mut policy = LedgerConfig::standard().repayment;
        policy.payable_window_months = 0;
        let allocator = PaymentAllocator::new(&policy);
        let today = date(2024, 1, 1);
        let outstanding = installments(2, Money::from_major(100), today);

        // only what is due today can be paid
        let err = allocator
            .allocate(Money::from_major(200), &outstanding, today)
            .unwrap_err();
        assert!(matches!(err, LedgerError::InstallmentNotYetPayable { installment_id: 2, .. }));
    }
}
