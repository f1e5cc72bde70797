use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;

use crate::config::INSTALLMENT_SCALE;
use crate::decimal::{Money, Rate};
use crate::errors::{LedgerError, Result};
use crate::types::NewInstallment;

/// scheduled installment in an amortization schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledInstallment {
    pub installment_number: u32,
    pub due_date: NaiveDate,
    pub amount: Money,
}

/// flat-interest amortization schedule
///
/// The total payable is `principal * (1 + rate)`, split into equal installments
/// rounded half-up to cents. The rounding remainder is not folded into the last
/// installment, so the scheduled total can drift from the total payable by up
/// to half a cent per installment.
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub interest_rate: Rate,
    pub installment_count: u32,
    pub total_payable: Money,
    pub installment_amount: Money,
    pub installments: Vec<ScheduledInstallment>,
}

impl AmortizationSchedule {
    /// generate the schedule for a loan created on `today`
    pub fn generate(
        principal: Money,
        interest_rate: Rate,
        installment_count: u32,
        today: NaiveDate,
    ) -> Result<Self> {
        let total_payable = interest_rate
            .growth_factor()
            .and_then(|factor| principal.checked_mul(factor))
            .ok_or_else(|| out_of_range(principal, interest_rate))?;
        let installment_amount = total_payable.share(installment_count, INSTALLMENT_SCALE);
        // the scheduled total must stay representable as well
        installment_amount
            .checked_mul(Decimal::from(installment_count))
            .ok_or_else(|| out_of_range(principal, interest_rate))?;
        let first_due = first_of_next_month(today)?;

        let mut installments = Vec::with_capacity(installment_count as usize);
        for i in 0..installment_count {
            installments.push(ScheduledInstallment {
                installment_number: i + 1,
                due_date: add_months(first_due, i)?,
                amount: installment_amount,
            });
        }

        Ok(Self {
            principal,
            interest_rate,
            installment_count,
            total_payable,
            installment_amount,
            installments,
        })
    }

    pub fn due_dates(&self) -> Vec<NaiveDate> {
        self.installments.iter().map(|i| i.due_date).collect()
    }

    /// sum of every scheduled installment
    pub fn scheduled_total(&self) -> Money {
        self.installments.iter().map(|i| i.amount).sum()
    }

    /// scheduled total minus total payable (positive when customers overpay by rounding)
    pub fn rounding_drift(&self) -> Money {
        self.scheduled_total() - self.total_payable
    }

    /// installment drafts ready to be persisted
    pub fn to_new_installments(&self) -> Vec<NewInstallment> {
        self.installments
            .iter()
            .map(|i| NewInstallment {
                amount: i.amount,
                due_date: i.due_date,
            })
            .collect()
    }
}

fn out_of_range(principal: Money, rate: Rate) -> LedgerError {
    LedgerError::InvalidArgument {
        message: format!("loan amount {} at rate {} is out of range", principal, rate),
    }
}

/// first calendar day of the month after `date`
pub fn first_of_next_month(date: NaiveDate) -> Result<NaiveDate> {
    let first = date.with_day(1).ok_or_else(|| LedgerError::InvalidDate {
        message: format!("no first day for {}", date),
    })?;
    add_months(first, 1)
}

/// calendar month arithmetic, clamping to the last day of shorter months
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| LedgerError::InvalidDate {
            message: format!("{} + {} months is out of range", date, months),
        })
}
