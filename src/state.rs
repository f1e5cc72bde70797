use crate::errors::Result;
use crate::payments::{Allocation, AmortizationSchedule};
use crate::store::UnitOfWork;
use crate::types::{Customer, Loan, LoanId, LoanInstallment, NewLoan};

/// a loan together with the installments created for it
#[derive(Debug, Clone)]
pub struct Origination {
    pub loan: Loan,
    pub installments: Vec<LoanInstallment>,
    pub customer: Customer,
}

/// loan state after an allocation has been written back
#[derive(Debug, Clone)]
pub struct Settlement {
    pub loan: Loan,
    pub allocation: Allocation,
    /// loan flipped to paid by this allocation
    pub settled_now: bool,
}

/// writes loan, installment and customer changes through a unit of work
pub struct LoanStateManager;

impl LoanStateManager {
    /// persist a new loan, its full schedule and the customer's reserved credit
    pub fn originate(
        tx: &mut dyn UnitOfWork,
        customer: Customer,
        loan: NewLoan,
        schedule: &AmortizationSchedule,
    ) -> Result<Origination> {
        let loan = tx.insert_loan(loan)?;
        let installments = tx.insert_installments(loan.id, schedule.to_new_installments())?;
        tx.save_customer(&customer)?;

        Ok(Origination {
            loan,
            installments,
            customer,
        })
    }

    /// persist paid installments, then mark the loan paid once nothing is outstanding
    ///
    /// `is_paid` only ever moves from false to true.
    pub fn apply_allocation(
        tx: &mut dyn UnitOfWork,
        mut loan: Loan,
        allocation: Allocation,
    ) -> Result<Settlement> {
        if !allocation.paid.is_empty() {
            tx.save_installments(&allocation.paid)?;
        }

        let fully_paid = tx.unpaid_installments(loan.id)?.is_empty();
        let settled_now = fully_paid && !loan.is_paid;
        if settled_now {
            loan.is_paid = true;
            tx.save_loan(&loan)?;
        }

        Ok(Settlement {
            loan,
            allocation,
            settled_now,
        })
    }

    pub fn outstanding(tx: &dyn UnitOfWork, loan_id: LoanId) -> Result<Vec<LoanInstallment>> {
        tx.unpaid_installments(loan_id)
    }
}
