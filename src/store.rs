//! Persistence seams.
//!
//! The ledger reads and writes through three collaborator traits and does all
//! of it inside [`LedgerStore::transaction`]: staged writes become visible to
//! other operations only when the closure returns `Ok`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;
use tracing::debug;

use crate::decimal::Money;
use crate::errors::{LedgerError, Result};
use crate::types::{
    Customer, CustomerId, InstallmentId, Loan, LoanId, LoanInstallment, NewInstallment, NewLoan,
};

pub trait CustomerStore {
    fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// update an existing customer
    fn save_customer(&mut self, customer: &Customer) -> Result<()>;
}

pub trait LoanStore {
    fn find_loan(&self, id: LoanId) -> Result<Option<Loan>>;

    /// every loan of a customer, ordered by id
    fn loans_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Loan>>;

    /// insert and assign an id
    fn insert_loan(&mut self, loan: NewLoan) -> Result<Loan>;

    /// update an existing loan
    fn save_loan(&mut self, loan: &Loan) -> Result<()>;
}

pub trait InstallmentStore {
    /// unpaid installments of a loan, ordered by due date then id
    fn unpaid_installments(&self, loan_id: LoanId) -> Result<Vec<LoanInstallment>>;

    /// every installment of a loan, ordered by due date then id
    fn installments(&self, loan_id: LoanId) -> Result<Vec<LoanInstallment>>;

    /// insert in order and assign ids
    fn insert_installments(
        &mut self,
        loan_id: LoanId,
        installments: Vec<NewInstallment>,
    ) -> Result<Vec<LoanInstallment>>;

    /// update existing installments
    fn save_installments(&mut self, installments: &[LoanInstallment]) -> Result<()>;
}

/// everything one transaction can touch
pub trait UnitOfWork: CustomerStore + LoanStore + InstallmentStore {}

impl<T: CustomerStore + LoanStore + InstallmentStore> UnitOfWork for T {}

/// transaction boundary over the three stores
pub trait LedgerStore: Send + Sync {
    /// run `work` atomically: commit on `Ok`, discard every staged write on `Err`
    fn transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T>;
}

#[derive(Debug, Default, Clone)]
struct Tables {
    customers: BTreeMap<CustomerId, Customer>,
    loans: BTreeMap<LoanId, Loan>,
    installments: BTreeMap<InstallmentId, LoanInstallment>,
}

impl Tables {
    fn apply(&mut self, staged: Tables) {
        self.customers.extend(staged.customers);
        self.loans.extend(staged.loans);
        self.installments.extend(staged.installments);
    }
}

/// in-process store; ids come from sequences that never reuse a value
#[derive(Debug)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    customer_seq: AtomicU64,
    loan_seq: AtomicU64,
    installment_seq: AtomicU64,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            customer_seq: AtomicU64::new(1),
            loan_seq: AtomicU64::new(1),
            installment_seq: AtomicU64::new(1),
        }
    }

    /// register a customer with nothing borrowed yet
    pub fn add_customer(&self, name: &str, surname: &str, credit_limit: Money) -> Customer {
        let customer = Customer {
            id: self.customer_seq.fetch_add(1, Ordering::SeqCst),
            name: name.to_string(),
            surname: surname.to_string(),
            credit_limit,
            used_credit_limit: Money::ZERO,
        };
        self.tables
            .write()
            .customers
            .insert(customer.id, customer.clone());
        customer
    }

    /// committed customer
    pub fn customer(&self, id: CustomerId) -> Option<Customer> {
        self.tables.read().customers.get(&id).cloned()
    }

    /// committed loan
    pub fn loan(&self, id: LoanId) -> Option<Loan> {
        self.tables.read().loans.get(&id).cloned()
    }

    /// committed installments of a loan in due-date order
    pub fn installments(&self, loan_id: LoanId) -> Vec<LoanInstallment> {
        let mut installments: Vec<_> = self
            .tables
            .read()
            .installments
            .values()
            .filter(|i| i.loan_id == loan_id)
            .cloned()
            .collect();
        sort_by_due_date(&mut installments);
        installments
    }
}

impl LedgerStore for InMemoryStore {
    fn transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&mut dyn UnitOfWork) -> Result<T>,
    {
        let mut tx = InMemoryTransaction {
            store: self,
            staged: Tables::default(),
        };
        let value = work(&mut tx)?;

        let staged = tx.staged;
        debug!(
            customers = staged.customers.len(),
            loans = staged.loans.len(),
            installments = staged.installments.len(),
            "committing staged writes"
        );
        self.tables.write().apply(staged);
        Ok(value)
    }
}

/// staged writes layered over the committed tables
struct InMemoryTransaction<'a> {
    store: &'a InMemoryStore,
    staged: Tables,
}

impl InMemoryTransaction<'_> {
    fn loan_installments(&self, loan_id: LoanId) -> Vec<LoanInstallment> {
        let mut merged: BTreeMap<InstallmentId, LoanInstallment> = self
            .store
            .tables
            .read()
            .installments
            .values()
            .filter(|i| i.loan_id == loan_id)
            .map(|i| (i.id, i.clone()))
            .collect();
        merged.extend(
            self.staged
                .installments
                .values()
                .filter(|i| i.loan_id == loan_id)
                .map(|i| (i.id, i.clone())),
        );

        let mut installments: Vec<_> = merged.into_values().collect();
        sort_by_due_date(&mut installments);
        installments
    }

    fn installment_exists(&self, id: InstallmentId) -> bool {
        self.staged.installments.contains_key(&id)
            || self.store.tables.read().installments.contains_key(&id)
    }
}

impl CustomerStore for InMemoryTransaction<'_> {
    fn find_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        if let Some(customer) = self.staged.customers.get(&id) {
            return Ok(Some(customer.clone()));
        }
        Ok(self.store.tables.read().customers.get(&id).cloned())
    }

    fn save_customer(&mut self, customer: &Customer) -> Result<()> {
        if self.find_customer(customer.id)?.is_none() {
            return Err(LedgerError::Storage {
                message: format!("customer {} does not exist", customer.id),
            });
        }
        self.staged.customers.insert(customer.id, customer.clone());
        Ok(())
    }
}

impl LoanStore for InMemoryTransaction<'_> {
    fn find_loan(&self, id: LoanId) -> Result<Option<Loan>> {
        if let Some(loan) = self.staged.loans.get(&id) {
            return Ok(Some(loan.clone()));
        }
        Ok(self.store.tables.read().loans.get(&id).cloned())
    }

    fn loans_by_customer(&self, customer_id: CustomerId) -> Result<Vec<Loan>> {
        let mut merged: BTreeMap<LoanId, Loan> = self
            .store
            .tables
            .read()
            .loans
            .values()
            .filter(|l| l.customer_id == customer_id)
            .map(|l| (l.id, l.clone()))
            .collect();
        merged.extend(
            self.staged
                .loans
                .values()
                .filter(|l| l.customer_id == customer_id)
                .map(|l| (l.id, l.clone())),
        );
        Ok(merged.into_values().collect())
    }

    fn insert_loan(&mut self, loan: NewLoan) -> Result<Loan> {
        let id = self.store.loan_seq.fetch_add(1, Ordering::SeqCst);
        let loan = loan.with_id(id);
        self.staged.loans.insert(id, loan.clone());
        Ok(loan)
    }

    fn save_loan(&mut self, loan: &Loan) -> Result<()> {
        if self.find_loan(loan.id)?.is_none() {
            return Err(LedgerError::Storage {
                message: format!("loan {} does not exist", loan.id),
            });
        }
        self.staged.loans.insert(loan.id, loan.clone());
        Ok(())
    }
}

impl InstallmentStore for InMemoryTransaction<'_> {
    fn unpaid_installments(&self, loan_id: LoanId) -> Result<Vec<LoanInstallment>> {
        let mut installments = self.loan_installments(loan_id);
        installments.retain(|i| !i.is_paid);
        Ok(installments)
    }

    fn installments(&self, loan_id: LoanId) -> Result<Vec<LoanInstallment>> {
        Ok(self.loan_installments(loan_id))
    }

    fn insert_installments(
        &mut self,
        loan_id: LoanId,
        installments: Vec<NewInstallment>,
    ) -> Result<Vec<LoanInstallment>> {
        if self.find_loan(loan_id)?.is_none() {
            return Err(LedgerError::Storage {
                message: format!("loan {} does not exist", loan_id),
            });
        }

        let mut inserted = Vec::with_capacity(installments.len());
        for draft in installments {
            let id = self.store.installment_seq.fetch_add(1, Ordering::SeqCst);
            let installment = draft.with_id(id, loan_id);
            self.staged.installments.insert(id, installment.clone());
            inserted.push(installment);
        }
        Ok(inserted)
    }

    fn save_installments(&mut self, installments: &[LoanInstallment]) -> Result<()> {
        if let Some(missing) = installments.iter().find(|i| !self.installment_exists(i.id)) {
            return Err(LedgerError::Storage {
                message: format!("installment {} does not exist", missing.id),
            });
        }
        for installment in installments {
            self.staged.installments.insert(installment.id, installment.clone());
        }
        Ok(())
    }
}

fn sort_by_due_date(installments: &mut [LoanInstallment]) {
    installments.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
}
