use std::sync::Arc;

use hourglass_rs::{SafeTimeProvider, TimeSource};
use parking_lot::Mutex;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::credit::CreditLimitGuard;
use crate::decimal::Money;
use crate::errors::{ErrorCategory, LedgerError, Result};
use crate::events::{Event, EventStore};
use crate::locks::KeyedLocks;
use crate::payments::{AmortizationSchedule, PaymentAllocator};
use crate::state::{LoanStateManager, Origination, Settlement};
use crate::store::LedgerStore;
use crate::types::{
    CustomerId, Loan, LoanId, LoanInstallment, LoanRequest, NewLoan, PaymentRequest, PaymentResult,
};
use crate::validation;

/// loan origination and repayment over an injected store and clock
///
/// Every operation runs in one store transaction. Payments hold their loan's
/// lock stripe and originations hold their customer's lock stripe until the
/// transaction has committed, so concurrent requests against the same loan or
/// customer are applied one after another.
pub struct LoanLedger<S: LedgerStore> {
    store: Arc<S>,
    config: LedgerConfig,
    time: SafeTimeProvider,
    loan_locks: KeyedLocks,
    customer_locks: KeyedLocks,
    events: Mutex<EventStore>,
}

impl<S: LedgerStore> LoanLedger<S> {
    pub fn new(store: Arc<S>, config: LedgerConfig, time: SafeTimeProvider) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            store,
            config,
            time,
            loan_locks: KeyedLocks::new(),
            customer_locks: KeyedLocks::new(),
            events: Mutex::new(EventStore::new()),
        })
    }

    /// ledger on the system clock
    pub fn with_system_time(store: Arc<S>, config: LedgerConfig) -> Result<Self> {
        Self::new(store, config, SafeTimeProvider::new(TimeSource::System))
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// originate a loan: credit check, term checks, schedule, then persist
    pub fn create_loan(&self, request: &LoanRequest) -> Result<Loan> {
        validation::validate_id("customer", request.customer_id)?;
        validation::validate_loan_amount(request.loan_amount)?;

        let _guard = self.customer_locks.lock(request.customer_id);

        let now = self.time.now();
        let origination = self
            .store
            .transaction(|tx| {
                let customer = tx
                    .find_customer(request.customer_id)?
                    .ok_or(LedgerError::CustomerNotFound {
                        id: request.customer_id,
                    })?;

                CreditLimitGuard::check(&customer, request.loan_amount)?;
                validation::validate_loan_terms(
                    request.number_of_installments,
                    request.interest_rate,
                    &self.config.origination,
                )?;

                let schedule = AmortizationSchedule::generate(
                    request.loan_amount,
                    request.interest_rate,
                    request.number_of_installments,
                    now.date_naive(),
                )?;
                let reserved = CreditLimitGuard::reserve(&customer, request.loan_amount)?;

                let loan = NewLoan {
                    customer_id: customer.id,
                    loan_amount: request.loan_amount,
                    total_loan_amount: schedule.total_payable,
                    interest_rate: request.interest_rate,
                    number_of_installments: request.number_of_installments,
                    create_date: now,
                };
                LoanStateManager::originate(tx, reserved, loan, &schedule)
            })
            .map_err(|e| rejected("create_loan", e))?;

        let Origination {
            loan,
            installments,
            customer,
        } = origination;
        let installment_amount = installments.first().map(|i| i.amount).unwrap_or(Money::ZERO);

        info!(
            loan_id = loan.id,
            customer_id = customer.id,
            loan_amount = %loan.loan_amount,
            total_loan_amount = %loan.total_loan_amount,
            installments = loan.number_of_installments,
            "loan created"
        );

        self.publish(vec![
            Event::LoanOriginated {
                loan_id: loan.id,
                customer_id: customer.id,
                loan_amount: loan.loan_amount,
                total_loan_amount: loan.total_loan_amount,
                installment_amount,
                number_of_installments: loan.number_of_installments,
                timestamp: now,
            },
            Event::CreditReserved {
                customer_id: customer.id,
                amount: loan.loan_amount,
                used_credit_limit: customer.used_credit_limit,
                credit_limit: customer.credit_limit,
                timestamp: now,
            },
        ]);

        Ok(loan)
    }

    /// every loan of a customer, oldest first
    pub fn list_loans(&self, customer_id: CustomerId) -> Result<Vec<Loan>> {
        validation::validate_id("customer", customer_id)?;

        self.store.transaction(|tx| {
            if tx.find_customer(customer_id)?.is_none() {
                return Err(LedgerError::CustomerNotFound { id: customer_id });
            }
            tx.loans_by_customer(customer_id)
        })
    }

    /// unpaid installments of a loan, earliest due date first
    pub fn list_outstanding_installments(&self, loan_id: LoanId) -> Result<Vec<LoanInstallment>> {
        validation::validate_id("loan", loan_id)?;

        self.store.transaction(|tx| {
            if tx.find_loan(loan_id)?.is_none() {
                return Err(LedgerError::LoanNotFound { id: loan_id });
            }
            LoanStateManager::outstanding(tx, loan_id)
        })
    }

    /// every installment of a loan, paid or not, earliest due date first
    pub fn installment_schedule(&self, loan_id: LoanId) -> Result<Vec<LoanInstallment>> {
        validation::validate_id("loan", loan_id)?;

        self.store.transaction(|tx| {
            if tx.find_loan(loan_id)?.is_none() {
                return Err(LedgerError::LoanNotFound { id: loan_id });
            }
            tx.installments(loan_id)
        })
    }

    /// pay whole installments in due-date order; see [`PaymentAllocator`]
    pub fn pay_loan(&self, loan_id: LoanId, amount: Money) -> Result<PaymentResult> {
        validation::validate_id("loan", loan_id)?;
        validation::validate_payment_amount(amount)?;

        let _guard = self.loan_locks.lock(loan_id);

        let now = self.time.now();
        let today = now.date_naive();
        let allocator = PaymentAllocator::new(&self.config.repayment);

        let settlement = self
            .store
            .transaction(|tx| {
                let loan = tx
                    .find_loan(loan_id)?
                    .ok_or(LedgerError::LoanNotFound { id: loan_id })?;
                let outstanding = LoanStateManager::outstanding(tx, loan_id)?;
                let allocation = allocator.allocate(amount, &outstanding, today)?;
                LoanStateManager::apply_allocation(tx, loan, allocation)
            })
            .map_err(|e| rejected("pay_loan", e))?;

        let Settlement {
            loan,
            allocation,
            settled_now,
        } = settlement;
        let payment_id = Uuid::new_v4();

        let mut events = Vec::with_capacity(allocation.paid.len() + 2);
        for installment in &allocation.paid {
            info!(
                loan_id,
                installment_id = installment.id,
                amount = %installment.amount,
                "paid installment"
            );
            events.push(Event::InstallmentPaid {
                payment_id,
                loan_id,
                installment_id: installment.id,
                amount: installment.amount,
                due_date: installment.due_date,
                payment_date: today,
            });
        }

        if allocation.unapplied.is_positive() {
            debug!(loan_id, unapplied = %allocation.unapplied, "payment remainder not applied");
        }

        events.push(Event::PaymentReceived {
            payment_id,
            loan_id,
            amount,
            installments_paid: allocation.installments_paid,
            total_paid: allocation.total_paid,
            unapplied: allocation.unapplied,
            timestamp: now,
        });

        if settled_now {
            info!(loan_id, customer_id = loan.customer_id, "loan fully paid");
            events.push(Event::LoanSettled {
                loan_id,
                customer_id: loan.customer_id,
                total_loan_amount: loan.total_loan_amount,
                timestamp: now,
            });
        }

        self.publish(events);

        Ok(PaymentResult {
            installments_paid: allocation.installments_paid,
            total_paid: allocation.total_paid,
            loan_fully_paid: loan.is_paid,
        })
    }

    /// pay from a json payment request
    pub fn submit_payment(&self, request: &PaymentRequest) -> Result<PaymentResult> {
        self.pay_loan(request.loan_id, request.payment_amount)
    }

    /// drain events published by committed operations
    pub fn take_events(&self) -> Vec<Event> {
        self.events.lock().take_events()
    }

    fn publish(&self, events: Vec<Event>) {
        let mut store = self.events.lock();
        for event in events {
            store.emit(event);
        }
    }
}

fn rejected(operation: &str, err: LedgerError) -> LedgerError {
    match err.category() {
        ErrorCategory::Internal => error!(operation, error = %err, "operation failed"),
        ErrorCategory::PolicyConflict => warn!(operation, error = %err, "operation rejected"),
        category => info!(operation, ?category, error = %err, "operation rejected"),
    }
    err
}
