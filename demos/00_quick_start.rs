/// quick start - minimal example to get started
use std::sync::Arc;

use installment_ledger_rs::{InMemoryStore, LedgerConfig, LoanLedger, LoanRequest, Money, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // a customer with a $10,000 credit limit
    let store = Arc::new(InMemoryStore::new());
    let customer = store.add_customer("Grace", "Hopper", Money::from_major(10_000));

    // production: use system time
    let ledger = LoanLedger::with_system_time(store.clone(), LedgerConfig::default())?;

    // $5,000 at 20% over 12 installments
    let loan = ledger.create_loan(&LoanRequest {
        customer_id: customer.id,
        loan_amount: Money::from_major(5_000),
        interest_rate: Rate::from_percentage(20),
        number_of_installments: 12,
    })?;

    // pay the first installment
    let result = ledger.pay_loan(loan.id, Money::from_major(500))?;

    println!("{}", serde_json::to_string_pretty(&loan)?);
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
