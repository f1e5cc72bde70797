/// repayment - walk a loan to settlement on a controlled clock
use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use installment_ledger_rs::{
    Event, InMemoryStore, LedgerConfig, LedgerError, LoanLedger, LoanRequest, Money, Rate,
    SafeTimeProvider, TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .init();

    println!("=== repayment example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    let store = Arc::new(InMemoryStore::new());
    let customer = store.add_customer("Edsger", "Dijkstra", Money::from_major(20_000));
    let ledger = LoanLedger::new(store.clone(), LedgerConfig::default(), time.clone())?;

    let loan = ledger.create_loan(&LoanRequest {
        customer_id: customer.id,
        loan_amount: Money::from_major(6_000),
        interest_rate: Rate::from_percentage(10),
        number_of_installments: 6,
    })?;
    println!(
        "loan {} created on {}: total {}",
        loan.id,
        time.now().format("%Y-%m-%d"),
        loan.total_loan_amount
    );

    for installment in ledger.installment_schedule(loan.id)? {
        println!("  due {}  {}", installment.due_date, installment.amount);
    }

    // too small for one installment
    match ledger.pay_loan(loan.id, Money::from_major(100)) {
        Err(e @ LedgerError::InsufficientPaymentForInstallment { .. }) => {
            println!("\nrejected: {}", e.to_response().detail)
        }
        other => println!("\nunexpected: {:?}", other),
    }

    // pay two installments, leaving a remainder unapplied
    let result = ledger.pay_loan(loan.id, Money::from_major(2_500))?;
    println!(
        "paid {} installments for {}",
        result.installments_paid, result.total_paid
    );

    // the last installment is still outside the payable window
    match ledger.pay_loan(loan.id, Money::from_major(4_400)) {
        Err(e) => println!("rejected: {}", e),
        Ok(r) => println!("unexpected: {:?}", r),
    }

    // three months later everything is payable
    controller.advance(Duration::days(92));
    println!("\nnow {}", time.now().format("%Y-%m-%d"));
    let result = ledger.pay_loan(loan.id, Money::from_major(4_400))?;
    println!(
        "paid {} installments for {}, fully paid: {}",
        result.installments_paid, result.total_paid, result.loan_fully_paid
    );

    println!("\nevents:");
    for event in ledger.take_events() {
        match event {
            Event::InstallmentPaid { .. } => {}
            other => println!("  {}", serde_json::to_string(&other)?),
        }
    }

    let customer = store.customer(customer.id).ok_or("customer missing")?;
    println!(
        "\ncredit used {} of {}",
        customer.used_credit_limit, customer.credit_limit
    );

    Ok(())
}
