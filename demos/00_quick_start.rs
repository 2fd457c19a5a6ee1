/// quick start - price a loan, disburse it, repay it
use microloan_rs::{LoanAccount, LoanProductConfig, Money, SafeTimeProvider, TimeSource, Uuid};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::System);

    // borrower asks for 1000 over 4 weeks under the standard product
    let mut account = LoanAccount::request(
        LoanProductConfig::standard(),
        Uuid::new_v4(),
        Money::from_units(1000),
        4,
        None,
        &time,
    )?;
    println!(
        "requested {} + fee {} = {} over {} weeks, {} per week",
        account.loan.principal,
        account.loan.fee,
        account.loan.total_repayable(),
        account.loan.term_weeks,
        account.loan.weekly_payment,
    );

    // disbursement materializes the weekly schedule
    account.disburse(&time)?;
    for installment in &account.schedule.as_ref().unwrap().installments {
        println!(
            "  week {} due {} amount {}",
            installment.sequence,
            installment.due_date.format("%Y-%m-%d"),
            installment.amount,
        );
    }

    // pay everything off
    let ids: Vec<_> = account
        .schedule
        .as_ref()
        .unwrap()
        .installments
        .iter()
        .map(|i| i.id)
        .collect();
    for id in ids {
        account.record_repayment(id, &time)?;
    }
    println!("final status: {:?}", account.loan.status);

    Ok(())
}
