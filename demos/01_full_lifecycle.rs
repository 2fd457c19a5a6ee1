/// full lifecycle - request, approval, disbursement, repayment, closure,
/// plus the rejected branch
use microloan_rs::{
    Event, LoanAccount, LoanProductConfig, Money, SafeTimeProvider, TimeSource, Uuid,
};
use chrono::{TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== full lifecycle example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));

    // --- happy path ---
    let mut account = LoanAccount::request(
        LoanProductConfig::standard(),
        Uuid::new_v4(),
        Money::from_units(2500),
        12,
        None,
        &time,
    )?;
    println!(
        "requested: {} over {} weeks (fee {}, weekly {})",
        account.loan.principal, account.loan.term_weeks, account.loan.fee, account.loan.weekly_payment
    );

    account.approve(&time)?;
    println!("approved, schedule of {} installments generated", account.loan.term_weeks);

    account.disburse(&time)?;
    println!("disbursed, status {:?}", account.loan.status);

    // repay week by week
    let ids: Vec<_> = account
        .schedule
        .as_ref()
        .unwrap()
        .installments
        .iter()
        .map(|i| i.id)
        .collect();
    for (week, id) in ids.iter().enumerate() {
        account.record_repayment(*id, &time)?;
        let progress = account.progress().unwrap();
        println!(
            "  week {:2}: outstanding {}",
            week + 1,
            progress.outstanding_balance
        );
    }
    println!("final status: {:?}\n", account.loan.status);

    // drain events for the audit trail
    for event in account.take_events() {
        if let Event::StatusChanged {
            old_status,
            new_status,
            ..
        } = event
        {
            println!("status change: {:?} -> {:?}", old_status, new_status);
        }
    }

    // --- rejected branch ---
    let mut declined = LoanAccount::request(
        LoanProductConfig::standard(),
        Uuid::new_v4(),
        Money::from_units(800),
        4,
        None,
        &time,
    )?;
    declined.reject(&time)?;
    println!("\ndeclined loan: {:?}, schedule: {:?}", declined.loan.status, declined.schedule);

    Ok(())
}
