/// time control - deterministic schedules and the overdue sweep
use microloan_rs::{LoanAccount, LoanProductConfig, Money, SafeTimeProvider, TimeSource, Uuid};
use chrono::{Duration, TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== time control example ===\n");

    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let controller = time.test_control().unwrap();

    println!("starting date: {}", time.now().format("%Y-%m-%d"));

    let mut account = LoanAccount::request(
        LoanProductConfig::standard(),
        Uuid::new_v4(),
        Money::from_units(1000),
        4,
        None,
        &time,
    )?;
    account.disburse(&time)?;

    for installment in &account.schedule.as_ref().unwrap().installments {
        println!(
            "  week {} due {}",
            installment.sequence,
            installment.due_date.format("%Y-%m-%d")
        );
    }

    // nothing is overdue yet
    assert!(account.mark_overdue(&time)?.is_empty());

    // pay the first installment on time
    let first = account.schedule.as_ref().unwrap().installments[0].id;
    controller.advance(Duration::days(6));
    account.record_repayment(first, &time)?;
    println!("\npaid week 1 on {}", time.now().format("%Y-%m-%d"));

    // skip week 2 and run the sweep after its due date
    controller.advance(Duration::days(10));
    let flagged = account.mark_overdue(&time)?;
    println!(
        "sweep on {}: {} installment(s) overdue",
        time.now().format("%Y-%m-%d"),
        flagged.len()
    );

    // a late payment still settles the overdue installment
    let second = account.schedule.as_ref().unwrap().installments[1].id;
    account.record_repayment(second, &time)?;
    let progress = account.progress().unwrap();
    println!(
        "after late payment: {}/{} paid, outstanding {}",
        progress.paid_installments, progress.total_installments, progress.outstanding_balance
    );

    Ok(())
}
