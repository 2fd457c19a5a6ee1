/// json state - wire records for the backing store
use microloan_rs::{
    installments_from_records, LoanAccount, LoanProductConfig, LoanRecord, Money, PaymentRecord,
    SafeTimeProvider, TimeSource, Uuid,
};
use chrono::{TimeZone, Utc};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));

    let mut account = LoanAccount::request(
        LoanProductConfig::standard(),
        Uuid::new_v4(),
        Money::from_units(1000),
        4,
        None,
        &time,
    )?;
    account.disburse(&time)?;

    // serialize the loan row the way the store persists it
    let loan_record = LoanRecord::from(&account.loan);
    println!("{}", serde_json::to_string_pretty(&loan_record)?);

    // serialize the payment rows
    let payment_records: Vec<PaymentRecord> = account
        .schedule
        .as_ref()
        .unwrap()
        .installments
        .iter()
        .map(PaymentRecord::from)
        .collect();
    println!("{}", serde_json::to_string_pretty(&payment_records)?);

    // and read them back through boundary validation
    let loan = microloan_rs::Loan::try_from(loan_record)?;
    let installments = installments_from_records(loan.id, payment_records)?;
    println!(
        "restored loan {:?} with {} installments",
        loan.status,
        installments.len()
    );

    Ok(())
}
