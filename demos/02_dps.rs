/// dps - monthly deposits, savings targets and the accumulation schedule
use rust_decimal_macros::dec;
use savings_calculator_rs::{DepositTiming, DpsCalculator, Money, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut dps = DpsCalculator::builder()
        .monthly_deposit(Money::from_major(10_000))
        .tenure_months(18)
        .rate(Rate::from_percentage(10))
        .timing(DepositTiming::End)
        .build()?;

    let summary = dps.summary();
    println!(
        "deposits {} + interest {} = {}",
        summary.total_deposits,
        summary.gross_interest.whole_units(),
        summary.target_maturity.whole_units()
    );

    // deposit at the start of each month instead
    dps.set_timing(DepositTiming::Begin);
    println!("annuity-due maturity: {}", dps.state().target_maturity.whole_units());

    // how much per month to reach one million in three years?
    dps.set_tenure(dec!(36));
    dps.set_target(Money::from_major(1_000_000));
    println!("monthly deposit needed: {}", dps.state().monthly_deposit.whole_units());

    let schedule = dps.schedule();
    for row in schedule.rows.iter().step_by(6) {
        println!(
            "month {:>2}: balance {}",
            row.month,
            row.closing_balance.whole_units()
        );
    }

    Ok(())
}
