/// fixed deposit - two-way editing between principal and maturity
use rust_decimal_macros::dec;
use savings_calculator_rs::{
    CompoundingFrequency, DeductionConfig, FixedDepositCalculator, Money, Rate,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut fd = FixedDepositCalculator::builder()
        .principal(Money::from_major(500_000))
        .tenure_months(24)
        .compounding(CompoundingFrequency::Quarterly)
        .deductions(DeductionConfig::none().with_ait(dec!(10)))
        .build()?;

    println!("default rate for 24 months: {}", fd.state().rate);
    println!("principal {} -> maturity {}", fd.state().principal, fd.state().maturity.whole_units());

    // the user now types the maturity they want; principal follows
    fd.set_maturity(Money::from_major(650_000));
    println!("maturity {} <- principal {}", fd.state().maturity, fd.state().principal.whole_units());

    // an over-the-cap rate is kept as requested but capped for the math
    fd.set_rate(Rate::from_percentage(12));
    println!("requested {} effective {}", fd.state().rate, fd.effective_rate());

    // early exit: penalty on interest and the flat duty from the band table
    fd.set_deductions(fd.config().deductions.clone().with_penalty(dec!(50)));
    let result = fd.use_excise_schedule();
    println!(
        "ait {} excise {} penalty {} -> net {}",
        result.ait.whole_units(),
        result.excise,
        result.penalty.whole_units(),
        result.net_maturity.whole_units()
    );

    for event in fd.take_events() {
        println!("{:?}", event);
    }

    Ok(())
}
