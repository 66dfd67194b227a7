/// quick start - minimal example to get started
use rust_decimal_macros::dec;
use savings_calculator_rs::{fd_maturity, resolve_bucket, CompoundingFrequency, Money, Rate};

fn main() {
    // 200,000 for 12 months, quarterly compounding
    let range = resolve_bucket(dec!(12));
    println!("allowed rate for 12 months: {} - {} (default {})", range.lo, range.hi, range.midpoint);

    let maturity = fd_maturity(
        Money::from_major(200_000),
        Rate::from_percentage(10),
        dec!(12),
        CompoundingFrequency::Quarterly,
    );
    println!("maturity: {}", maturity.whole_units());
}
