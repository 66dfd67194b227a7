/// json state - configuration and session views as json
use savings_calculator_rs::{CalculatorConfig, DpsCalculator, FixedDepositCalculator, Money};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== configuration ===\n");

    let config = CalculatorConfig::retail(Money::from_major(150));
    let json = config.to_json_pretty()?;
    println!("{}\n", json);

    // round trip through json, as a service would load it
    let loaded = CalculatorConfig::from_json_str(&json)?;

    println!("=== fixed deposit session ===\n");
    let fd = FixedDepositCalculator::builder()
        .config(loaded.clone())
        .maturity(Money::from_major(1_000_000))
        .tenure_months(36)
        .build()?;
    println!("{}\n", fd.json());

    println!("=== dps session ===\n");
    let dps = DpsCalculator::builder()
        .config(loaded)
        .monthly_deposit(Money::from_major(5_000))
        .tenure_months(60)
        .build()?;
    println!("{}", dps.json());

    Ok(())
}
