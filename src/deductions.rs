use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{CalculatorError, Result};

/// toggleable deductions applied at maturity; everything off by default
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeductionConfig {
    /// advance income tax withheld on gross interest
    pub ait_enabled: bool,
    pub ait_rate_pct: Decimal,
    /// flat duty on the account balance
    pub excise_enabled: bool,
    pub excise_flat_amount: Money,
    /// early-exit penalty charged on gross interest
    pub penalty_enabled: bool,
    pub penalty_rate_pct: Decimal,
}

impl DeductionConfig {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with_ait(mut self, rate_pct: Decimal) -> Self {
        self.ait_enabled = true;
        self.ait_rate_pct = rate_pct;
        self
    }

    pub fn with_excise(mut self, flat_amount: Money) -> Self {
        self.excise_enabled = true;
        self.excise_flat_amount = flat_amount;
        self
    }

    /// flat duty picked from a band schedule for the given balance
    pub fn with_excise_for(self, balance: Money, schedule: &ExciseSchedule) -> Self {
        self.with_excise(schedule.duty_for(balance))
    }

    pub fn with_penalty(mut self, rate_pct: Decimal) -> Self {
        self.penalty_enabled = true;
        self.penalty_rate_pct = rate_pct;
        self
    }

    pub fn without_penalty(mut self) -> Self {
        self.penalty_enabled = false;
        self
    }

    pub fn any_enabled(&self) -> bool {
        self.ait_enabled || self.excise_enabled || self.penalty_enabled
    }
}

/// itemized deductions and the resulting net figures
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DeductionResult {
    pub ait: Money,
    pub excise: Money,
    pub penalty: Money,
    pub total_deduction: Money,
    pub net_maturity: Money,
    pub net_interest: Money,
}

/// stack the enabled deductions on a gross maturity.
///
/// negative totals and nets are clamped to zero, never propagated
pub fn apply_deductions(
    gross_maturity: Money,
    cost_basis: Money,
    gross_interest: Money,
    config: &DeductionConfig,
) -> DeductionResult {
    let ait = charge_on_interest(config.ait_enabled, gross_interest, config.ait_rate_pct);
    let excise = if config.excise_enabled {
        config.excise_flat_amount
    } else {
        Money::ZERO
    };
    let penalty = charge_on_interest(config.penalty_enabled, gross_interest, config.penalty_rate_pct);

    let total_deduction = ait.saturating_add(excise).saturating_add(penalty).floor_zero();
    let net_maturity = gross_maturity.saturating_sub(total_deduction).floor_zero();
    let net_interest = net_maturity.saturating_sub(cost_basis).floor_zero();

    DeductionResult {
        ait,
        excise,
        penalty,
        total_deduction,
        net_maturity,
        net_interest,
    }
}

fn charge_on_interest(enabled: bool, gross_interest: Money, rate_pct: Decimal) -> Money {
    if !enabled {
        return Money::ZERO;
    }
    gross_interest.checked_percentage(rate_pct).unwrap_or_else(|| {
        warn!("{}% of {} overflows, charge clamped", rate_pct, gross_interest);
        gross_interest.saturating_percentage(rate_pct)
    })
}

/// balance band for the flat duty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExciseBand {
    /// inclusive upper bound, None for the top band
    pub up_to: Option<Money>,
    pub duty: Money,
}

/// flat duty by balance band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExciseSchedule {
    pub bands: Vec<ExciseBand>,
}

impl Default for ExciseSchedule {
    fn default() -> Self {
        Self::standard()
    }
}

impl ExciseSchedule {
    pub fn new(bands: Vec<ExciseBand>) -> Result<Self> {
        let schedule = Self { bands };
        schedule.validate()?;
        Ok(schedule)
    }

    pub fn standard() -> Self {
        let band = |up_to: Option<Decimal>, duty: Decimal| ExciseBand {
            up_to: up_to.map(Money::from_decimal),
            duty: Money::from_decimal(duty),
        };
        Self {
            bands: vec![
                band(Some(dec!(100000)), dec!(0)),
                band(Some(dec!(500000)), dec!(150)),
                band(Some(dec!(1000000)), dec!(500)),
                band(Some(dec!(10000000)), dec!(3000)),
                band(Some(dec!(50000000)), dec!(15000)),
                band(None, dec!(40000)),
            ],
        }
    }

    pub fn validate(&self) -> Result<()> {
        let Some(last) = self.bands.last() else {
            return Err(CalculatorError::InvalidExciseSchedule {
                message: "no bands".to_string(),
            });
        };
        if last.up_to.is_some() {
            return Err(CalculatorError::InvalidExciseSchedule {
                message: "last band must be open-ended".to_string(),
            });
        }
        for band in &self.bands {
            if band.duty.is_negative() {
                return Err(CalculatorError::InvalidExciseSchedule {
                    message: format!("negative duty {}", band.duty),
                });
            }
        }
        for pair in self.bands.windows(2) {
            match (pair[0].up_to, pair[1].up_to) {
                (Some(a), Some(b)) if a >= b => {
                    return Err(CalculatorError::InvalidExciseSchedule {
                        message: format!("band bounds not ascending: {} then {}", a, b),
                    });
                }
                (None, _) => {
                    return Err(CalculatorError::InvalidExciseSchedule {
                        message: "only the last band may be open-ended".to_string(),
                    });
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// duty for a balance; non-positive balances owe nothing
    pub fn duty_for(&self, balance: Money) -> Money {
        if !balance.is_positive() {
            return Money::ZERO;
        }
        self.bands
            .iter()
            .find(|band| band.up_to.map_or(true, |limit| balance <= limit))
            .map(|band| band.duty)
            .unwrap_or(Money::ZERO)
    }
}
