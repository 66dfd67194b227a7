use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{growth_factor, Money, Rate};
use crate::errors::{CalculatorError, Result};
use crate::interest::MaturityEngine;

/// compounding frequency for fixed deposits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CompoundingFrequency {
    Annual,
    SemiAnnual,
    #[default]
    Quarterly,
    Monthly,
}

impl CompoundingFrequency {
    /// get number of compounding periods per year
    pub fn periods_per_year(&self) -> u32 {
        match self {
            CompoundingFrequency::Annual => 1,
            CompoundingFrequency::SemiAnnual => 2,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Monthly => 12,
        }
    }

    /// parse a raw periods-per-year value (1, 2, 4 or 12)
    pub fn from_periods(periods: u32) -> Result<Self> {
        match periods {
            1 => Ok(CompoundingFrequency::Annual),
            2 => Ok(CompoundingFrequency::SemiAnnual),
            4 => Ok(CompoundingFrequency::Quarterly),
            12 => Ok(CompoundingFrequency::Monthly),
            _ => Err(CalculatorError::UnsupportedCompounding { periods }),
        }
    }

    pub fn all() -> [CompoundingFrequency; 4] {
        [
            CompoundingFrequency::Annual,
            CompoundingFrequency::SemiAnnual,
            CompoundingFrequency::Quarterly,
            CompoundingFrequency::Monthly,
        ]
    }
}

/// `(1 + r/c)^(c * months / 12)`, None when the inputs are degenerate or overflow.
///
/// a period rate below -100% has no real growth factor and is treated the same way
fn fd_factor(annual_rate: Rate, months: Decimal, frequency: CompoundingFrequency) -> Option<Decimal> {
    if months <= Decimal::ZERO {
        return None;
    }
    let periods_per_year = frequency.periods_per_year();
    let period_rate = annual_rate.periodic_rate(periods_per_year);
    let periods = Decimal::from(periods_per_year).checked_mul(months)? / dec!(12);

    let factor = growth_factor(period_rate, periods);
    if factor.is_none() {
        warn!(
            "compound factor overflows or is undefined: rate {} over {} months, {:?}",
            annual_rate, months, frequency
        );
    }
    factor
}

/// maturity of a lump sum: `principal * (1 + i)^n`.
///
/// non-positive principal or tenure yields zero
pub fn fd_maturity(
    principal: Money,
    annual_rate: Rate,
    months: Decimal,
    frequency: CompoundingFrequency,
) -> Money {
    if !principal.is_positive() {
        return Money::ZERO;
    }
    fd_factor(annual_rate, months, frequency)
        .and_then(|factor| principal.checked_scale(factor))
        .unwrap_or(Money::ZERO)
}

/// principal required to reach `target_maturity`: `target / (1 + i)^n`
pub fn fd_backsolve_principal(
    target_maturity: Money,
    annual_rate: Rate,
    months: Decimal,
    frequency: CompoundingFrequency,
) -> Money {
    if !target_maturity.is_positive() {
        return Money::ZERO;
    }
    fd_factor(annual_rate, months, frequency)
        .filter(|factor| *factor > Decimal::ZERO)
        .and_then(|factor| target_maturity.checked_discount(factor))
        .unwrap_or(Money::ZERO)
}

/// effective annual yield `(1 + r/c)^c - 1`
pub fn effective_annual_yield(annual_rate: Rate, frequency: CompoundingFrequency) -> Rate {
    let periods = frequency.periods_per_year();
    growth_factor(annual_rate.periodic_rate(periods), Decimal::from(periods))
        .map(|factor| Rate::from_decimal(factor - Decimal::ONE))
        .unwrap_or(Rate::ZERO)
}

/// engine for fixed deposit compounding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompoundingEngine {
    pub frequency: CompoundingFrequency,
}

impl CompoundingEngine {
    pub fn new(frequency: CompoundingFrequency) -> Self {
        Self { frequency }
    }

    /// interest earned over the tenure
    pub fn interest(&self, principal: Money, annual_rate: Rate, months: Decimal) -> Money {
        (self.maturity(principal, annual_rate, months) - principal).floor_zero()
    }

    pub fn effective_yield(&self, annual_rate: Rate) -> Rate {
        effective_annual_yield(annual_rate, self.frequency)
    }
}

impl MaturityEngine for CompoundingEngine {
    fn maturity(&self, principal: Money, annual_rate: Rate, months: Decimal) -> Money {
        fd_maturity(principal, annual_rate, months, self.frequency)
    }

    fn backsolve(&self, target: Money, annual_rate: Rate, months: Decimal) -> Money {
        fd_backsolve_principal(target, annual_rate, months, self.frequency)
    }

    fn cost_basis(&self, principal: Money, _months: Decimal) -> Money {
        principal.floor_zero()
    }
}
