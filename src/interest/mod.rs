pub mod annuity;
pub mod compound;

use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};

pub use annuity::{
    dps_backsolve_monthly, dps_maturity, total_deposits, AccumulationRow, AccumulationSchedule,
    AnnuityEngine, DepositTiming,
};
pub use compound::{
    effective_annual_yield, fd_backsolve_principal, fd_maturity, CompoundingEngine,
    CompoundingFrequency,
};

/// a forward/inverse pair linking an input amount to a maturity amount.
///
/// implementations never fail; degenerate inputs map to zero
pub trait MaturityEngine {
    /// input amount -> maturity
    fn maturity(&self, amount: Money, annual_rate: Rate, months: Decimal) -> Money;

    /// maturity -> input amount
    fn backsolve(&self, target: Money, annual_rate: Rate, months: Decimal) -> Money;

    /// money the depositor puts in over the tenure
    fn cost_basis(&self, amount: Money, months: Decimal) -> Money;
}

/// interest earned above the cost basis, never negative
pub fn gross_interest(maturity: Money, cost_basis: Money) -> Money {
    (maturity - cost_basis).floor_zero()
}
