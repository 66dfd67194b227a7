use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{growth_factor, Money, Rate};
use crate::interest::MaturityEngine;

/// when each monthly deposit lands in the period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DepositTiming {
    /// start of month (annuity-due)
    Begin,
    /// end of month (ordinary annuity)
    #[default]
    End,
}

/// `F * adj` where `F = ((1+i)^n - 1) / i` and adj is `1+i` for annuity-due.
///
/// None for zero rate (handled linearly by callers) or overflow
fn annuity_factor(annual_rate: Rate, months: Decimal, timing: DepositTiming) -> Option<Decimal> {
    let i = annual_rate.periodic_rate(12);
    if i.is_zero() {
        return None;
    }
    let factor = growth_factor(i, months)
        .and_then(|g| (g - Decimal::ONE).checked_div(i))
        .and_then(|f| match timing {
            DepositTiming::Begin => f.checked_mul(Decimal::ONE + i),
            DepositTiming::End => Some(f),
        });
    if factor.is_none() {
        warn!(
            "annuity factor overflows or is undefined: rate {} over {} months, {:?}",
            annual_rate, months, timing
        );
    }
    factor
}

/// accumulated value of `monthly_deposit` paid every month for `months`.
///
/// zero rate degenerates to `deposit * months`
pub fn dps_maturity(
    monthly_deposit: Money,
    annual_rate: Rate,
    months: Decimal,
    timing: DepositTiming,
) -> Money {
    if !monthly_deposit.is_positive() || months <= Decimal::ZERO {
        return Money::ZERO;
    }
    if annual_rate.is_zero() {
        return monthly_deposit.checked_scale(months).unwrap_or(Money::ZERO);
    }
    annuity_factor(annual_rate, months, timing)
        .and_then(|factor| monthly_deposit.checked_scale(factor))
        .unwrap_or(Money::ZERO)
}

/// monthly deposit needed to accumulate `target_maturity`
pub fn dps_backsolve_monthly(
    target_maturity: Money,
    annual_rate: Rate,
    months: Decimal,
    timing: DepositTiming,
) -> Money {
    if !target_maturity.is_positive() || months <= Decimal::ZERO {
        return Money::ZERO;
    }
    if annual_rate.is_zero() {
        return target_maturity.checked_discount(months).unwrap_or(Money::ZERO);
    }
    annuity_factor(annual_rate, months, timing)
        .filter(|factor| !factor.is_zero())
        .and_then(|factor| target_maturity.checked_discount(factor))
        .unwrap_or(Money::ZERO)
}

/// sum of all deposits over the tenure
pub fn total_deposits(monthly_deposit: Money, months: Decimal) -> Money {
    if !monthly_deposit.is_positive() || months <= Decimal::ZERO {
        return Money::ZERO;
    }
    monthly_deposit.checked_scale(months).unwrap_or(Money::ZERO)
}

/// one month of a DPS accumulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationRow {
    pub month: u32,
    pub opening_balance: Money,
    pub deposit: Money,
    pub interest_credited: Money,
    pub closing_balance: Money,
    pub cumulative_deposits: Money,
    pub cumulative_interest: Money,
}

/// month-by-month balance projection for a DPS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationSchedule {
    pub monthly_deposit: Money,
    pub annual_rate: Rate,
    pub months: u32,
    pub timing: DepositTiming,
    pub rows: Vec<AccumulationRow>,
    pub total_deposits: Money,
    pub total_interest: Money,
    pub final_balance: Money,
}

/// rows reserved up front; longer schedules grow as they go
const PREALLOCATED_MONTHS: u32 = 600;

impl AccumulationSchedule {
    /// project balances; interest is credited monthly at `rate / 12`.
    ///
    /// a projection whose balance would overflow comes back empty with zero
    /// totals, matching `dps_maturity`
    pub fn generate(
        monthly_deposit: Money,
        annual_rate: Rate,
        months: u32,
        timing: DepositTiming,
    ) -> Self {
        let deposit = monthly_deposit.floor_zero();
        let closed_form = dps_maturity(deposit, annual_rate, Decimal::from(months), timing);
        let rows = if deposit.is_positive() && months > 0 && closed_form.is_zero() {
            None
        } else {
            project(deposit, annual_rate.periodic_rate(12), months, timing)
        };
        let rows = rows.unwrap_or_else(|| {
            warn!(
                "accumulation overflow: {} monthly at {} over {} months, schedule left empty",
                deposit, annual_rate, months
            );
            Vec::new()
        });

        let (total_deposits, total_interest, final_balance) = rows
            .last()
            .map(|row| (row.cumulative_deposits, row.cumulative_interest, row.closing_balance))
            .unwrap_or((Money::ZERO, Money::ZERO, Money::ZERO));

        Self {
            monthly_deposit: deposit,
            annual_rate,
            months,
            timing,
            rows,
            total_deposits,
            total_interest,
            final_balance,
        }
    }

    /// get row for specific month (1-based)
    pub fn get_month(&self, month: u32) -> Option<&AccumulationRow> {
        month.checked_sub(1).and_then(|idx| self.rows.get(idx as usize))
    }
}

fn project(deposit: Money, monthly_rate: Decimal, months: u32, timing: DepositTiming) -> Option<Vec<AccumulationRow>> {
    let mut rows = Vec::with_capacity(months.min(PREALLOCATED_MONTHS) as usize);
    let mut balance = Money::ZERO;
    let mut cumulative_deposits = Money::ZERO;
    let mut cumulative_interest = Money::ZERO;

    for month in 1..=months {
        let opening_balance = balance;
        let accruing = match timing {
            DepositTiming::Begin => opening_balance.checked_add(deposit)?,
            DepositTiming::End => opening_balance,
        };
        let interest_credited = accruing.checked_scale(monthly_rate)?;
        balance = opening_balance
            .checked_add(deposit)?
            .checked_add(interest_credited)?;
        cumulative_deposits = cumulative_deposits.checked_add(deposit)?;
        cumulative_interest = cumulative_interest.checked_add(interest_credited)?;

        rows.push(AccumulationRow {
            month,
            opening_balance,
            deposit,
            interest_credited,
            closing_balance: balance,
            cumulative_deposits,
            cumulative_interest,
        });
    }
    Some(rows)
}

/// engine for recurring deposit accumulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnnuityEngine {
    pub timing: DepositTiming,
}

impl AnnuityEngine {
    pub fn new(timing: DepositTiming) -> Self {
        Self { timing }
    }

    pub fn schedule(&self, monthly_deposit: Money, annual_rate: Rate, months: u32) -> AccumulationSchedule {
        AccumulationSchedule::generate(monthly_deposit, annual_rate, months, self.timing)
    }
}

impl MaturityEngine for AnnuityEngine {
    fn maturity(&self, monthly_deposit: Money, annual_rate: Rate, months: Decimal) -> Money {
        dps_maturity(monthly_deposit, annual_rate, months, self.timing)
    }

    fn backsolve(&self, target: Money, annual_rate: Rate, months: Decimal) -> Money {
        dps_backsolve_monthly(target, annual_rate, months, self.timing)
    }

    fn cost_basis(&self, monthly_deposit: Money, months: Decimal) -> Money {
        total_deposits(monthly_deposit, months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const TIMINGS: [DepositTiming; 2] = [DepositTiming::Begin, DepositTiming::End];

    #[test]
    fn test_end_of_month_eighteen_months() {
        let maturity = dps_maturity(
            Money::from_major(10_000),
            Rate::from_percentage(10),
            dec!(18),
            DepositTiming::End,
        );
        // F ~= 19.3335
        assert_eq!(maturity.round_dp(2), Money::from_str_exact("193334.80").unwrap());
    }

    #[test]
    fn test_begin_adds_one_period_of_interest() {
        let end = dps_maturity(Money::from_major(10_000), Rate::from_percentage(10), dec!(18), DepositTiming::End);
        let begin = dps_maturity(Money::from_major(10_000), Rate::from_percentage(10), dec!(18), DepositTiming::Begin);
        assert_eq!(begin.round_dp(2), Money::from_str_exact("194945.92").unwrap());
        assert!(begin > end);
    }

    #[test]
    fn test_zero_rate_is_linear() {
        for timing in TIMINGS {
            let maturity = dps_maturity(Money::from_major(10_000), Rate::ZERO, dec!(18), timing);
            assert_eq!(maturity, Money::from_major(180_000));

            let monthly = dps_backsolve_monthly(Money::from_major(180_000), Rate::ZERO, dec!(18), timing);
            assert_eq!(monthly, Money::from_major(10_000));
        }
        let odd = dps_maturity(Money::from_str_exact("1234.56").unwrap(), Rate::ZERO, dec!(7), DepositTiming::End);
        assert_eq!(odd, Money::from_str_exact("8641.92").unwrap());
    }

    #[test]
    fn test_guards_return_zero() {
        let rate = Rate::from_percentage(9);
        for timing in TIMINGS {
            assert_eq!(dps_maturity(Money::ZERO, rate, dec!(12), timing), Money::ZERO);
            assert_eq!(dps_maturity(Money::from_major(-100), rate, dec!(12), timing), Money::ZERO);
            assert_eq!(dps_maturity(Money::from_major(100), rate, Decimal::ZERO, timing), Money::ZERO);
            assert_eq!(dps_backsolve_monthly(Money::ZERO, rate, dec!(12), timing), Money::ZERO);
            assert_eq!(dps_backsolve_monthly(Money::from_major(100), rate, dec!(-1), timing), Money::ZERO);
            assert_eq!(dps_backsolve_monthly(Money::from_major(100), Rate::ZERO, Decimal::ZERO, timing), Money::ZERO);
        }
    }

    #[test]
    fn test_round_trip_grid() {
        let deposits = [dec!(1), dec!(500), dec!(10000), dec!(2500000.55)];
        let rates = [dec!(0), dec!(1), dec!(8.5), dec!(10.25), dec!(15)];
        let tenures = [dec!(6), dec!(18), dec!(36)];

        for d in deposits {
            let deposit = Money::from_decimal(d);
            for r in rates {
                let rate = Rate::from_percentage(r);
                for m in tenures {
                    for timing in TIMINGS {
                        let maturity = dps_maturity(deposit, rate, m, timing);
                        let back = dps_backsolve_monthly(maturity, rate, m, timing);
                        assert!(
                            back.distance(deposit) < Money::ONE,
                            "D={} r={} m={} {:?}: got {}",
                            deposit, rate, m, timing, back
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_total_deposits() {
        assert_eq!(total_deposits(Money::from_major(5_000), dec!(24)), Money::from_major(120_000));
        assert_eq!(total_deposits(Money::ZERO, dec!(24)), Money::ZERO);
    }

    #[test]
    fn test_schedule_matches_closed_form() {
        let deposit = Money::from_major(10_000);
        let rate = Rate::from_percentage(10);
        for timing in TIMINGS {
            let schedule = AccumulationSchedule::generate(deposit, rate, 18, timing);
            let closed = dps_maturity(deposit, rate, dec!(18), timing);

            assert_eq!(schedule.rows.len(), 18);
            assert_eq!(schedule.total_deposits, Money::from_major(180_000));
            assert!(schedule.final_balance.distance(closed) < Money::ONE);
            assert_eq!(
                schedule.final_balance,
                schedule.total_deposits + schedule.total_interest
            );
        }
    }

    #[test]
    fn test_schedule_first_month() {
        let engine = AnnuityEngine::new(DepositTiming::End);
        let schedule = engine.schedule(Money::from_major(1_000), Rate::from_percentage(12), 3);

        let first = schedule.get_month(1).unwrap();
        assert_eq!(first.interest_credited, Money::ZERO);
        assert_eq!(first.closing_balance, Money::from_major(1_000));

        let second = schedule.get_month(2).unwrap();
        assert_eq!(second.interest_credited, Money::from_major(10));
        assert_eq!(second.closing_balance, Money::from_major(2_010));

        assert!(schedule.get_month(0).is_none());
        assert!(schedule.get_month(4).is_none());

        let due = AnnuityEngine::new(DepositTiming::Begin).schedule(Money::from_major(1_000), Rate::from_percentage(12), 1);
        assert_eq!(due.final_balance, Money::from_major(1_010));
    }

    #[test]
    fn test_overflow_degrades_to_zero() {
        let deposit = Money::from_major(10_000);
        let rate = Rate::from_percentage(10);
        for timing in TIMINGS {
            assert_eq!(dps_maturity(deposit, rate, dec!(100000000), timing), Money::ZERO);
            assert_eq!(dps_maturity(deposit, rate, dec!(7200), timing), Money::ZERO);
            assert_eq!(dps_backsolve_monthly(deposit, rate, dec!(100000000), timing), Money::ZERO);
        }
    }

    #[test]
    fn test_overflowing_schedule_is_empty() {
        for timing in TIMINGS {
            let schedule = AccumulationSchedule::generate(Money::from_major(10_000), Rate::from_percentage(10), 7200, timing);
            assert!(schedule.rows.is_empty());
            assert_eq!(schedule.months, 7200);
            assert_eq!(schedule.total_deposits, Money::ZERO);
            assert_eq!(schedule.total_interest, Money::ZERO);
            assert_eq!(schedule.final_balance, Money::ZERO);
            assert!(schedule.get_month(1).is_none());
        }
    }

    #[test]
    fn test_long_schedule_past_preallocation() {
        let deposit = Money::from_major(100);
        let schedule = AccumulationSchedule::generate(deposit, Rate::from_percentage(1), 1200, DepositTiming::End);
        let closed = dps_maturity(deposit, Rate::from_percentage(1), dec!(1200), DepositTiming::End);

        assert_eq!(schedule.rows.len(), 1200);
        assert_eq!(schedule.total_deposits, Money::from_major(120_000));
        assert!(schedule.final_balance.distance(closed) < Money::ONE);
    }

    #[test]
    fn test_engine_cost_basis() {
        let engine = AnnuityEngine::new(DepositTiming::Begin);
        assert_eq!(engine.cost_basis(Money::from_major(2_000), dec!(12)), Money::from_major(24_000));
    }

    #[test]
    fn test_timing_serde_names() {
        assert_eq!(serde_json::to_string(&DepositTiming::Begin).unwrap(), "\"begin\"");
        let parsed: DepositTiming = serde_json::from_str("\"end\"").unwrap();
        assert_eq!(parsed, DepositTiming::End);
    }
}
