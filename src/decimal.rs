use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::MathematicalOps;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::str::FromStr;

/// internal storage precision for money values
pub const MONEY_DP: u32 = 8;

/// Money type in a single currency unit, 8 decimal places of internal precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const ONE: Money = Money(Decimal::ONE);

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(d.round_dp(MONEY_DP))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money(Decimal::from_str(s)?.round_dp(MONEY_DP)))
    }

    /// create from whole currency units
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from minor units (e.g. paisa, cents).
    ///
    /// scales past decimal's 28 digit limit are far below storage precision
    /// and round to zero
    pub fn from_minor(amount: i64, scale: u32) -> Self {
        Decimal::try_new(amount, scale)
            .map(Money::from_decimal)
            .unwrap_or(Money::ZERO)
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// round to specified decimal places
    pub fn round_dp(&self, dp: u32) -> Self {
        Money(self.0.round_dp(dp))
    }

    /// round to whole currency units for display
    pub fn whole_units(&self) -> Self {
        self.round_dp(0)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// strictly less than zero
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    pub fn min(self, other: Self) -> Self {
        Money(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Money(self.0.max(other.0))
    }

    /// clamp negative values to zero
    pub fn floor_zero(self) -> Self {
        self.max(Money::ZERO)
    }

    /// calculate percentage (e.g., 10% of 10,000)
    pub fn percentage(&self, pct: Decimal) -> Self {
        Money((self.0 * pct / Decimal::from(100)).round_dp(MONEY_DP))
    }

    /// percentage that reports overflow instead of panicking
    pub fn checked_percentage(&self, pct: Decimal) -> Option<Self> {
        let fraction = pct.checked_div(Decimal::ONE_HUNDRED)?;
        self.0.checked_mul(fraction).map(Money::from_decimal)
    }

    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// percentage clamped to the representable range
    pub fn saturating_percentage(&self, pct: Decimal) -> Self {
        Money::from_decimal(self.0.saturating_mul(pct / Decimal::ONE_HUNDRED))
    }

    pub fn saturating_add(self, other: Money) -> Self {
        Money(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Money) -> Self {
        Money(self.0.saturating_sub(other.0))
    }

    /// multiply by a growth factor, None on overflow
    pub fn checked_scale(&self, factor: Decimal) -> Option<Self> {
        self.0.checked_mul(factor).map(Money::from_decimal)
    }

    /// divide by a growth factor, None on overflow or zero factor
    pub fn checked_discount(&self, factor: Decimal) -> Option<Self> {
        self.0.checked_div(factor).map(Money::from_decimal)
    }

    /// absolute difference, handy for tolerance checks
    pub fn distance(&self, other: Money) -> Money {
        (*self - other).abs()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl From<i32> for Money {
    fn from(i: i32) -> Self {
        Money::from_major(i as i64)
    }
}

impl From<u32> for Money {
    fn from(i: u32) -> Self {
        Money::from_major(i as i64)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money((self.0 + other.0).round_dp(MONEY_DP))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        self.0 = (self.0 + other.0).round_dp(MONEY_DP);
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money((self.0 - other.0).round_dp(MONEY_DP))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        self.0 = (self.0 - other.0).round_dp(MONEY_DP);
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money((self.0 * other).round_dp(MONEY_DP))
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money((self.0 / other).round_dp(MONEY_DP))
    }
}

/// annual interest rate stored as a fraction (0.10 == 10%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);
    pub const ONE: Rate = Rate(Decimal::ONE);

    /// create from decimal (e.g., 0.095 for 9.5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from percentage (e.g., 10 or dec!(9.75))
    pub fn from_percentage(p: impl Into<Decimal>) -> Self {
        Rate(p.into() / Decimal::from(100))
    }

    /// create from basis points (e.g., 975 for 9.75%)
    pub fn from_bps(bps: u32) -> Self {
        Rate(Decimal::from(bps) / Decimal::from(10000))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }

    pub fn as_bps(&self) -> Decimal {
        self.0 * Decimal::from(10000)
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// rate for one of `periods_per_year` equal periods
    pub fn periodic_rate(&self, periods_per_year: u32) -> Decimal {
        self.0 / Decimal::from(periods_per_year)
    }

    /// monthly rate from annual rate
    pub fn monthly_rate(&self) -> Rate {
        Rate(self.periodic_rate(12))
    }

    pub fn min(self, other: Self) -> Self {
        Rate(self.0.min(other.0))
    }

    pub fn max(self, other: Self) -> Self {
        Rate(self.0.max(other.0))
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}

/// `(1 + i)^n` for a possibly fractional exponent, None on overflow.
///
/// integral exponents use exact repeated multiplication; fractional ones go
/// through `powd`. a per-period loss beyond 100% leaves a negative base with
/// no meaningful growth, so that is None too
pub fn growth_factor(periodic_rate: Decimal, periods: Decimal) -> Option<Decimal> {
    let base = Decimal::ONE.checked_add(periodic_rate)?;
    if base.is_sign_negative() && !base.is_zero() {
        return None;
    }
    if periods.is_zero() {
        return Some(Decimal::ONE);
    }
    if periods.fract().is_zero() && periods.is_sign_positive() {
        base.checked_powu(periods.to_u64()?)
    } else {
        base.checked_powd(periods)
    }
}
