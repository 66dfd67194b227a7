use log::warn;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{CalculatorError, Result};

/// bucket used when a tenure falls below every bucket's minimum
pub const FALLBACK_BUCKET_INDEX: usize = 1;

/// tenure band mapped to an allowed annual rate interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateBucket {
    /// inclusive lower bound in months
    pub min_months: Decimal,
    /// exclusive upper bound in months, None for open-ended
    pub max_months: Option<Decimal>,
    pub lo: Rate,
    pub hi: Rate,
}

impl RateBucket {
    pub fn new(min_months: Decimal, max_months: Option<Decimal>, lo: Rate, hi: Rate) -> Self {
        Self {
            min_months,
            max_months,
            lo,
            hi,
        }
    }

    /// inclusive-exclusive membership test
    pub fn contains(&self, months: Decimal) -> bool {
        months >= self.min_months && self.max_months.map_or(true, |max| months < max)
    }

    pub fn range(&self) -> RateRange {
        RateRange::new(self.lo, self.hi)
    }
}

/// allowed annual rate interval for a tenure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateRange {
    pub lo: Rate,
    pub hi: Rate,
    pub midpoint: Rate,
}

/// where a requested rate sits relative to its bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RatePosition {
    /// below the offered range; allowed, never raised
    BelowRange,
    InRange,
    /// above hi; the engines use hi instead
    Capped,
}

impl RateRange {
    pub fn new(lo: Rate, hi: Rate) -> Self {
        let midpoint = Rate::from_decimal((lo.as_decimal() + hi.as_decimal()) / dec!(2));
        Self { lo, hi, midpoint }
    }

    pub fn position(&self, rate: Rate) -> RatePosition {
        if rate > self.hi {
            RatePosition::Capped
        } else if rate < self.lo {
            RatePosition::BelowRange
        } else {
            RatePosition::InRange
        }
    }

    /// cap downward only
    pub fn cap(&self, requested: Rate) -> Rate {
        requested.min(self.hi)
    }
}

/// ordered, non-overlapping tenure buckets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    pub buckets: Vec<RateBucket>,
}

impl Default for RateTable {
    fn default() -> Self {
        Self::standard()
    }
}

impl RateTable {
    /// create a table, rejecting malformed bucket layouts
    pub fn new(buckets: Vec<RateBucket>) -> Result<Self> {
        let table = Self { buckets };
        table.validate()?;
        Ok(table)
    }

    /// the five-band table: [3,6) [6,12) [12,24) [24,36) [36,inf)
    pub fn standard() -> Self {
        Self {
            buckets: vec![
                RateBucket::new(
                    dec!(3),
                    Some(dec!(6)),
                    Rate::from_percentage(dec!(9.50)),
                    Rate::from_percentage(dec!(10.25)),
                ),
                RateBucket::new(
                    dec!(6),
                    Some(dec!(12)),
                    Rate::from_percentage(dec!(9.00)),
                    Rate::from_percentage(dec!(10.25)),
                ),
                RateBucket::new(
                    dec!(12),
                    Some(dec!(24)),
                    Rate::from_percentage(dec!(9.00)),
                    Rate::from_percentage(dec!(10.25)),
                ),
                RateBucket::new(
                    dec!(24),
                    Some(dec!(36)),
                    Rate::from_percentage(dec!(8.00)),
                    Rate::from_percentage(dec!(10.00)),
                ),
                RateBucket::new(
                    dec!(36),
                    None,
                    Rate::from_percentage(dec!(7.00)),
                    Rate::from_percentage(dec!(10.00)),
                ),
            ],
        }
    }

    /// check ordering, contiguity of bounds and lo <= hi
    pub fn validate(&self) -> Result<()> {
        if self.buckets.len() <= FALLBACK_BUCKET_INDEX {
            return Err(CalculatorError::InvalidRateTable {
                message: format!(
                    "at least {} buckets required, got {}",
                    FALLBACK_BUCKET_INDEX + 1,
                    self.buckets.len()
                ),
            });
        }

        for bucket in &self.buckets {
            if bucket.lo > bucket.hi {
                return Err(CalculatorError::InvalidRateRange {
                    lo: bucket.lo,
                    hi: bucket.hi,
                });
            }
            if let Some(max) = bucket.max_months {
                if max <= bucket.min_months {
                    return Err(CalculatorError::InvalidRateTable {
                        message: format!(
                            "bucket [{}, {}) is empty",
                            bucket.min_months, max
                        ),
                    });
                }
            }
        }

        for pair in self.buckets.windows(2) {
            match pair[0].max_months {
                Some(max) if max <= pair[1].min_months => {}
                Some(max) => {
                    return Err(CalculatorError::InvalidRateTable {
                        message: format!(
                            "bucket ending at {} overlaps bucket starting at {}",
                            max, pair[1].min_months
                        ),
                    });
                }
                None => {
                    return Err(CalculatorError::InvalidRateTable {
                        message: "only the last bucket may be open-ended".to_string(),
                    });
                }
            }
        }

        Ok(())
    }

    /// bucket for a tenure; anything below the first bucket (or in a gap)
    /// reuses the [6,12) bucket instead of failing
    pub fn bucket_for(&self, months: Decimal) -> Option<&RateBucket> {
        self.buckets
            .iter()
            .find(|b| b.contains(months))
            .or_else(|| self.buckets.get(FALLBACK_BUCKET_INDEX))
    }

    pub fn resolve_bucket(&self, months: Decimal) -> RateRange {
        match self.bucket_for(months) {
            Some(bucket) => bucket.range(),
            None => {
                warn!("rate table has no usable bucket for {} months, using standard table", months);
                Self::standard().resolve_bucket(months)
            }
        }
    }

    /// effective rate: min(requested, hi); never raised toward lo
    pub fn cap_rate(&self, requested: Rate, months: Decimal) -> Rate {
        self.resolve_bucket(months).cap(requested)
    }
}

/// resolve against the standard table
pub fn resolve_bucket(months: Decimal) -> RateRange {
    RateTable::standard().resolve_bucket(months)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(p: Decimal) -> Rate {
        Rate::from_percentage(p)
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(resolve_bucket(dec!(5)).hi, pct(dec!(10.25)));
        assert_eq!(resolve_bucket(dec!(6)).hi, pct(dec!(10.25)));
        assert_eq!(resolve_bucket(dec!(24)).hi, pct(dec!(10.00)));
        assert_eq!(resolve_bucket(dec!(36)).hi, pct(dec!(10.00)));

        let r35 = resolve_bucket(dec!(35));
        assert_eq!(r35.hi, pct(dec!(10.00)));
        assert_eq!(r35.lo, pct(dec!(8.00)));

        assert_eq!(resolve_bucket(dec!(36)).lo, pct(dec!(7.00)));
        assert_eq!(resolve_bucket(dec!(5)).lo, pct(dec!(9.50)));
        assert_eq!(resolve_bucket(dec!(6)).lo, pct(dec!(9.00)));
    }

    #[test]
    fn test_fractional_months() {
        assert_eq!(resolve_bucket(dec!(5.99)).lo, pct(dec!(9.50)));
        assert_eq!(resolve_bucket(dec!(23.5)).lo, pct(dec!(9.00)));
        assert_eq!(resolve_bucket(dec!(240)).lo, pct(dec!(7.00)));
    }

    #[test]
    fn test_short_tenure_falls_back_to_six_month_bucket() {
        let six = resolve_bucket(dec!(6));
        assert_eq!(resolve_bucket(dec!(2)), six);
        assert_eq!(resolve_bucket(dec!(0.5)), six);
        assert_eq!(resolve_bucket(Decimal::ZERO), six);
    }

    #[test]
    fn test_midpoint() {
        let r = resolve_bucket(dec!(24));
        assert_eq!(r.midpoint, pct(dec!(9.00)));

        let r = resolve_bucket(dec!(3));
        assert_eq!(r.midpoint.as_percentage(), dec!(9.875));
    }

    #[test]
    fn test_cap_rate_only_lowers() {
        let table = RateTable::standard();
        assert_eq!(table.cap_rate(pct(dec!(12)), dec!(12)), pct(dec!(10.25)));
        assert_eq!(table.cap_rate(pct(dec!(12)), dec!(48)), pct(dec!(10.00)));
        // below lo stays where it is
        assert_eq!(table.cap_rate(pct(dec!(5)), dec!(12)), pct(dec!(5)));
        assert_eq!(table.cap_rate(pct(dec!(9.5)), dec!(12)), pct(dec!(9.5)));
    }

    #[test]
    fn test_rate_position() {
        let r = resolve_bucket(dec!(12));
        assert_eq!(r.position(pct(dec!(8))), RatePosition::BelowRange);
        assert_eq!(r.position(pct(dec!(9))), RatePosition::InRange);
        assert_eq!(r.position(pct(dec!(10.25))), RatePosition::InRange);
        assert_eq!(r.position(pct(dec!(10.5))), RatePosition::Capped);
    }

    #[test]
    fn test_standard_table_is_valid() {
        assert!(RateTable::standard().validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_overlap() {
        let result = RateTable::new(vec![
            RateBucket::new(dec!(3), Some(dec!(12)), pct(dec!(9)), pct(dec!(10))),
            RateBucket::new(dec!(6), None, pct(dec!(8)), pct(dec!(9))),
        ]);
        assert!(matches!(result, Err(CalculatorError::InvalidRateTable { .. })));
    }

    #[test]
    fn test_validation_rejects_inverted_range() {
        let result = RateTable::new(vec![
            RateBucket::new(dec!(3), Some(dec!(6)), pct(dec!(11)), pct(dec!(10))),
            RateBucket::new(dec!(6), None, pct(dec!(8)), pct(dec!(9))),
        ]);
        assert!(matches!(result, Err(CalculatorError::InvalidRateRange { .. })));
    }

    #[test]
    fn test_unvalidated_empty_table_uses_standard() {
        let table = RateTable { buckets: Vec::new() };
        assert_eq!(table.resolve_bucket(dec!(12)), resolve_bucket(dec!(12)));
    }

    #[test]
    fn test_validation_rejects_short_table() {
        let result = RateTable::new(vec![RateBucket::new(
            dec!(3),
            None,
            pct(dec!(9)),
            pct(dec!(10)),
        )]);
        assert!(result.is_err());
    }
}
