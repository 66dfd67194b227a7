use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::deductions::{DeductionConfig, ExciseSchedule};
use crate::errors::{CalculatorError, Result};
use crate::interest::{CompoundingFrequency, DepositTiming};
use crate::rates::RateTable;

/// calculator configuration shared by sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorConfig {
    #[serde(default)]
    pub rate_table: RateTable,
    #[serde(default)]
    pub deductions: DeductionConfig,
    #[serde(default)]
    pub compounding: CompoundingFrequency,
    #[serde(default)]
    pub timing: DepositTiming,
    #[serde(default)]
    pub excise_schedule: ExciseSchedule,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            rate_table: RateTable::standard(),
            deductions: DeductionConfig::none(),
            compounding: CompoundingFrequency::Quarterly,
            timing: DepositTiming::End,
            excise_schedule: ExciseSchedule::standard(),
        }
    }
}

impl CalculatorConfig {
    /// no deductions, standard rate table
    pub fn gross() -> Self {
        Self::default()
    }

    /// 10% tax withheld on interest plus a flat duty
    pub fn retail(excise: Money) -> Self {
        Self {
            deductions: DeductionConfig::none().with_ait(dec!(10)).with_excise(excise),
            ..Self::default()
        }
    }

    /// retail deductions plus an early-exit penalty on interest
    pub fn premature_closure(excise: Money, penalty_pct: rust_decimal::Decimal) -> Self {
        let mut config = Self::retail(excise);
        config.deductions = config.deductions.with_penalty(penalty_pct);
        config
    }

    pub fn validate(&self) -> Result<()> {
        self.rate_table.validate()?;
        self.excise_schedule.validate()?;

        let d = &self.deductions;
        if d.ait_rate_pct.is_sign_negative() || d.ait_rate_pct > dec!(100) {
            return Err(CalculatorError::InvalidConfiguration {
                message: format!("ait rate {}% outside [0, 100]", d.ait_rate_pct),
            });
        }
        if d.penalty_rate_pct.is_sign_negative() || d.penalty_rate_pct > dec!(100) {
            return Err(CalculatorError::InvalidConfiguration {
                message: format!("penalty rate {}% outside [0, 100]", d.penalty_rate_pct),
            });
        }
        if d.excise_flat_amount.is_negative() {
            return Err(CalculatorError::InvalidConfiguration {
                message: format!("negative excise amount {}", d.excise_flat_amount),
            });
        }
        Ok(())
    }

    /// parse and validate a json configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;

    #[test]
    fn test_default_is_valid() {
        let config = CalculatorConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.deductions.any_enabled());
        assert_eq!(config.compounding, CompoundingFrequency::Quarterly);
        assert_eq!(config.timing, DepositTiming::End);
    }

    #[test]
    fn test_presets() {
        let retail = CalculatorConfig::retail(Money::from_major(150));
        assert!(retail.deductions.ait_enabled);
        assert_eq!(retail.deductions.ait_rate_pct, dec!(10));
        assert_eq!(retail.deductions.excise_flat_amount, Money::from_major(150));
        assert!(!retail.deductions.penalty_enabled);

        let early = CalculatorConfig::premature_closure(Money::from_major(150), dec!(50));
        assert!(early.deductions.penalty_enabled);
        assert!(early.validate().is_ok());
    }

    #[test]
    fn test_json_round_trip() {
        let config = CalculatorConfig::retail(Money::from_major(115));
        let json = config.to_json_pretty().unwrap();
        let parsed = CalculatorConfig::from_json_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "compounding": "Monthly", "timing": "begin" }"#;
        let config = CalculatorConfig::from_json_str(json).unwrap();
        assert_eq!(config.compounding, CompoundingFrequency::Monthly);
        assert_eq!(config.timing, DepositTiming::Begin);
        assert_eq!(config.rate_table, RateTable::standard());
        assert_eq!(
            config.rate_table.resolve_bucket(rust_decimal::Decimal::from(12)).hi,
            Rate::from_percentage(dec!(10.25))
        );
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut config = CalculatorConfig::default();
        config.deductions = DeductionConfig::none().with_ait(dec!(120));
        assert!(matches!(
            config.validate(),
            Err(CalculatorError::InvalidConfiguration { .. })
        ));

        assert!(matches!(
            CalculatorConfig::from_json_str("{ not json"),
            Err(CalculatorError::Parse(_))
        ));
    }
}
