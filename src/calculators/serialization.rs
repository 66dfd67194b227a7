/// serialization support for calculator sessions
use serde::{Deserialize, Serialize};

use crate::calculators::dps::{DpsCalculator, DpsSummary};
use crate::calculators::fixed_deposit::{FdSummary, FixedDepositCalculator};
use crate::decimal::Money;
use crate::types::{DpsField, FdField, ProductKind, SessionId};

/// whole-unit figures for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayView {
    pub input: Money,
    pub maturity: Money,
    pub gross_interest: Money,
    pub total_deduction: Money,
    pub net_maturity: Money,
    pub net_interest: Money,
}

impl DisplayView {
    fn new(
        input: Money,
        maturity: Money,
        gross_interest: Money,
        total_deduction: Money,
        net_maturity: Money,
        net_interest: Money,
    ) -> Self {
        Self {
            input: input.whole_units(),
            maturity: maturity.whole_units(),
            gross_interest: gross_interest.whole_units(),
            total_deduction: total_deduction.whole_units(),
            net_maturity: net_maturity.whole_units(),
            net_interest: net_interest.whole_units(),
        }
    }
}

/// serializable view of a fixed deposit session
#[derive(Debug, Serialize, Deserialize)]
pub struct FdView {
    pub id: SessionId,
    pub product: ProductKind,
    pub edited: FdField,
    pub summary: FdSummary,
    pub display: DisplayView,
    pub events_recorded: usize,
}

impl FdView {
    pub fn from_calculator(calculator: &FixedDepositCalculator) -> Self {
        let summary = calculator.summary();
        let display = DisplayView::new(
            summary.principal,
            summary.maturity,
            summary.gross_interest,
            summary.deductions.total_deduction,
            summary.deductions.net_maturity,
            summary.deductions.net_interest,
        );
        FdView {
            id: calculator.id(),
            product: ProductKind::FixedDeposit,
            edited: calculator.state().edited,
            summary,
            display,
            events_recorded: calculator.events().len(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// serializable view of a DPS session
#[derive(Debug, Serialize, Deserialize)]
pub struct DpsView {
    pub id: SessionId,
    pub product: ProductKind,
    pub edited: DpsField,
    pub summary: DpsSummary,
    pub display: DisplayView,
    pub events_recorded: usize,
}

impl DpsView {
    pub fn from_calculator(calculator: &DpsCalculator) -> Self {
        let summary = calculator.summary();
        let display = DisplayView::new(
            summary.monthly_deposit,
            summary.target_maturity,
            summary.gross_interest,
            summary.deductions.total_deduction,
            summary.deductions.net_maturity,
            summary.deductions.net_interest,
        );
        DpsView {
            id: calculator.id(),
            product: ProductKind::Dps,
            edited: calculator.state().edited,
            summary,
            display,
            events_recorded: calculator.events().len(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::interest::CompoundingFrequency;

    #[test]
    fn test_fd_view_rounds_display() {
        let calc = FixedDepositCalculator::builder()
            .principal(Money::from_major(200_000))
            .tenure_months(12)
            .rate(Rate::from_percentage(10))
            .compounding(CompoundingFrequency::Quarterly)
            .build()
            .unwrap();

        let view = calc.view();
        assert_eq!(view.display.maturity, Money::from_major(220_763));
        assert_eq!(view.display.gross_interest, Money::from_major(20_763));
        assert_eq!(view.edited, FdField::Principal);

        let json = calc.json();
        assert!(json.contains("\"edited\": \"principal\""));
        assert!(json.contains("\"product\": \"FixedDeposit\""));
    }

    #[test]
    fn test_dps_view_json_parses() {
        let calc = DpsCalculator::builder()
            .target(Money::from_major(500_000))
            .tenure_months(24)
            .build()
            .unwrap();

        let json = calc.json();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["edited"], "target");
        assert_eq!(value["summary"]["timing"], "end");
    }
}
