use log::info;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculators::serialization::DpsView;
use crate::calculators::{other_side, record_cap, record_recompute};
use crate::config::CalculatorConfig;
use crate::decimal::{Money, Rate};
use crate::deductions::{apply_deductions, DeductionConfig, DeductionResult};
use crate::errors::{CalculatorError, Result};
use crate::events::{Event, EventStore};
use crate::interest::{AccumulationSchedule, DepositTiming};
use crate::rates::{RatePosition, RateRange};
use crate::reconcile::{DpsChange, DpsState};
use crate::types::{DpsField, PairSide, ProductKind, SessionId};

/// gross and net figures for a DPS
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpsSummary {
    pub monthly_deposit: Money,
    pub target_maturity: Money,
    pub tenure_months: Decimal,
    pub requested_rate: Rate,
    pub effective_rate: Rate,
    pub rate_range: RateRange,
    pub rate_position: RatePosition,
    pub timing: DepositTiming,
    pub total_deposits: Money,
    pub gross_interest: Money,
    pub deductions: DeductionResult,
}

/// one DPS calculator session
#[derive(Debug)]
pub struct DpsCalculator {
    id: SessionId,
    config: CalculatorConfig,
    state: DpsState,
    events: EventStore,
}

impl DpsCalculator {
    pub fn new(config: CalculatorConfig, state: DpsState) -> Self {
        let id = Uuid::new_v4();
        let state = state.recompute(&config.rate_table);
        let mut events = EventStore::new();
        events.emit(Event::SessionStarted {
            session_id: id,
            product: ProductKind::Dps,
            authoritative: state.edited.into(),
        });
        record_cap(
            &mut events,
            id,
            &config.rate_table,
            None,
            state.rate,
            state.tenure_months,
        );
        info!("dps session {} started, edited={:?}", id, state.edited);

        Self {
            id,
            config,
            state,
            events,
        }
    }

    pub fn builder() -> DpsCalculatorBuilder {
        DpsCalculatorBuilder::new()
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> &DpsState {
        &self.state
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    pub fn set_monthly_deposit(&mut self, monthly: Money) -> &DpsState {
        self.apply(DpsChange::Monthly(monthly))
    }

    pub fn set_target(&mut self, target: Money) -> &DpsState {
        self.apply(DpsChange::Target(target))
    }

    pub fn set_tenure(&mut self, months: Decimal) -> &DpsState {
        self.apply(DpsChange::Tenure(months))
    }

    pub fn set_rate(&mut self, rate: Rate) -> &DpsState {
        self.apply(DpsChange::Rate(rate))
    }

    pub fn set_timing(&mut self, timing: DepositTiming) -> &DpsState {
        self.apply(DpsChange::Timing(timing))
    }

    pub fn use_default_rate(&mut self) -> &DpsState {
        let midpoint = self.rate_range().midpoint;
        self.apply(DpsChange::Rate(midpoint))
    }

    pub fn apply(&mut self, change: DpsChange) -> &DpsState {
        let before = self.state.clone();
        self.record_edit(&before, change);

        self.state = before.clone().apply(change, &self.config.rate_table);

        let authoritative: PairSide = self.state.edited.into();
        let (old_value, new_value) = match self.state.edited {
            DpsField::Monthly => (before.target_maturity, self.state.target_maturity),
            DpsField::Target => (before.monthly_deposit, self.state.monthly_deposit),
        };
        let effective_rate = self.effective_rate();
        record_cap(
            &mut self.events,
            self.id,
            &self.config.rate_table,
            Some((before.rate, before.tenure_months)),
            self.state.rate,
            self.state.tenure_months,
        );
        record_recompute(
            &mut self.events,
            self.id,
            other_side(authoritative),
            old_value,
            new_value,
            effective_rate,
        );
        &self.state
    }

    fn record_edit(&mut self, before: &DpsState, change: DpsChange) {
        let session_id = self.id;
        let event = match change {
            DpsChange::Monthly(value) => Event::FieldEdited {
                session_id,
                field: PairSide::Input,
                value,
            },
            DpsChange::Target(value) => Event::FieldEdited {
                session_id,
                field: PairSide::Target,
                value,
            },
            DpsChange::Tenure(months) => Event::TenureChanged {
                session_id,
                old_months: before.tenure_months,
                new_months: months,
            },
            DpsChange::Rate(rate) => Event::RateChanged {
                session_id,
                old_rate: before.rate,
                new_rate: rate,
            },
            DpsChange::Timing(timing) => Event::TimingChanged {
                session_id,
                old_timing: before.timing,
                new_timing: timing,
            },
        };
        self.events.emit(event);
    }

    pub fn set_deductions(&mut self, deductions: DeductionConfig) -> DeductionResult {
        self.config.deductions = deductions;
        let result = self.deductions();
        self.events.emit(Event::DeductionsApplied {
            session_id: self.id,
            result: result.clone(),
        });
        result
    }

    pub fn use_excise_schedule(&mut self) -> DeductionResult {
        let deductions = self
            .config
            .deductions
            .clone()
            .with_excise_for(self.state.target_maturity, &self.config.excise_schedule);
        self.set_deductions(deductions)
    }

    pub fn rate_range(&self) -> RateRange {
        self.config.rate_table.resolve_bucket(self.state.tenure_months)
    }

    pub fn effective_rate(&self) -> Rate {
        self.state.effective_rate(&self.config.rate_table)
    }

    pub fn deductions(&self) -> DeductionResult {
        apply_deductions(
            self.state.target_maturity,
            self.state.cost_basis(),
            self.state.gross_interest(),
            &self.config.deductions,
        )
    }

    pub fn summary(&self) -> DpsSummary {
        let rate_range = self.rate_range();
        DpsSummary {
            monthly_deposit: self.state.monthly_deposit,
            target_maturity: self.state.target_maturity,
            tenure_months: self.state.tenure_months,
            requested_rate: self.state.rate,
            effective_rate: self.effective_rate(),
            rate_range,
            rate_position: rate_range.position(self.state.rate),
            timing: self.state.timing,
            total_deposits: self.state.cost_basis(),
            gross_interest: self.state.gross_interest(),
            deductions: self.deductions(),
        }
    }

    /// month-by-month projection; fractional tenures are truncated to whole months
    pub fn schedule(&self) -> AccumulationSchedule {
        let months = self
            .state
            .tenure_months
            .max(Decimal::ZERO)
            .trunc()
            .to_u32()
            .unwrap_or(0);
        self.state
            .engine()
            .schedule(self.state.monthly_deposit, self.effective_rate(), months)
    }

    pub fn view(&self) -> DpsView {
        DpsView::from_calculator(self)
    }

    pub fn json(&self) -> String {
        self.view()
            .to_json_pretty()
            .unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

/// builder for DPS sessions
#[derive(Debug, Default)]
pub struct DpsCalculatorBuilder {
    monthly_deposit: Option<Money>,
    target: Option<Money>,
    authoritative: Option<DpsField>,
    tenure_months: Option<Decimal>,
    rate: Option<Rate>,
    timing: Option<DepositTiming>,
    deductions: Option<DeductionConfig>,
    config: Option<CalculatorConfig>,
}

impl DpsCalculatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn monthly_deposit(mut self, monthly: Money) -> Self {
        self.monthly_deposit = Some(monthly);
        self.authoritative = Some(DpsField::Monthly);
        self
    }

    pub fn target(mut self, target: Money) -> Self {
        self.target = Some(target);
        self.authoritative = Some(DpsField::Target);
        self
    }

    pub fn tenure_months(mut self, months: impl Into<Decimal>) -> Self {
        self.tenure_months = Some(months.into());
        self
    }

    pub fn rate(mut self, rate: Rate) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn timing(mut self, timing: DepositTiming) -> Self {
        self.timing = Some(timing);
        self
    }

    pub fn deductions(mut self, deductions: DeductionConfig) -> Self {
        self.deductions = Some(deductions);
        self
    }

    pub fn config(mut self, config: CalculatorConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<DpsCalculator> {
        let mut config = self.config.unwrap_or_default();
        if let Some(deductions) = self.deductions {
            config.deductions = deductions;
        }
        config.validate()?;

        let tenure_months = self.tenure_months.ok_or(CalculatorError::InvalidConfiguration {
            message: "Tenure required".to_string(),
        })?;
        if tenure_months <= Decimal::ZERO {
            return Err(CalculatorError::InvalidTenure {
                months: tenure_months,
            });
        }

        let authoritative = self.authoritative.ok_or(CalculatorError::InvalidConfiguration {
            message: "Monthly deposit or target required".to_string(),
        })?;

        let rate = self
            .rate
            .unwrap_or_else(|| config.rate_table.resolve_bucket(tenure_months).midpoint);
        let timing = self.timing.unwrap_or(config.timing);

        let state = match authoritative {
            DpsField::Monthly => DpsState::new(
                self.monthly_deposit.unwrap_or(Money::ZERO),
                tenure_months,
                rate,
                timing,
            ),
            DpsField::Target => DpsState::from_target(
                self.target.unwrap_or(Money::ZERO),
                tenure_months,
                rate,
                timing,
            ),
        };

        Ok(DpsCalculator::new(config, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn calculator() -> DpsCalculator {
        DpsCalculator::builder()
            .monthly_deposit(Money::from_major(10_000))
            .tenure_months(18)
            .rate(Rate::from_percentage(10))
            .timing(DepositTiming::End)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_and_summary() {
        let calc = calculator();
        let summary = calc.summary();

        assert_eq!(summary.target_maturity.round_dp(2), Money::from_str_exact("193334.80").unwrap());
        assert_eq!(summary.total_deposits, Money::from_major(180_000));
        assert_eq!(summary.gross_interest.round_dp(2), Money::from_str_exact("13334.80").unwrap());
        assert_eq!(summary.rate_position, RatePosition::InRange);
        assert_eq!(summary.deductions.net_maturity, summary.target_maturity);
    }

    #[test]
    fn test_target_driven_session() {
        let calc = DpsCalculator::builder()
            .target(Money::from_major(180_000))
            .tenure_months(18)
            .rate(Rate::ZERO)
            .build()
            .unwrap();
        assert_eq!(calc.state().edited, DpsField::Target);
        assert_eq!(calc.state().monthly_deposit, Money::from_major(10_000));
        assert_eq!(calc.state().timing, DepositTiming::End);
    }

    #[test]
    fn test_timing_switch_on_monthly_raises_target() {
        let mut calc = calculator();
        let end_target = calc.state().target_maturity;
        calc.set_timing(DepositTiming::Begin);
        assert!(calc.state().target_maturity > end_target);
        assert_eq!(calc.state().monthly_deposit, Money::from_major(10_000));
    }

    #[test]
    fn test_target_edit_then_tenure_change() {
        let mut calc = calculator();
        calc.set_target(Money::from_major(300_000));
        let monthly_18 = calc.state().monthly_deposit;

        calc.set_tenure(dec!(36));
        assert_eq!(calc.state().target_maturity, Money::from_major(300_000));
        assert!(calc.state().monthly_deposit < monthly_18);
        assert!(calc.state().is_consistent(&calc.config().rate_table));
    }

    #[test]
    fn test_events_for_timing_change() {
        let mut calc = calculator();
        calc.take_events();
        calc.set_timing(DepositTiming::Begin);
        let events = calc.take_events();
        assert!(matches!(
            events[0],
            Event::TimingChanged { old_timing: DepositTiming::End, new_timing: DepositTiming::Begin, .. }
        ));
        assert!(matches!(events[1], Event::FieldRecomputed { field: PairSide::Target, .. }));
    }

    #[test]
    fn test_unchanged_value_emits_no_recompute() {
        let mut calc = calculator();
        calc.take_events();
        calc.set_monthly_deposit(Money::from_major(10_000));
        let events = calc.take_events();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_schedule_uses_effective_rate() {
        let mut calc = calculator();
        calc.set_rate(Rate::from_percentage(15));
        let schedule = calc.schedule();
        assert_eq!(schedule.annual_rate, Rate::from_percentage(dec!(10.25)));
        assert_eq!(schedule.rows.len(), 18);
        assert!(schedule.final_balance.distance(calc.state().target_maturity) < Money::ONE);
    }

    #[test]
    fn test_overflowing_tenure_schedule_degrades_to_zero() {
        let mut calc = calculator();
        calc.set_tenure(dec!(7200));
        assert_eq!(calc.state().target_maturity, Money::ZERO);

        let schedule = calc.schedule();
        assert!(schedule.rows.is_empty());
        assert_eq!(schedule.final_balance, Money::ZERO);
        assert_eq!(calc.summary().gross_interest, Money::ZERO);
    }

    #[test]
    fn test_deductions_use_total_deposits_as_basis() {
        let mut calc = calculator();
        let result = calc.set_deductions(DeductionConfig::none().with_ait(dec!(10)));
        let interest = calc.state().gross_interest();
        assert_eq!(result.ait, interest.percentage(dec!(10)));
        assert_eq!(result.net_interest, (result.net_maturity - Money::from_major(180_000)).floor_zero());
    }
}
