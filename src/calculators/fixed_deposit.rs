use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calculators::serialization::FdView;
use crate::calculators::{other_side, record_cap, record_recompute};
use crate::config::CalculatorConfig;
use crate::decimal::{Money, Rate};
use crate::deductions::{apply_deductions, DeductionConfig, DeductionResult};
use crate::errors::{CalculatorError, Result};
use crate::events::{Event, EventStore};
use crate::interest::{effective_annual_yield, CompoundingFrequency};
use crate::rates::{RatePosition, RateRange};
use crate::reconcile::{FdChange, FdState};
use crate::types::{FdField, PairSide, ProductKind, SessionId};

/// gross and net figures for a fixed deposit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FdSummary {
    pub principal: Money,
    pub maturity: Money,
    pub tenure_months: Decimal,
    pub requested_rate: Rate,
    pub effective_rate: Rate,
    pub rate_range: RateRange,
    pub rate_position: RatePosition,
    pub compounding: CompoundingFrequency,
    pub effective_annual_yield: Rate,
    pub gross_interest: Money,
    pub deductions: DeductionResult,
}

/// one fixed deposit calculator session
#[derive(Debug)]
pub struct FixedDepositCalculator {
    id: SessionId,
    config: CalculatorConfig,
    state: FdState,
    events: EventStore,
}

impl FixedDepositCalculator {
    /// start a session from an initial state
    pub fn new(config: CalculatorConfig, state: FdState) -> Self {
        let id = Uuid::new_v4();
        let state = state.recompute(&config.rate_table);
        let mut events = EventStore::new();
        events.emit(Event::SessionStarted {
            session_id: id,
            product: ProductKind::FixedDeposit,
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
        info!("fixed deposit session {} started, edited={:?}", id, state.edited);

        Self {
            id,
            config,
            state,
            events,
        }
    }

    pub fn builder() -> FixedDepositBuilder {
        FixedDepositBuilder::new()
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> &FdState {
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

    pub fn set_principal(&mut self, principal: Money) -> &FdState {
        self.apply(FdChange::Principal(principal))
    }

    pub fn set_maturity(&mut self, maturity: Money) -> &FdState {
        self.apply(FdChange::Maturity(maturity))
    }

    pub fn set_tenure(&mut self, months: Decimal) -> &FdState {
        self.apply(FdChange::Tenure(months))
    }

    pub fn set_rate(&mut self, rate: Rate) -> &FdState {
        self.apply(FdChange::Rate(rate))
    }

    pub fn set_compounding(&mut self, frequency: CompoundingFrequency) -> &FdState {
        self.apply(FdChange::Compounding(frequency))
    }

    /// reset the rate to the midpoint of the current tenure's bucket
    pub fn use_default_rate(&mut self) -> &FdState {
        let midpoint = self.rate_range().midpoint;
        self.apply(FdChange::Rate(midpoint))
    }

    /// apply one edit, recording what changed
    pub fn apply(&mut self, change: FdChange) -> &FdState {
        let before = self.state.clone();
        self.record_edit(&before, change);

        self.state = before.clone().apply(change, &self.config.rate_table);

        let authoritative: PairSide = self.state.edited.into();
        let (old_value, new_value) = match self.state.edited {
            FdField::Principal => (before.maturity, self.state.maturity),
            FdField::Maturity => (before.principal, self.state.principal),
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

    fn record_edit(&mut self, before: &FdState, change: FdChange) {
        let session_id = self.id;
        let event = match change {
            FdChange::Principal(value) => Event::FieldEdited {
                session_id,
                field: PairSide::Input,
                value,
            },
            FdChange::Maturity(value) => Event::FieldEdited {
                session_id,
                field: PairSide::Target,
                value,
            },
            FdChange::Tenure(months) => Event::TenureChanged {
                session_id,
                old_months: before.tenure_months,
                new_months: months,
            },
            FdChange::Rate(rate) => Event::RateChanged {
                session_id,
                old_rate: before.rate,
                new_rate: rate,
            },
            FdChange::Compounding(frequency) => Event::CompoundingChanged {
                session_id,
                old_frequency: before.compounding,
                new_frequency: frequency,
            },
        };
        self.events.emit(event);
    }

    /// replace the deduction toggles
    pub fn set_deductions(&mut self, deductions: DeductionConfig) -> DeductionResult {
        self.config.deductions = deductions;
        let result = self.deductions();
        self.events.emit(Event::DeductionsApplied {
            session_id: self.id,
            result: result.clone(),
        });
        result
    }

    /// set the flat duty from the configured schedule for the current maturity
    pub fn use_excise_schedule(&mut self) -> DeductionResult {
        let deductions = self
            .config
            .deductions
            .clone()
            .with_excise_for(self.state.maturity, &self.config.excise_schedule);
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
            self.state.maturity,
            self.state.cost_basis(),
            self.state.gross_interest(),
            &self.config.deductions,
        )
    }

    pub fn summary(&self) -> FdSummary {
        let rate_range = self.rate_range();
        let effective_rate = self.effective_rate();
        FdSummary {
            principal: self.state.principal,
            maturity: self.state.maturity,
            tenure_months: self.state.tenure_months,
            requested_rate: self.state.rate,
            effective_rate,
            rate_range,
            rate_position: rate_range.position(self.state.rate),
            compounding: self.state.compounding,
            effective_annual_yield: effective_annual_yield(effective_rate, self.state.compounding),
            gross_interest: self.state.gross_interest(),
            deductions: self.deductions(),
        }
    }

    pub fn view(&self) -> FdView {
        FdView::from_calculator(self)
    }

    /// pretty json of the current session
    pub fn json(&self) -> String {
        self.view()
            .to_json_pretty()
            .unwrap_or_else(|e| format!("JSON error: {}", e))
    }
}

/// builder for fixed deposit sessions
#[derive(Debug, Default)]
pub struct FixedDepositBuilder {
    principal: Option<Money>,
    maturity: Option<Money>,
    authoritative: Option<FdField>,
    tenure_months: Option<Decimal>,
    rate: Option<Rate>,
    compounding: Option<CompoundingFrequency>,
    deductions: Option<DeductionConfig>,
    config: Option<CalculatorConfig>,
}

impl FixedDepositBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self.authoritative = Some(FdField::Principal);
        self
    }

    pub fn maturity(mut self, maturity: Money) -> Self {
        self.maturity = Some(maturity);
        self.authoritative = Some(FdField::Maturity);
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

    pub fn compounding(mut self, frequency: CompoundingFrequency) -> Self {
        self.compounding = Some(frequency);
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

    /// the most recently populated amount becomes authoritative; the rate
    /// defaults to the bucket midpoint
    pub fn build(self) -> Result<FixedDepositCalculator> {
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
            message: "Principal or maturity required".to_string(),
        })?;

        let rate = self
            .rate
            .unwrap_or_else(|| config.rate_table.resolve_bucket(tenure_months).midpoint);
        let compounding = self.compounding.unwrap_or(config.compounding);

        let state = match authoritative {
            FdField::Principal => FdState::new(
                self.principal.unwrap_or(Money::ZERO),
                tenure_months,
                rate,
                compounding,
            ),
            FdField::Maturity => FdState::from_target(
                self.maturity.unwrap_or(Money::ZERO),
                tenure_months,
                rate,
                compounding,
            ),
        };

        Ok(FixedDepositCalculator::new(config, state))
    }
}
