//! two-way binding between an input amount and its maturity.
//!
//! the field the caller edited last is authoritative; every recompute
//! re-derives the other one with the capped rate and leaves the
//! authoritative value untouched.

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::interest::{
    gross_interest, AnnuityEngine, CompoundingEngine, CompoundingFrequency, DepositTiming,
    MaturityEngine,
};
use crate::rates::RateTable;
use crate::types::{DpsField, FdField, PairSide};

/// tolerance for the pair consistency check, one currency unit
pub const CONSISTENCY_TOLERANCE: Money = Money::ONE;

/// re-derive the non-authoritative side of a pair
fn reconcile_pair<E: MaturityEngine>(
    engine: &E,
    authoritative: PairSide,
    input: Money,
    target: Money,
    rate: Rate,
    months: Decimal,
) -> (Money, Money) {
    match authoritative {
        PairSide::Input => (input, engine.maturity(input, rate, months)),
        PairSide::Target => (engine.backsolve(target, rate, months), target),
    }
}

fn pair_is_consistent<E: MaturityEngine>(
    engine: &E,
    authoritative: PairSide,
    input: Money,
    target: Money,
    rate: Rate,
    months: Decimal,
) -> bool {
    let (input_expected, target_expected) =
        reconcile_pair(engine, authoritative, input, target, rate, months);
    input.distance(input_expected) < CONSISTENCY_TOLERANCE
        && target.distance(target_expected) < CONSISTENCY_TOLERANCE
}

/// fixed deposit calculator state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FdState {
    pub principal: Money,
    pub maturity: Money,
    pub tenure_months: Decimal,
    /// requested rate; the capped rate is derived per recompute
    pub rate: Rate,
    pub compounding: CompoundingFrequency,
    pub edited: FdField,
}

/// a single caller edit to a fixed deposit
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FdChange {
    Principal(Money),
    Maturity(Money),
    Tenure(Decimal),
    Rate(Rate),
    Compounding(CompoundingFrequency),
}

impl FdChange {
    /// the monetary field this change makes authoritative, if any
    pub fn edited_field(&self) -> Option<FdField> {
        match self {
            FdChange::Principal(_) => Some(FdField::Principal),
            FdChange::Maturity(_) => Some(FdField::Maturity),
            _ => None,
        }
    }
}

impl FdState {
    /// state driven by a principal; call `recompute` to fill in the maturity
    pub fn new(
        principal: Money,
        tenure_months: Decimal,
        rate: Rate,
        compounding: CompoundingFrequency,
    ) -> Self {
        Self {
            principal,
            maturity: Money::ZERO,
            tenure_months,
            rate,
            compounding,
            edited: FdField::Principal,
        }
    }

    /// state driven by a target maturity
    pub fn from_target(
        maturity: Money,
        tenure_months: Decimal,
        rate: Rate,
        compounding: CompoundingFrequency,
    ) -> Self {
        Self {
            principal: Money::ZERO,
            maturity,
            tenure_months,
            rate,
            compounding,
            edited: FdField::Maturity,
        }
    }

    pub fn engine(&self) -> CompoundingEngine {
        CompoundingEngine::new(self.compounding)
    }

    /// requested rate capped to the bucket for the current tenure
    pub fn effective_rate(&self, table: &RateTable) -> Rate {
        table.cap_rate(self.rate, self.tenure_months)
    }

    /// apply one edit, then recompute
    pub fn apply(mut self, change: FdChange, table: &RateTable) -> Self {
        match change {
            FdChange::Principal(value) => self.principal = value,
            FdChange::Maturity(value) => self.maturity = value,
            FdChange::Tenure(months) => self.tenure_months = months,
            FdChange::Rate(rate) => self.rate = rate,
            FdChange::Compounding(frequency) => self.compounding = frequency,
        }
        if let Some(field) = change.edited_field() {
            self.edited = field;
        }
        self.recompute(table)
    }

    /// re-derive the non-authoritative field
    pub fn recompute(mut self, table: &RateTable) -> Self {
        let rate = self.effective_rate(table);
        let (principal, maturity) = reconcile_pair(
            &self.engine(),
            self.edited.into(),
            self.principal,
            self.maturity,
            rate,
            self.tenure_months,
        );
        self.principal = principal;
        self.maturity = maturity;

        debug!(
            "fd recompute: edited={:?} principal={} maturity={} rate={} months={} {:?}",
            self.edited, self.principal, self.maturity, rate, self.tenure_months, self.compounding
        );
        self
    }

    pub fn cost_basis(&self) -> Money {
        self.engine().cost_basis(self.principal, self.tenure_months)
    }

    pub fn gross_interest(&self) -> Money {
        gross_interest(self.maturity, self.cost_basis())
    }

    /// pair agrees with the forward/inverse functions within one unit
    pub fn is_consistent(&self, table: &RateTable) -> bool {
        pair_is_consistent(
            &self.engine(),
            self.edited.into(),
            self.principal,
            self.maturity,
            self.effective_rate(table),
            self.tenure_months,
        )
    }
}

/// DPS calculator state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DpsState {
    pub monthly_deposit: Money,
    pub target_maturity: Money,
    pub tenure_months: Decimal,
    pub rate: Rate,
    pub timing: DepositTiming,
    pub edited: DpsField,
}

/// a single caller edit to a DPS
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DpsChange {
    Monthly(Money),
    Target(Money),
    Tenure(Decimal),
    Rate(Rate),
    Timing(DepositTiming),
}

impl DpsChange {
    pub fn edited_field(&self) -> Option<DpsField> {
        match self {
            DpsChange::Monthly(_) => Some(DpsField::Monthly),
            DpsChange::Target(_) => Some(DpsField::Target),
            _ => None,
        }
    }
}

impl DpsState {
    /// state driven by a monthly deposit
    pub fn new(
        monthly_deposit: Money,
        tenure_months: Decimal,
        rate: Rate,
        timing: DepositTiming,
    ) -> Self {
        Self {
            monthly_deposit,
            target_maturity: Money::ZERO,
            tenure_months,
            rate,
            timing,
            edited: DpsField::Monthly,
        }
    }

    /// state driven by a savings target
    pub fn from_target(
        target_maturity: Money,
        tenure_months: Decimal,
        rate: Rate,
        timing: DepositTiming,
    ) -> Self {
        Self {
            monthly_deposit: Money::ZERO,
            target_maturity,
            tenure_months,
            rate,
            timing,
            edited: DpsField::Target,
        }
    }

    pub fn engine(&self) -> AnnuityEngine {
        AnnuityEngine::new(self.timing)
    }

    pub fn effective_rate(&self, table: &RateTable) -> Rate {
        table.cap_rate(self.rate, self.tenure_months)
    }

    pub fn apply(mut self, change: DpsChange, table: &RateTable) -> Self {
        match change {
            DpsChange::Monthly(value) => self.monthly_deposit = value,
            DpsChange::Target(value) => self.target_maturity = value,
            DpsChange::Tenure(months) => self.tenure_months = months,
            DpsChange::Rate(rate) => self.rate = rate,
            DpsChange::Timing(timing) => self.timing = timing,
        }
        if let Some(field) = change.edited_field() {
            self.edited = field;
        }
        self.recompute(table)
    }

    pub fn recompute(mut self, table: &RateTable) -> Self {
        let rate = self.effective_rate(table);
        let (monthly_deposit, target_maturity) = reconcile_pair(
            &self.engine(),
            self.edited.into(),
            self.monthly_deposit,
            self.target_maturity,
            rate,
            self.tenure_months,
        );
        self.monthly_deposit = monthly_deposit;
        self.target_maturity = target_maturity;

        debug!(
            "dps recompute: edited={:?} monthly={} target={} rate={} months={} {:?}",
            self.edited, self.monthly_deposit, self.target_maturity, rate, self.tenure_months, self.timing
        );
        self
    }

    /// total of all deposits over the tenure
    pub fn cost_basis(&self) -> Money {
        self.engine().cost_basis(self.monthly_deposit, self.tenure_months)
    }

    pub fn gross_interest(&self) -> Money {
        gross_interest(self.target_maturity, self.cost_basis())
    }

    pub fn is_consistent(&self, table: &RateTable) -> bool {
        pair_is_consistent(
            &self.engine(),
            self.edited.into(),
            self.monthly_deposit,
            self.target_maturity,
            self.effective_rate(table),
            self.tenure_months,
        )
    }
}
