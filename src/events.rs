use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::deductions::DeductionResult;
use crate::interest::{CompoundingFrequency, DepositTiming};
use crate::types::{PairSide, ProductKind, SessionId};

/// all events that can be emitted by a calculator session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // lifecycle events
    SessionStarted {
        session_id: SessionId,
        product: ProductKind,
        authoritative: PairSide,
    },

    // edit events
    FieldEdited {
        session_id: SessionId,
        field: PairSide,
        value: Money,
    },
    TenureChanged {
        session_id: SessionId,
        old_months: Decimal,
        new_months: Decimal,
    },
    RateChanged {
        session_id: SessionId,
        old_rate: Rate,
        new_rate: Rate,
    },
    CompoundingChanged {
        session_id: SessionId,
        old_frequency: CompoundingFrequency,
        new_frequency: CompoundingFrequency,
    },
    TimingChanged {
        session_id: SessionId,
        old_timing: DepositTiming,
        new_timing: DepositTiming,
    },

    // recompute events
    FieldRecomputed {
        session_id: SessionId,
        field: PairSide,
        old_value: Money,
        new_value: Money,
        effective_rate: Rate,
    },
    RateCapped {
        session_id: SessionId,
        requested: Rate,
        cap: Rate,
        tenure_months: Decimal,
    },

    // deduction events
    DeductionsApplied {
        session_id: SessionId,
        result: DeductionResult,
    },
}

/// event store for collecting events during a session
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}
