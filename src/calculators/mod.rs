pub mod dps;
pub mod fixed_deposit;
pub mod serialization;

pub use dps::{DpsCalculator, DpsCalculatorBuilder, DpsSummary};
pub use fixed_deposit::{FdSummary, FixedDepositBuilder, FixedDepositCalculator};
pub use serialization::{DpsView, FdView};

use log::warn;
use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::events::{Event, EventStore};
use crate::rates::{RatePosition, RateTable};
use crate::types::{PairSide, SessionId};

/// the cap in force for a requested rate, None when it is not capped
fn cap_in_force(table: &RateTable, requested: Rate, tenure_months: Decimal) -> Option<Rate> {
    let range = table.resolve_bucket(tenure_months);
    match range.position(requested) {
        RatePosition::Capped => Some(range.hi),
        _ => None,
    }
}

/// emit `RateCapped` when an edit moves the session into a cap or onto a
/// different one; a session that stays under the same cap stays quiet
pub(crate) fn record_cap(
    events: &mut EventStore,
    session_id: SessionId,
    table: &RateTable,
    previous: Option<(Rate, Decimal)>,
    requested: Rate,
    tenure_months: Decimal,
) {
    let Some(cap) = cap_in_force(table, requested, tenure_months) else {
        return;
    };
    if let Some((previous_rate, previous_tenure)) = previous {
        if previous_rate == requested
            && cap_in_force(table, previous_rate, previous_tenure) == Some(cap)
        {
            return;
        }
    }
    warn!(
        "session {}: requested rate {} exceeds {} cap for {} months, using cap",
        session_id, requested, cap, tenure_months
    );
    events.emit(Event::RateCapped {
        session_id,
        requested,
        cap,
        tenure_months,
    });
}

/// emit `FieldRecomputed` when the derived side actually moved
pub(crate) fn record_recompute(
    events: &mut EventStore,
    session_id: SessionId,
    recomputed: PairSide,
    old_value: Money,
    new_value: Money,
    effective_rate: Rate,
) {
    if old_value != new_value {
        events.emit(Event::FieldRecomputed {
            session_id,
            field: recomputed,
            old_value,
            new_value,
            effective_rate,
        });
    }
}

/// the side a recompute writes to
pub(crate) fn other_side(authoritative: PairSide) -> PairSide {
    match authoritative {
        PairSide::Input => PairSide::Target,
        PairSide::Target => PairSide::Input,
    }
}
