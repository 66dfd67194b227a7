pub mod calculators;
pub mod config;
pub mod decimal;
pub mod deductions;
pub mod errors;
pub mod events;
pub mod interest;
pub mod rates;
pub mod reconcile;
pub mod types;

// re-export key types
pub use calculators::{
    DpsCalculator, DpsCalculatorBuilder, DpsSummary, DpsView, FdSummary, FdView,
    FixedDepositBuilder, FixedDepositCalculator,
};
pub use config::CalculatorConfig;
pub use decimal::{Money, Rate};
pub use deductions::{apply_deductions, DeductionConfig, DeductionResult, ExciseSchedule};
pub use errors::{CalculatorError, Result};
pub use events::{Event, EventStore};
pub use interest::{
    dps_backsolve_monthly, dps_maturity, effective_annual_yield, fd_backsolve_principal,
    fd_maturity, gross_interest, total_deposits, AccumulationSchedule, AnnuityEngine,
    CompoundingEngine, CompoundingFrequency, DepositTiming, MaturityEngine,
};
pub use rates::{resolve_bucket, RateBucket, RatePosition, RateRange, RateTable};
pub use reconcile::{DpsChange, DpsState, FdChange, FdState};
pub use types::{DpsField, FdField, PairSide, ProductKind, SessionId};
