use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a calculator session
pub type SessionId = Uuid;

/// savings product kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductKind {
    /// lump sum compounding for a fixed tenure
    FixedDeposit,
    /// monthly contributions accumulating as an annuity
    Dps,
}

/// authoritative field of a fixed deposit pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FdField {
    #[default]
    Principal,
    Maturity,
}

/// authoritative field of a DPS pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DpsField {
    #[default]
    Monthly,
    Target,
}

/// side of a linked pair, shared by both products
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PairSide {
    /// principal or monthly deposit
    Input,
    /// maturity or target
    Target,
}

impl From<FdField> for PairSide {
    fn from(field: FdField) -> Self {
        match field {
            FdField::Principal => PairSide::Input,
            FdField::Maturity => PairSide::Target,
        }
    }
}

impl From<DpsField> for PairSide {
    fn from(field: DpsField) -> Self {
        match field {
            DpsField::Monthly => PairSide::Input,
            DpsField::Target => PairSide::Target,
        }
    }
}
