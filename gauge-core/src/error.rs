//! Structured errors
//!
//! Lookups and conversions report failures as values; nothing panics and
//! nothing is retried. Each error carries a stable machine-readable code.

use thiserror::Error;

/// Standard error codes (machine-readable)
pub mod codes {
    pub const UNKNOWN_QUANTITY: &str = "UNKNOWN_QUANTITY";
    pub const UNKNOWN_UNIT: &str = "UNKNOWN_UNIT";
    pub const INVALID_CONFIGURATION: &str = "INVALID_CONFIGURATION";
}

/// Errors raised by the registry and the conversion engine
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitsError {
    #[error("unknown quantity: {0}")]
    UnknownQuantity(String),

    #[error("unknown unit: {0}")]
    UnknownUnit(String),

    /// Raised only while building a registry; the table is never registered.
    #[error("invalid configuration for quantity '{quantity}': {reason}")]
    InvalidConfiguration {
        quantity: String,
        #[source]
        reason: ContractViolation,
    },
}

impl UnitsError {
    /// Machine-readable code for this error
    pub fn code(&self) -> &'static str {
        match self {
            UnitsError::UnknownQuantity(_) => codes::UNKNOWN_QUANTITY,
            UnitsError::UnknownUnit(_) => codes::UNKNOWN_UNIT,
            UnitsError::InvalidConfiguration { .. } => codes::INVALID_CONFIGURATION,
        }
    }

    pub fn invalid_configuration(quantity: impl Into<String>, reason: ContractViolation) -> Self {
        UnitsError::InvalidConfiguration {
            quantity: quantity.into(),
            reason,
        }
    }
}

/// A way in which a quantity table breaks the data contract
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ContractViolation {
    #[error("malformed definition: {0}")]
    Malformed(String),

    #[error("table has no unit groups")]
    EmptyTable,

    #[error("group '{0}' has no units")]
    EmptyGroup(String),

    /// Anchor ratios are pairwise; a third group has no defined ratio.
    #[error("{0} unit groups defined, anchor ratios only relate two groups")]
    TooManyGroups(usize),

    #[error("unit '{unit}' appears in both '{first}' and '{second}'")]
    DuplicateUnit {
        unit: String,
        first: String,
        second: String,
    },

    #[error("unit '{unit}' in group '{group}' has invalid to_anchor {value}")]
    InvalidScale {
        group: String,
        unit: String,
        value: f64,
    },

    #[error("group '{0}' has no anchor")]
    MissingAnchor(String),

    #[error("anchor defined for unknown group '{0}'")]
    OrphanAnchor(String),

    #[error("anchor unit '{unit}' is not a member of group '{group}'")]
    AnchorUnitNotInGroup { group: String, unit: String },

    #[error("anchor unit '{unit}' of group '{group}' has to_anchor {value}, expected 1")]
    AnchorNotUnitScale {
        group: String,
        unit: String,
        value: f64,
    },

    #[error("anchor ratio of group '{group}' is invalid: {value}")]
    InvalidRatio { group: String, value: f64 },

    #[error("anchor ratios are not reciprocal (product {product})")]
    InconsistentRatios { product: f64 },

    #[error("quantity is already registered")]
    DuplicateQuantity,
}

/// Result alias used across gauge crates
pub type Result<T> = std::result::Result<T, UnitsError>;
