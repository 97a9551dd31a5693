//! Gauge Core - Quantity tables and conversion
//!
//! This crate provides the pieces every quantity shares:
//! - `QuantityTable`: validated unit groups plus their anchors
//! - `convert`: the conversion engine
//! - `UnitsError`: structured errors with stable codes

mod error;
mod table;
mod convert;

pub use error::{UnitsError, ContractViolation, Result, codes};
pub use table::{
    QuantityTable, QuantityDefinition, UnitGroup, UnitDefinition, UnitName,
    Anchor, ResolvedUnit, RATIO_TOLERANCE,
};
pub use convert::convert;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{QuantityTable, UnitDefinition, UnitGroup, Anchor, UnitsError, convert};
    pub use crate::error::codes;
}
