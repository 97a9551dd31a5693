//! Conversion engine
//!
//! Converts a value between two units of one quantity table. Units in the
//! same group scale through the group's anchor; units in different groups
//! also cross the anchor ratio of the source group.

use crate::{QuantityTable, Result, UnitsError};
use tracing::trace;

/// Convert `value` from unit `from` to unit `to` within `table`
///
/// Same group: `value * from.to_anchor / to.to_anchor`.
/// Cross group: `value * from.to_anchor * anchors[from_group].ratio / to.to_anchor`,
/// evaluated left to right.
pub fn convert(table: &QuantityTable, value: f64, from: &str, to: &str) -> Result<f64> {
    let source = table
        .resolve(from)
        .ok_or_else(|| UnitsError::UnknownUnit(from.to_string()))?;

    if from == to {
        trace!(unit = from, "identity conversion");
        return Ok(value);
    }

    let target = table
        .resolve(to)
        .ok_or_else(|| UnitsError::UnknownUnit(to.to_string()))?;

    let result = if source.group == target.group {
        trace!(from, to, group = source.group, "same-group conversion");
        value * source.definition.to_anchor / target.definition.to_anchor
    } else {
        trace!(
            from,
            to,
            source_group = source.group,
            target_group = target.group,
            "cross-group conversion"
        );
        let anchor_value = value * source.definition.to_anchor;
        let target_anchor_value = anchor_value * source.anchor.ratio;
        target_anchor_value / target.definition.to_anchor
    };

    Ok(result)
}
