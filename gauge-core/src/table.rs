//! Quantity tables: unit groups, anchors, and the data contract
//!
//! A table is the full definition of one physical quantity. It is parsed
//! from the data-file shape
//!
//! ```json
//! {
//!   "metric":   { "kg/s": { "name": { "singular": "...", "plural": "..." }, "to_anchor": 1 } },
//!   "imperial": { "lb/s": { "name": { "singular": "...", "plural": "..." }, "to_anchor": 1 } },
//!   "_anchors": {
//!     "metric":   { "unit": "kg/s", "ratio": 2.2046244201837775 },
//!     "imperial": { "unit": "lb/s", "ratio": 0.453592 }
//!   }
//! }
//! ```
//!
//! and validated once on construction. A `QuantityTable` value always
//! satisfies the contract, so the engine never re-checks it.

use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};
use crate::ContractViolation;

/// Tolerance for `A.ratio * B.ratio == 1`
pub const RATIO_TOLERANCE: f64 = 1e-9;

/// Display names of a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitName {
    pub singular: String,
    pub plural: String,
}

/// One supported unit
///
/// `value_in_anchor_unit = value_in_this_unit * to_anchor`.
/// Extra fields in a unit record are ignored so data files can grow
/// (e.g. an offset for non-linear units) without breaking this reader.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitDefinition {
    pub name: UnitName,
    pub to_anchor: f64,
}

impl UnitDefinition {
    pub fn new(singular: &str, plural: &str, to_anchor: f64) -> Self {
        UnitDefinition {
            name: UnitName {
                singular: singular.to_string(),
                plural: plural.to_string(),
            },
            to_anchor,
        }
    }
}

/// Units of one measurement system, keyed by unit symbol
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitGroup {
    units: BTreeMap<String, UnitDefinition>,
}

impl UnitGroup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: add a unit
    pub fn with_unit(mut self, key: &str, definition: UnitDefinition) -> Self {
        self.units.insert(key.to_string(), definition);
        self
    }

    pub fn get(&self, key: &str) -> Option<&UnitDefinition> {
        self.units.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.units.contains_key(key)
    }

    /// Units in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &UnitDefinition)> {
        self.units.iter().map(|(k, d)| (k.as_str(), d))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(|k| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

impl FromIterator<(String, UnitDefinition)> for UnitGroup {
    fn from_iter<I: IntoIterator<Item = (String, UnitDefinition)>>(iter: I) -> Self {
        UnitGroup {
            units: iter.into_iter().collect(),
        }
    }
}

/// Anchor of one group
///
/// `value_in_other_anchor = value_in_this_anchor * ratio`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub unit: String,
    pub ratio: f64,
}

impl Anchor {
    pub fn new(unit: &str, ratio: f64) -> Self {
        Anchor {
            unit: unit.to_string(),
            ratio,
        }
    }
}

/// A unit key resolved within a table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedUnit<'a> {
    pub key: &'a str,
    pub group: &'a str,
    pub definition: &'a UnitDefinition,
    pub anchor: &'a Anchor,
}

/// Data-file shape of a quantity, before validation
///
/// Every key other than `_anchors` names a unit group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuantityDefinition {
    #[serde(rename = "_anchors")]
    pub anchors: BTreeMap<String, Anchor>,
    #[serde(flatten)]
    pub groups: BTreeMap<String, UnitGroup>,
}

/// Complete, validated definition of one physical quantity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "QuantityDefinition", into = "QuantityDefinition")]
pub struct QuantityTable {
    groups: BTreeMap<String, UnitGroup>,
    anchors: BTreeMap<String, Anchor>,
}

impl QuantityTable {
    /// Build a table, checking the data contract
    pub fn new(
        groups: BTreeMap<String, UnitGroup>,
        anchors: BTreeMap<String, Anchor>,
    ) -> Result<Self, ContractViolation> {
        let table = QuantityTable { groups, anchors };
        table.validate()?;
        Ok(table)
    }

    /// Parse and validate a JSON definition
    pub fn from_json(json: &str) -> Result<Self, ContractViolation> {
        let raw: QuantityDefinition = serde_json::from_str(json)
            .map_err(|e| ContractViolation::Malformed(e.to_string()))?;
        Self::try_from(raw)
    }

    /// Serialize back to the data-file shape
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Find the group and definition for a unit key
    pub fn resolve(&self, key: &str) -> Option<ResolvedUnit<'_>> {
        self.groups.iter().find_map(|(group, units)| {
            let (key, definition) = units.units.get_key_value(key)?;
            let anchor = self.anchors.get(group)?;
            Some(ResolvedUnit {
                key: key.as_str(),
                group: group.as_str(),
                definition,
                anchor,
            })
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.groups.values().any(|g| g.contains(key))
    }

    pub fn group(&self, name: &str) -> Option<&UnitGroup> {
        self.groups.get(name)
    }

    pub fn anchor(&self, group: &str) -> Option<&Anchor> {
        self.anchors.get(group)
    }

    /// Groups in name order
    pub fn groups(&self) -> impl Iterator<Item = (&str, &UnitGroup)> {
        self.groups.iter().map(|(n, g)| (n.as_str(), g))
    }

    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(|n| n.as_str())
    }

    /// Every unit in (group, key) order
    pub fn units(&self) -> impl Iterator<Item = ResolvedUnit<'_>> {
        self.groups
            .iter()
            .filter_map(move |(group, units)| Some((group, units, self.anchors.get(group)?)))
            .flat_map(|(group, units, anchor)| {
                units.iter().map(move |(key, definition)| ResolvedUnit {
                    key,
                    group: group.as_str(),
                    definition,
                    anchor,
                })
            })
    }

    pub fn unit_count(&self) -> usize {
        self.groups.values().map(UnitGroup::len).sum()
    }

    fn validate(&self) -> Result<(), ContractViolation> {
        if self.groups.is_empty() {
            return Err(ContractViolation::EmptyTable);
        }
        if self.groups.len() > 2 {
            return Err(ContractViolation::TooManyGroups(self.groups.len()));
        }

        let mut owners: BTreeMap<&str, &str> = BTreeMap::new();
        for (name, group) in &self.groups {
            if group.is_empty() {
                return Err(ContractViolation::EmptyGroup(name.clone()));
            }
            for (key, def) in group.iter() {
                if !is_positive_finite(def.to_anchor) {
                    return Err(ContractViolation::InvalidScale {
                        group: name.clone(),
                        unit: key.to_string(),
                        value: def.to_anchor,
                    });
                }
                if let Some(first) = owners.insert(key, name.as_str()) {
                    return Err(ContractViolation::DuplicateUnit {
                        unit: key.to_string(),
                        first: first.to_string(),
                        second: name.clone(),
                    });
                }
            }
        }

        if let Some(orphan) = self.anchors.keys().find(|g| !self.groups.contains_key(*g)) {
            return Err(ContractViolation::OrphanAnchor(orphan.clone()));
        }

        for (name, group) in &self.groups {
            let anchor = self
                .anchors
                .get(name)
                .ok_or_else(|| ContractViolation::MissingAnchor(name.clone()))?;

            let def = group
                .get(&anchor.unit)
                .ok_or_else(|| ContractViolation::AnchorUnitNotInGroup {
                    group: name.clone(),
                    unit: anchor.unit.clone(),
                })?;

            if def.to_anchor != 1.0 {
                return Err(ContractViolation::AnchorNotUnitScale {
                    group: name.clone(),
                    unit: anchor.unit.clone(),
                    value: def.to_anchor,
                });
            }

            if !is_positive_finite(anchor.ratio) {
                return Err(ContractViolation::InvalidRatio {
                    group: name.clone(),
                    value: anchor.ratio,
                });
            }
        }

        if self.anchors.len() == 2 {
            let product: f64 = self.anchors.values().map(|a| a.ratio).product();
            if (product - 1.0).abs() > RATIO_TOLERANCE {
                return Err(ContractViolation::InconsistentRatios { product });
            }
        }

        Ok(())
    }
}

impl TryFrom<QuantityDefinition> for QuantityTable {
    type Error = ContractViolation;

    fn try_from(raw: QuantityDefinition) -> Result<Self, Self::Error> {
        QuantityTable::new(raw.groups, raw.anchors)
    }
}

impl From<QuantityTable> for QuantityDefinition {
    fn from(table: QuantityTable) -> Self {
        QuantityDefinition {
            anchors: table.anchors,
            groups: table.groups,
        }
    }
}

fn is_positive_finite(x: f64) -> bool {
    x.is_finite() && x > 0.0
}
