//! Quantity registry
//!
//! Holds one immutable `QuantityTable` per physical quantity. Tables are
//! validated on registration; the registry never hands out a table that
//! breaks the data contract.

use std::collections::{BTreeMap, HashMap};
use serde::Serialize;
use tracing::{debug, error};
use gauge_core::{ContractViolation, QuantityTable, ResolvedUnit, Result, UnitsError};

use crate::definitions::{BundledDefinition, BUNDLED};

/// A unit as presented to callers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitDescription {
    pub key: String,
    pub singular: String,
    pub plural: String,
    /// Measurement system the unit belongs to (e.g. "metric")
    pub group: String,
    pub quantity: String,
}

impl UnitDescription {
    fn new(quantity: &str, unit: ResolvedUnit<'_>) -> Self {
        UnitDescription {
            key: unit.key.to_string(),
            singular: unit.definition.name.singular.clone(),
            plural: unit.definition.name.plural.clone(),
            group: unit.group.to_string(),
            quantity: quantity.to_string(),
        }
    }
}

/// Registry of quantity tables keyed by quantity id
#[derive(Debug, Clone, Default)]
pub struct QuantityRegistry {
    tables: BTreeMap<String, QuantityTable>,
    aliases: HashMap<String, String>,
}

impl QuantityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every bundled quantity
    ///
    /// A bundled definition that fails validation is logged and left out;
    /// the remaining quantities still load.
    pub fn builtin() -> Self {
        Self::from_bundled(&BUNDLED)
    }

    fn from_bundled(definitions: &[BundledDefinition]) -> Self {
        let mut registry = Self::new();
        for def in definitions {
            let loaded = QuantityTable::from_json(def.json)
                .map_err(|reason| UnitsError::invalid_configuration(def.id, reason))
                .and_then(|table| registry.register(def.id, table));

            if let Err(e) = loaded {
                error!(quantity = def.id, error = %e, "bundled quantity rejected");
                continue;
            }
            for alias in def.aliases {
                if let Err(e) = registry.register_alias(alias, def.id) {
                    error!(quantity = def.id, alias = *alias, error = %e, "bundled alias rejected");
                }
            }
        }
        registry
    }

    /// Add a table under `id`
    pub fn register(&mut self, id: &str, table: QuantityTable) -> Result<()> {
        if self.tables.contains_key(id) || self.aliases.contains_key(id) {
            return Err(UnitsError::invalid_configuration(
                id,
                ContractViolation::DuplicateQuantity,
            ));
        }
        debug!(
            quantity = id,
            groups = table.groups().count(),
            units = table.unit_count(),
            "registered quantity"
        );
        self.tables.insert(id.to_string(), table);
        Ok(())
    }

    /// Builder: add a table
    pub fn with_table(mut self, id: &str, table: QuantityTable) -> Result<Self> {
        self.register(id, table)?;
        Ok(self)
    }

    /// Builder: parse, validate and add a JSON definition
    pub fn with_json(self, id: &str, json: &str) -> Result<Self> {
        let table = QuantityTable::from_json(json)
            .map_err(|reason| UnitsError::invalid_configuration(id, reason))?;
        self.with_table(id, table)
    }

    /// Accept `alias` as another id for the registered quantity `id`
    ///
    /// The alias may not shadow a registered id or an existing alias.
    pub fn register_alias(&mut self, alias: &str, id: &str) -> Result<()> {
        if self.tables.contains_key(alias) || self.aliases.contains_key(alias) {
            return Err(UnitsError::invalid_configuration(
                alias,
                ContractViolation::DuplicateQuantity,
            ));
        }
        if !self.tables.contains_key(id) {
            return Err(UnitsError::UnknownQuantity(id.to_string()));
        }
        self.aliases.insert(alias.to_string(), id.to_string());
        Ok(())
    }

    /// Builder: accept `alias` as another id for `id`
    pub fn with_alias(mut self, alias: &str, id: &str) -> Result<Self> {
        self.register_alias(alias, id)?;
        Ok(self)
    }

    /// Resolve an id or alias to the stored id and its table
    fn lookup(&self, id: &str) -> Result<(&str, &QuantityTable)> {
        let canonical = self.aliases.get(id).map(String::as_str).unwrap_or(id);
        self.tables
            .get_key_value(canonical)
            .map(|(k, t)| (k.as_str(), t))
            .ok_or_else(|| UnitsError::UnknownQuantity(id.to_string()))
    }

    pub fn get_table(&self, id: &str) -> Result<&QuantityTable> {
        self.lookup(id).map(|(_, table)| table)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.lookup(id).is_ok()
    }

    /// Registered quantity ids, sorted (aliases excluded)
    pub fn list_quantities(&self) -> Vec<&str> {
        self.tables.keys().map(String::as_str).collect()
    }

    /// Units of a quantity ordered by group then key, optionally limited to
    /// one measurement system
    pub fn list_units(&self, id: &str, system: Option<&str>) -> Result<Vec<UnitDescription>> {
        let (quantity, table) = self.lookup(id)?;
        Ok(table
            .units()
            .filter(|u| system.map_or(true, |s| u.group == s))
            .map(|u| UnitDescription::new(quantity, u))
            .collect())
    }

    /// Every unit key of a quantity, sorted
    pub fn possibilities(&self, id: &str) -> Result<Vec<&str>> {
        let (_, table) = self.lookup(id)?;
        let mut keys: Vec<&str> = table.units().map(|u| u.key).collect();
        keys.sort_unstable();
        Ok(keys)
    }

    pub fn describe(&self, id: &str, unit: &str) -> Result<UnitDescription> {
        let (quantity, table) = self.lookup(id)?;
        table
            .resolve(unit)
            .map(|u| UnitDescription::new(quantity, u))
            .ok_or_else(|| UnitsError::UnknownUnit(unit.to_string()))
    }

    /// Look up the quantity, then run the conversion engine on its table
    pub fn convert(&self, id: &str, value: f64, from: &str, to: &str) -> Result<f64> {
        let table = self.get_table(id)?;
        gauge_core::convert(table, value, from, to)
    }
}
