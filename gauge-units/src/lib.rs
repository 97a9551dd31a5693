//! Gauge Units - Bundled quantities and lookup
//!
//! Provides the process-wide quantity registry and conversion helpers.
//!
//! Quantities:
//! - Mass flow rate (kg/s, kg/h, mt/h, lb/s, lb/h)
//! - Pressure (Pa, kPa, MPa, hPa, bar, torr, mH2O, mmHg, psi, ksi, inHg)
//!
//! ```
//! use gauge_units::MASS_FLOW_RATE;
//!
//! let kg_per_s = gauge_units::convert(MASS_FLOW_RATE, 3600.0, "kg/h", "kg/s").unwrap();
//! assert_eq!(kg_per_s, 1.0);
//! ```

mod definitions;
mod registry;

use std::sync::LazyLock;

pub use registry::{QuantityRegistry, UnitDescription};
pub use gauge_core::{
    QuantityTable, QuantityDefinition, UnitGroup, UnitDefinition, UnitName, Anchor,
    UnitsError, ContractViolation, Result, codes,
};

pub const MASS_FLOW_RATE: &str = "mass_flow_rate";
pub const PRESSURE: &str = "pressure";

/// Global quantity registry, built on first use
pub static QUANTITIES: LazyLock<QuantityRegistry> = LazyLock::new(QuantityRegistry::builtin);

/// Ids of every bundled quantity
pub fn list_quantities() -> Vec<&'static str> {
    QUANTITIES.list_quantities()
}

pub fn get_table(quantity: &str) -> Result<&'static QuantityTable> {
    QUANTITIES.get_table(quantity)
}

/// Units of a quantity, optionally limited to one measurement system
pub fn list_units(quantity: &str, system: Option<&str>) -> Result<Vec<UnitDescription>> {
    QUANTITIES.list_units(quantity, system)
}

pub fn possibilities(quantity: &str) -> Result<Vec<&'static str>> {
    QUANTITIES.possibilities(quantity)
}

pub fn describe(quantity: &str, unit: &str) -> Result<UnitDescription> {
    QUANTITIES.describe(quantity, unit)
}

/// Convert `value` between two units of a bundled quantity
pub fn convert(quantity: &str, value: f64, from: &str, to: &str) -> Result<f64> {
    QUANTITIES.convert(quantity, value, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_list_quantities() {
        assert_eq!(list_quantities(), vec![MASS_FLOW_RATE, PRESSURE]);
    }

    #[test]
    fn test_unknown_quantity() {
        assert_eq!(
            get_table("doesNotExist").unwrap_err(),
            UnitsError::UnknownQuantity("doesNotExist".into())
        );
        assert_eq!(get_table("doesNotExist").unwrap_err().code(), codes::UNKNOWN_QUANTITY);
    }

    #[test]
    fn test_camel_case_alias() {
        let a = get_table("massFlowRate").unwrap();
        let b = get_table(MASS_FLOW_RATE).unwrap();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_unknown_unit() {
        for quantity in list_quantities() {
            let valid = possibilities(quantity).unwrap()[0];
            let err = convert(quantity, 1.0, "doesNotExist", valid).unwrap_err();
            assert_eq!(err, UnitsError::UnknownUnit("doesNotExist".into()));
            assert_eq!(err.code(), codes::UNKNOWN_UNIT);
        }
    }

    #[test]
    fn test_units_do_not_leak_across_quantities() {
        assert!(convert(PRESSURE, 1.0, "kg/s", "kPa").is_err());
        assert!(convert(MASS_FLOW_RATE, 1.0, "kg/s", "kPa").is_err());
    }

    #[test]
    fn test_identity_every_unit() {
        for quantity in list_quantities() {
            for unit in possibilities(quantity).unwrap() {
                for v in [0.0, 1.0, -7.25, 0.1, 3.0e-12, 9.99e15] {
                    assert_eq!(
                        convert(quantity, v, unit, unit).unwrap(),
                        v,
                        "{} {}",
                        quantity,
                        unit
                    );
                }
            }
        }
    }

    #[test]
    fn test_round_trips_every_pair() {
        for quantity in list_quantities() {
            let units = possibilities(quantity).unwrap();
            for a in &units {
                for b in &units {
                    for v in [1.0, 0.5, 1234.5678, 1e-6] {
                        let there = convert(quantity, v, a, b).unwrap();
                        let back = convert(quantity, there, b, a).unwrap();
                        assert_relative_eq!(back, v, max_relative = 1e-9);
                    }
                }
            }
        }
    }

    #[test]
    fn test_anchor_consistency() {
        for quantity in list_quantities() {
            let table = get_table(quantity).unwrap();
            let product: f64 = table
                .group_names()
                .filter_map(|g| table.anchor(g))
                .map(|a| a.ratio)
                .product();
            assert_relative_eq!(product, 1.0, max_relative = 1e-9);
        }
    }

    #[test]
    fn test_anchor_units_have_unit_scale() {
        for quantity in list_quantities() {
            let table = get_table(quantity).unwrap();
            for (name, group) in table.groups() {
                let anchor = table.anchor(name).unwrap();
                assert_eq!(group.get(&anchor.unit).unwrap().to_anchor, 1.0);
            }
        }
    }

    #[test]
    fn test_mass_flow_rate() {
        assert_eq!(convert(MASS_FLOW_RATE, 3600.0, "kg/h", "kg/s").unwrap(), 1.0);
        assert_eq!(convert(MASS_FLOW_RATE, 1.0, "mt/h", "kg/h").unwrap(), 1000.0);
        assert_relative_eq!(
            convert(MASS_FLOW_RATE, 1.0, "kg/s", "lb/s").unwrap(),
            1.0 / 0.453592,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            convert(MASS_FLOW_RATE, 1.0, "kg/s", "lb/s").unwrap(),
            2.2046226,
            max_relative = 1e-5
        );
        assert_relative_eq!(
            convert(MASS_FLOW_RATE, 1.0, "lb/s", "kg/s").unwrap(),
            0.453592,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            convert(MASS_FLOW_RATE, 3600.0, "lb/h", "kg/s").unwrap(),
            0.453592,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_pressure() {
        assert_eq!(convert(PRESSURE, 1.0, "bar", "kPa").unwrap(), 100.0);
        assert_eq!(convert(PRESSURE, 1000.0, "Pa", "kPa").unwrap(), 1.0);
        assert_relative_eq!(
            convert(PRESSURE, 1.0, "MPa", "bar").unwrap(),
            10.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            convert(PRESSURE, 1.0, "psi", "kPa").unwrap(),
            6.89476,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            convert(PRESSURE, 1.0, "kPa", "psi").unwrap(),
            0.14503768078,
            max_relative = 1e-9
        );
        assert_relative_eq!(
            convert(PRESSURE, 1.0, "ksi", "psi").unwrap(),
            1000.0,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            convert(PRESSURE, 1.0, "inHg", "kPa").unwrap(),
            3.38638895,
            max_relative = 1e-8
        );
        assert_relative_eq!(
            convert(PRESSURE, 760.0, "torr", "kPa").unwrap(),
            101.325,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_list_units_pressure() {
        let units = list_units(PRESSURE, None).unwrap();
        assert_eq!(units.len(), 11);
        let imperial = list_units(PRESSURE, Some("imperial")).unwrap();
        let keys: Vec<&str> = imperial.iter().map(|u| u.key.as_str()).collect();
        assert_eq!(keys, vec!["inHg", "ksi", "psi"]);
    }

    #[test]
    fn test_describe_bundled_unit() {
        let mh2o = describe(PRESSURE, "mH2O").unwrap();
        assert_eq!(mh2o.singular, "meter of water @ 4°C");
        assert_eq!(mh2o.group, "metric");
        assert_eq!(mh2o.quantity, PRESSURE);

        let mt = describe("massFlowRate", "mt/h").unwrap();
        assert_eq!(mt.plural, "Tons per hour");
        assert_eq!(mt.quantity, MASS_FLOW_RATE);
    }

    #[test]
    fn test_concurrent_first_access() {
        // Not yet initialized: every thread races on the first deref.
        let registry: LazyLock<QuantityRegistry> = LazyLock::new(QuantityRegistry::builtin);
        let barrier = std::sync::Barrier::new(8);
        let results: Vec<(f64, Vec<&str>)> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        let kpa = registry.convert(PRESSURE, 2.0, "bar", "kPa").unwrap();
                        (kpa, registry.list_quantities())
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert_eq!(results.len(), 8);
        for (kpa, quantities) in results {
            assert_eq!(kpa, 200.0);
            assert_eq!(quantities, vec![MASS_FLOW_RATE, PRESSURE]);
        }
        assert!(std::ptr::eq(
            registry.get_table(PRESSURE).unwrap(),
            registry.get_table(PRESSURE).unwrap()
        ));
    }
}
