//! Bundled quantity definitions, embedded at compile time

/// A quantity definition shipped with the crate
#[derive(Debug, Clone, Copy)]
pub(crate) struct BundledDefinition {
    pub id: &'static str,
    /// Alternative ids accepted by lookup
    pub aliases: &'static [&'static str],
    pub json: &'static str,
}

pub(crate) static BUNDLED: [BundledDefinition; 2] = [
    BundledDefinition {
        id: crate::MASS_FLOW_RATE,
        aliases: &["massFlowRate"],
        json: include_str!("../definitions/mass_flow_rate.json"),
    },
    BundledDefinition {
        id: crate::PRESSURE,
        aliases: &[],
        json: include_str!("../definitions/pressure.json"),
    },
];
