//! Static indicator catalog: topic -> World Bank code -> label, plus descriptions.
//!
//! The catalog is pure data. The reshape step joins provider columns against it
//! by label, and the chart builder walks it in display order.

use serde::Serialize;

mod entries;

pub use entries::INDICATORS;

/// Indicator topics, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Topic {
    BusinessEnvironment,
    EconomicPerformance,
    TradeInvestment,
    Financial,
    Social,
    Governance,
}

impl Topic {
    pub const ALL: [Topic; 6] = [
        Topic::BusinessEnvironment,
        Topic::EconomicPerformance,
        Topic::TradeInvestment,
        Topic::Financial,
        Topic::Social,
        Topic::Governance,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Topic::BusinessEnvironment => "Business Environment",
            Topic::EconomicPerformance => "Economic Performance",
            Topic::TradeInvestment => "Trade & Investment",
            Topic::Financial => "Financial Indicators",
            Topic::Social => "Social Indicators",
            Topic::Governance => "Governance Indicators",
        }
    }
}

impl std::fmt::Display for Topic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A catalog entry. Identity is the provider code.
#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct Indicator {
    pub code: &'static str,
    pub name: &'static str,
    pub topic: Topic,
    pub description: Option<&'static str>,
}

pub const NO_DESCRIPTION: &str = "No description available for this indicator.";

impl Indicator {
    pub fn description_or_default(&self) -> &'static str {
        self.description.unwrap_or(NO_DESCRIPTION)
    }
}

pub const POPULATION_TOTAL: &str = "SP.POP.TOTL";
pub const POPULATION_GROWTH: &str = "SP.POP.GROW";

/// Doing Business rank indicators (1 = most business-friendly regulations).
pub const RANK_INDICATORS: [&str; 8] = [
    "IC.BUS.EASE.XQ",
    "IC.CNST.PRMT.RK",
    "IC.CRED.ACC.CRD.RK",
    "IC.ELC.ACES.RK.DB19",
    "IC.REG.STRT.BUS.RK.DB19",
    "PAY.TAX.RK.DB19",
    "RESLV.ISV.RK.DB19",
    "TRD.ACRS.BRDR.RK.DB19",
];

pub fn all() -> &'static [Indicator] {
    &INDICATORS
}

pub fn by_code(code: &str) -> Option<&'static Indicator> {
    INDICATORS.iter().find(|i| i.code == code)
}

pub fn by_label(label: &str) -> Option<&'static Indicator> {
    INDICATORS.iter().find(|i| i.name == label)
}

pub fn for_topic(topic: Topic) -> impl Iterator<Item = &'static Indicator> {
    INDICATORS.iter().filter(move |i| i.topic == topic)
}

pub fn is_rank(code: &str) -> bool {
    RANK_INDICATORS.contains(&code)
}

/// Every catalog code, in catalog order.
pub fn codes() -> Vec<&'static str> {
    INDICATORS.iter().map(|i| i.code).collect()
}
