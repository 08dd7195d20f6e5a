use crate::domain::instrument::Instrument;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationRecord {
    pub symbol: String,
    pub display_name: String,
    pub normalized_weight: f64,
    pub invest_amount: f64,
}

/// Cluster row as shown before any amount is entered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewRow {
    pub symbol: String,
    pub display_name: String,
    pub sector: String,
    pub weight: f64,
}

impl From<&Instrument> for PreviewRow {
    fn from(i: &Instrument) -> Self {
        Self {
            symbol: i.symbol.clone(),
            display_name: i.display_name.clone(),
            sector: i.sector.clone(),
            weight: i.weight,
        }
    }
}
