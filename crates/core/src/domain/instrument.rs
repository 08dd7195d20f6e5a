use serde::{Deserialize, Serialize};

/// One row of the precomputed instrument table.
///
/// Field names on the wire follow the dataset's column headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    #[serde(rename = "Symbol")]
    pub symbol: String,
    #[serde(rename = "Shortname")]
    pub display_name: String,
    #[serde(rename = "Sector", default)]
    pub sector: String,
    #[serde(rename = "Cluster")]
    pub cluster_id: i64,
    /// Relative weight; only comparable to rows sharing `cluster_id`.
    #[serde(rename = "Weight")]
    pub weight: f64,
}

impl Instrument {
    pub fn new(
        symbol: impl Into<String>,
        display_name: impl Into<String>,
        sector: impl Into<String>,
        cluster_id: i64,
        weight: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            display_name: display_name.into(),
            sector: sector.into(),
            cluster_id,
            weight,
        }
    }
}
