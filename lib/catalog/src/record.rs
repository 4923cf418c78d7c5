use serde::{Deserialize, Serialize};

/// Columns the loader requires in the catalog header
pub const REQUIRED_COLUMNS: &[&str] = &[
    "hack-id",
    "year",
    "estimated_current_cost",
    "expected_value_2027",
    "msrp",
    "seats",
    "type",
    "make",
    "model",
    "trim",
    "engine_type",
    "cylinders",
    "horsepower_hp",
    "combined_mpg",
];

/// One trim row of the processed catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarRecord {
    #[serde(rename = "hack-id")]
    pub hack_id: String,
    pub year: u16,
    /// Blank outside the depreciation table of the upstream ETL
    pub estimated_current_cost: Option<f64>,
    pub expected_value_2027: Option<f64>,
    pub msrp: f64,
    pub seats: Option<f64>,
    #[serde(rename = "type")]
    pub body_type: String,
    pub make: String,
    pub model: String,
    pub trim: String,
    pub engine_type: String,
    pub cylinders: Option<f64>,
    pub horsepower_hp: Option<f64>,
    pub combined_mpg: Option<f64>,
}

/// Rendered text for one record, keyed by its catalog id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub hack_id: String,
    pub text: String,
}
