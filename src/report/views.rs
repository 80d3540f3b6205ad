use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreStatistics {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
}

/// One bucket of a categorical distribution. `percent` is relative to the
/// records the distribution counted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DistributionEntry {
    pub label: &'static str,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionCount {
    pub region: String,
    pub count: usize,
}

/// Summed debt component. `percent` is the share of the summed total across
/// the components it is listed with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtComponentShare {
    pub component: &'static str,
    pub total: f64,
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskLevelEntry {
    pub label: &'static str,
    pub count: usize,
    pub percent: f64,
    /// Pattern shares within this level.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_patterns: Vec<DistributionEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverdueDaysGroupEntry {
    pub label: &'static str,
    pub count: usize,
    pub percent: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub debt_components: Vec<DebtComponentShare>,
}
