use crate::scoring::{RegionCodeTable, ScoringEngine, ScoringOptions};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub readiness: Arc<AtomicBool>,
    pub metrics: Arc<PrometheusHandle>,
    pub regions: Arc<RegionCodeTable>,
    pub apply_city_tier: bool,
}

impl AppState {
    pub fn new(
        metrics: PrometheusHandle,
        regions: Arc<RegionCodeTable>,
        apply_city_tier: bool,
    ) -> Self {
        Self {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(metrics),
            regions,
            apply_city_tier,
        }
    }

    pub fn mark_ready(&self) {
        self.readiness.store(true, Ordering::Release);
    }

    pub(crate) fn engine(&self, as_of: NaiveDate) -> ScoringEngine {
        ScoringEngine::new(
            self.regions.clone(),
            ScoringOptions {
                as_of,
                apply_city_tier: self.apply_city_tier,
            },
        )
    }
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
