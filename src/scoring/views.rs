use super::rules::ScoreComponent;
use super::{RankedTable, ScoredRecord};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct RankedRowView {
    pub rank: usize,
    pub row: usize,
    pub score: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region_from_id: Option<String>,
    pub region_consistency: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_ratio: Option<f64>,
    pub overdue_months: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i32>,
    pub has_parent_contact: bool,
    pub city_tier_score: u8,
    pub components: Vec<ScoreComponent>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub cells: BTreeMap<String, String>,
}

impl RankedTable {
    /// Views over the first `limit` entries, or all of them.
    pub fn row_views(&self, limit: Option<usize>) -> Vec<RankedRowView> {
        let entries: &[ScoredRecord] = match limit {
            Some(k) => self.top(k),
            None => &self.entries,
        };

        entries
            .iter()
            .enumerate()
            .map(|(index, entry)| self.row_view(index + 1, entry))
            .collect()
    }

    fn row_view(&self, rank: usize, entry: &ScoredRecord) -> RankedRowView {
        let cells = self
            .headers
            .iter()
            .zip(entry.record.cells.iter())
            .filter_map(|(header, cell)| cell.as_ref().map(|value| (header.clone(), value.clone())))
            .collect();

        RankedRowView {
            rank,
            row: entry.record.row,
            score: entry.score,
            identity_number: entry.record.identity_number.clone(),
            region_from_id: entry.derived.region_from_id.clone(),
            region_consistency: entry.derived.region_consistency,
            debt_ratio: entry.derived.debt_ratio,
            overdue_months: entry.derived.overdue_months,
            age: entry.derived.age,
            has_parent_contact: entry.derived.has_parent_contact,
            city_tier_score: entry.derived.city_tier_score,
            components: entry.components.clone(),
            cells,
        }
    }
}
