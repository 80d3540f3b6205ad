//! Descriptive statistics over a ranked debtor table.

mod bands;
mod composition;
mod payment;
mod risk;
pub mod views;

pub use bands::{AgeBand, DebtRatioBand};
pub use composition::{OverdueDaysGroup, DEBT_COMPONENT_HEADERS, OVERDUE_DAYS_HEADER};
pub use payment::{missed_months, PaymentPattern, MINIMUM_PAYMENT_HEADERS};
pub use risk::{histogram, RiskLevel, RISK_HISTOGRAM_BINS, RISK_PROBABILITY_HEADER};

use crate::scoring::{parse_amount, Column, RankedTable, ScoredRecord};
use serde::Serialize;
use std::collections::HashMap;
use views::{
    DebtComponentShare, DistributionEntry, HistogramBin, OverdueDaysGroupEntry, RegionCount,
    RiskLevelEntry, ScoreStatistics,
};

pub const DEFAULT_TOP_REGIONS: usize = 10;

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioReport {
    pub record_type: String,
    pub scores: ScoreStatistics,
    /// Empty when the table carries no repayment history column.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payment_patterns: Vec<DistributionEntry>,
    pub debt_ratio_bands: Vec<DistributionEntry>,
    pub age_bands: Vec<DistributionEntry>,
    pub top_regions: Vec<RegionCount>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub debt_composition: Vec<DebtComponentShare>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_levels: Vec<RiskLevelEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risk_histogram: Vec<HistogramBin>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub overdue_day_groups: Vec<OverdueDaysGroupEntry>,
}

impl PortfolioReport {
    pub fn build(ranked: &RankedTable, top_regions: usize) -> Self {
        let patterns = entry_patterns(ranked);
        let components = present_components(ranked);

        Self {
            record_type: ranked.record_type.label().to_string(),
            scores: score_statistics(ranked),
            payment_patterns: patterns
                .as_deref()
                .map(|patterns| pattern_distribution(patterns.iter()))
                .unwrap_or_default(),
            debt_ratio_bands: debt_ratio_bands(ranked),
            age_bands: age_bands(ranked),
            top_regions: region_counts(ranked, top_regions),
            debt_composition: component_shares(ranked, &components, ranked.entries.iter()),
            risk_levels: risk_levels(ranked, patterns.as_deref()),
            risk_histogram: risk_histogram(ranked),
            overdue_day_groups: overdue_day_groups(ranked, &components),
        }
    }
}

fn score_statistics(ranked: &RankedTable) -> ScoreStatistics {
    let scores: Vec<f64> = ranked.entries.iter().map(|entry| entry.score).collect();
    if scores.is_empty() {
        return ScoreStatistics {
            count: 0,
            min: None,
            max: None,
            mean: None,
        };
    }

    let min = scores.iter().copied().fold(f64::INFINITY, f64::min);
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;

    ScoreStatistics {
        count: scores.len(),
        min: Some(min),
        max: Some(max),
        mean: Some(mean),
    }
}

/// One pattern per ranked entry, or `None` without repayment history columns.
fn entry_patterns(ranked: &RankedTable) -> Option<Vec<PaymentPattern>> {
    let positions: Vec<usize> = MINIMUM_PAYMENT_HEADERS
        .iter()
        .filter_map(|header| ranked.headers.iter().position(|candidate| candidate == header))
        .collect();
    if positions.is_empty() {
        return None;
    }

    let patterns = ranked
        .entries
        .iter()
        .map(|entry| {
            let cells = positions
                .iter()
                .map(|index| entry.record.cells.get(*index).and_then(|cell| cell.as_deref()));
            PaymentPattern::classify(missed_months(cells))
        })
        .collect();
    Some(patterns)
}

fn pattern_distribution<'a, I>(patterns: I) -> Vec<DistributionEntry>
where
    I: IntoIterator<Item = &'a PaymentPattern>,
{
    let mut counts: HashMap<PaymentPattern, usize> = HashMap::new();
    for pattern in patterns {
        *counts.entry(*pattern).or_default() += 1;
    }
    let counted = counts.values().sum();

    distribution(
        PaymentPattern::ordered()
            .into_iter()
            .map(|pattern| (pattern.label(), counts.get(&pattern).copied().unwrap_or(0))),
        counted,
    )
}

fn present_components(ranked: &RankedTable) -> Vec<&'static str> {
    DEBT_COMPONENT_HEADERS
        .into_iter()
        .filter(|header| ranked.headers.iter().any(|candidate| candidate == header))
        .collect()
}

/// Blank or unparseable cells add nothing to a component's total.
fn component_shares<'a, I>(
    ranked: &RankedTable,
    components: &[&'static str],
    entries: I,
) -> Vec<DebtComponentShare>
where
    I: IntoIterator<Item = &'a ScoredRecord>,
{
    let mut totals = vec![0.0; components.len()];
    for entry in entries {
        for (total, component) in totals.iter_mut().zip(components) {
            if let Some(amount) = ranked.cell(entry, component).and_then(parse_amount) {
                *total += amount;
            }
        }
    }
    let grand_total: f64 = totals.iter().sum();

    components
        .iter()
        .zip(totals)
        .map(|(&component, total)| DebtComponentShare {
            component,
            total,
            percent: if grand_total == 0.0 {
                0.0
            } else {
                total * 100.0 / grand_total
            },
        })
        .collect()
}

fn risk_probability(ranked: &RankedTable, entry: &ScoredRecord) -> Option<f64> {
    ranked
        .cell(entry, RISK_PROBABILITY_HEADER)
        .and_then(parse_amount)
}

/// Empty without a `risk_prob` column. Records outside every level are not
/// counted.
fn risk_levels(ranked: &RankedTable, patterns: Option<&[PaymentPattern]>) -> Vec<RiskLevelEntry> {
    if !ranked.headers.iter().any(|header| header == RISK_PROBABILITY_HEADER) {
        return Vec::new();
    }

    let mut members: HashMap<RiskLevel, Vec<usize>> = HashMap::new();
    for (index, entry) in ranked.entries.iter().enumerate() {
        if let Some(level) = risk_probability(ranked, entry).and_then(RiskLevel::classify) {
            members.entry(level).or_default().push(index);
        }
    }
    let counted: usize = members.values().map(Vec::len).sum();

    RiskLevel::ordered()
        .into_iter()
        .map(|level| {
            let indices = members.get(&level).map(Vec::as_slice).unwrap_or(&[]);
            let count = indices.len();
            RiskLevelEntry {
                label: level.label(),
                count,
                percent: percent(count, counted),
                payment_patterns: patterns
                    .map(|patterns| {
                        pattern_distribution(indices.iter().map(|index| &patterns[*index]))
                    })
                    .unwrap_or_default(),
            }
        })
        .collect()
}

/// Probabilities outside [0, 1] are left out of the histogram.
fn risk_histogram(ranked: &RankedTable) -> Vec<HistogramBin> {
    let probabilities: Vec<f64> = ranked
        .entries
        .iter()
        .filter_map(|entry| risk_probability(ranked, entry))
        .filter(|probability| (0.0..=1.0).contains(probability))
        .collect();
    histogram(&probabilities, RISK_HISTOGRAM_BINS)
}

fn overdue_days(ranked: &RankedTable, entry: &ScoredRecord) -> Option<f64> {
    if ranked.headers.iter().any(|header| header == OVERDUE_DAYS_HEADER) {
        ranked.cell(entry, OVERDUE_DAYS_HEADER).and_then(parse_amount)
    } else {
        entry.record.overdue_days
    }
}

/// Reads `逾期天数`, falling back to `过期天数`. Empty when neither is present.
fn overdue_day_groups(
    ranked: &RankedTable,
    components: &[&'static str],
) -> Vec<OverdueDaysGroupEntry> {
    let has_days = ranked.headers.iter().any(|header| header == OVERDUE_DAYS_HEADER)
        || ranked.columns.contains(Column::OverdueDays);
    if !has_days {
        return Vec::new();
    }

    let mut members: HashMap<OverdueDaysGroup, Vec<&ScoredRecord>> = HashMap::new();
    for entry in &ranked.entries {
        if let Some(group) = overdue_days(ranked, entry).and_then(OverdueDaysGroup::classify) {
            members.entry(group).or_default().push(entry);
        }
    }
    let counted: usize = members.values().map(Vec::len).sum();

    OverdueDaysGroup::ordered()
        .into_iter()
        .map(|group| {
            let entries = members.get(&group).map(Vec::as_slice).unwrap_or(&[]);
            OverdueDaysGroupEntry {
                label: group.label(),
                count: entries.len(),
                percent: percent(entries.len(), counted),
                debt_components: component_shares(ranked, components, entries.iter().copied()),
            }
        })
        .collect()
}

fn debt_ratio_bands(ranked: &RankedTable) -> Vec<DistributionEntry> {
    let mut counts: HashMap<DebtRatioBand, usize> = HashMap::new();
    for entry in &ranked.entries {
        *counts
            .entry(DebtRatioBand::classify(entry.derived.debt_ratio))
            .or_default() += 1;
    }

    distribution(
        DebtRatioBand::ordered()
            .into_iter()
            .map(|band| (band.label(), counts.get(&band).copied().unwrap_or(0))),
        ranked.len(),
    )
}

fn age_bands(ranked: &RankedTable) -> Vec<DistributionEntry> {
    let mut counts: HashMap<AgeBand, usize> = HashMap::new();
    for band in ranked
        .entries
        .iter()
        .filter_map(|entry| entry.derived.age.and_then(AgeBand::classify))
    {
        *counts.entry(band).or_default() += 1;
    }
    let counted = counts.values().sum();

    distribution(
        AgeBand::ordered()
            .into_iter()
            .map(|band| (band.label(), counts.get(&band).copied().unwrap_or(0))),
        counted,
    )
}

fn region_counts(ranked: &RankedTable, limit: usize) -> Vec<RegionCount> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for region in ranked
        .entries
        .iter()
        .filter_map(|entry| entry.derived.region_from_id.as_deref())
    {
        *counts.entry(region).or_default() += 1;
    }

    let mut regions: Vec<RegionCount> = counts
        .into_iter()
        .map(|(region, count)| RegionCount {
            region: region.to_string(),
            count,
        })
        .collect();
    regions.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.region.cmp(&b.region)));
    regions.truncate(limit);
    regions
}

fn distribution<I>(buckets: I, total: usize) -> Vec<DistributionEntry>
where
    I: IntoIterator<Item = (&'static str, usize)>,
{
    buckets
        .into_iter()
        .map(|(label, count)| DistributionEntry {
            label,
            count,
            percent: percent(count, total),
        })
        .collect()
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}
