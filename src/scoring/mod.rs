//! Collectability scoring: derives per-debtor fields, applies the rule set
//! matching the record type and ranks the batch by total score.

mod city_tier;
pub mod derivation;
mod domain;
mod export;
mod pipeline;
mod regions;
pub mod rules;
mod table;
pub mod views;

pub use city_tier::{CityTierTable, DEFAULT_TIER_SCORE};
pub use derivation::{DerivedFields, FieldDerivation};
pub use domain::{Column, ColumnSet, DebtorRecord, RecordType, PRE_COLLECTION_MARKER};
pub use export::{write_csv, write_csv_to_path, ExportError, DERIVED_HEADERS};
pub use regions::{RegionCodeTable, RegionTableError};
pub use rules::{RuleKind, ScoreComponent};
pub use table::{DebtorTable, TableImportError};

pub(crate) use table::parse_amount;

use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::sync::Arc;

/// Per-run knobs. `as_of` fixes the calendar year used for ages.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoringOptions {
    pub as_of: NaiveDate,
    pub apply_city_tier: bool,
}

impl Default for ScoringOptions {
    fn default() -> Self {
        Self {
            as_of: Local::now().date_naive(),
            apply_city_tier: false,
        }
    }
}

/// Stateless ranker sharing one read-only region table across runs.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    regions: Arc<RegionCodeTable>,
    options: ScoringOptions,
}

impl ScoringEngine {
    pub fn new(regions: Arc<RegionCodeTable>, options: ScoringOptions) -> Self {
        Self { regions, options }
    }

    pub fn options(&self) -> &ScoringOptions {
        &self.options
    }

    pub fn run(&self, table: DebtorTable, record_type: &RecordType) -> RankedTable {
        let (headers, columns, records) = table.into_parts();
        pipeline::rank_records(
            &self.regions,
            &self.options,
            headers,
            columns,
            records,
            record_type,
        )
    }
}

/// A debtor after derivation and scoring. `score` is the sum of `components`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    pub record: DebtorRecord,
    pub derived: DerivedFields,
    pub components: Vec<ScoreComponent>,
    pub score: f64,
}

impl ScoredRecord {
    pub fn component(&self, rule: RuleKind) -> Option<&ScoreComponent> {
        self.components
            .iter()
            .find(|component| component.rule == rule)
    }

    pub fn points_for(&self, rule: RuleKind) -> f64 {
        self.component(rule)
            .map(|component| component.points)
            .unwrap_or(0.0)
    }
}

/// Non-fatal conditions met while ranking a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringWarning {
    UnrecognizedRecordType { label: String },
    MissingColumns { rule: RuleKind, columns: Vec<Column> },
    MalformedIdentities { rows: Vec<usize> },
}

impl ScoringWarning {
    pub fn summary(&self) -> String {
        match self {
            ScoringWarning::UnrecognizedRecordType { label } => {
                format!("record type '{label}' is not recognized; every score is 0")
            }
            ScoringWarning::MissingColumns { rule, columns } => {
                let headers: Vec<&str> = columns.iter().map(|column| column.header()).collect();
                format!(
                    "{} skipped: missing column(s) {}",
                    rule.label(),
                    headers.join(", ")
                )
            }
            ScoringWarning::MalformedIdentities { rows } => format!(
                "{} record(s) with malformed identity numbers scored without region/age",
                rows.len()
            ),
        }
    }
}

/// Ranked output: entries sorted by descending score, original row order
/// preserved among ties.
#[derive(Debug, Clone)]
pub struct RankedTable {
    pub record_type: RecordType,
    pub headers: Vec<String>,
    pub columns: ColumnSet,
    pub entries: Vec<ScoredRecord>,
    pub order: Vec<usize>,
    pub warnings: Vec<ScoringWarning>,
}

impl RankedTable {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top(&self, k: usize) -> &[ScoredRecord] {
        &self.entries[..k.min(self.entries.len())]
    }

    pub fn cell<'a>(&self, entry: &'a ScoredRecord, header: &str) -> Option<&'a str> {
        let index = self.headers.iter().position(|candidate| candidate == header)?;
        entry.record.cells.get(index)?.as_deref()
    }
}
