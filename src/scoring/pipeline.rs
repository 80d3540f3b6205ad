use super::derivation::FieldDerivation;
use super::domain::{ColumnSet, DebtorRecord, RecordType};
use super::regions::RegionCodeTable;
use super::rules::{Rule, RuleInput, RuleKind, ACTIVE_CASE_RULES, PRE_COLLECTION_RULES};
use super::{RankedTable, ScoredRecord, ScoringOptions, ScoringWarning};
use chrono::Datelike;
use std::cmp::Ordering;
use tracing::{debug, info, warn};

pub(crate) fn rank_records(
    regions: &RegionCodeTable,
    options: &ScoringOptions,
    headers: Vec<String>,
    columns: ColumnSet,
    records: Vec<DebtorRecord>,
    record_type: &RecordType,
) -> RankedTable {
    let mut warnings = Vec::new();
    let rules = applicable_rules(record_type, &columns, options, &mut warnings);
    let derivation = FieldDerivation::new(regions, options.as_of.year());
    // Only active-case rules read the identity number.
    let reports_identity = matches!(record_type, RecordType::ActiveCase);

    let mut malformed_rows = Vec::new();
    let mut entries: Vec<ScoredRecord> = records
        .into_iter()
        .map(|record| {
            let derived = derivation.derive(&record, record_type);
            if reports_identity && derived.identity_malformed {
                debug!(row = record.row, "malformed identity number; derived fields degraded");
                malformed_rows.push(record.row);
            }

            let input = RuleInput {
                record: &record,
                derived: &derived,
            };
            let components: Vec<_> = rules.iter().map(|rule| (rule.evaluate)(&input)).collect();
            let score = components
                .iter()
                .fold(0.0, |total, component| total + component.points);

            ScoredRecord {
                record,
                derived,
                components,
                score,
            }
        })
        .collect();

    if !malformed_rows.is_empty() {
        warnings.push(ScoringWarning::MalformedIdentities {
            rows: malformed_rows,
        });
    }

    // Stable: equal scores keep their input order.
    entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    let order = entries.iter().map(|entry| entry.record.row).collect();

    info!(
        record_type = %record_type,
        records = entries.len(),
        top_score = ?entries.first().map(|entry| entry.score),
        warnings = warnings.len(),
        "debtor table ranked"
    );

    RankedTable {
        record_type: record_type.clone(),
        headers,
        columns,
        entries,
        order,
        warnings,
    }
}

fn applicable_rules(
    record_type: &RecordType,
    columns: &ColumnSet,
    options: &ScoringOptions,
    warnings: &mut Vec<ScoringWarning>,
) -> Vec<&'static Rule> {
    let rule_set: &'static [Rule] = match record_type {
        RecordType::ActiveCase => ACTIVE_CASE_RULES,
        RecordType::PreCollection => PRE_COLLECTION_RULES,
        RecordType::Unrecognized(label) => {
            warn!(record_type = %label, "unrecognized record type; no scoring rules apply");
            warnings.push(ScoringWarning::UnrecognizedRecordType {
                label: label.clone(),
            });
            &[]
        }
    };

    rule_set
        .iter()
        .filter(|rule| rule.kind != RuleKind::CityTier || options.apply_city_tier)
        .filter(|rule| {
            let missing = columns.missing(rule.requires);
            if missing.is_empty() {
                return true;
            }
            warn!(rule = rule.kind.label(), ?missing, "input columns missing; rule skipped");
            warnings.push(ScoringWarning::MissingColumns {
                rule: rule.kind,
                columns: missing,
            });
            false
        })
        .collect()
}
