use super::{RankedTable, ScoredRecord};
use std::io::Write;
use std::path::Path;

/// Columns appended after the original headers, in output order.
pub const DERIVED_HEADERS: [&str; 8] = [
    "身份证地区",
    "地区一致性",
    "欠款占比",
    "逾期期数数值",
    "年龄",
    "是否有父母联系人",
    "地区得分",
    "评分",
];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write ranked table: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode ranked table: {0}")]
    Csv(#[from] csv::Error),
}

pub fn write_csv<W: Write>(ranked: &RankedTable, writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);

    let header_row: Vec<&str> = ranked
        .headers
        .iter()
        .map(String::as_str)
        .chain(DERIVED_HEADERS)
        .collect();
    csv_writer.write_record(&header_row)?;

    for entry in &ranked.entries {
        let mut row: Vec<String> = (0..ranked.headers.len())
            .map(|index| {
                entry
                    .record
                    .cells
                    .get(index)
                    .cloned()
                    .flatten()
                    .unwrap_or_default()
            })
            .collect();
        row.extend(derived_cells(entry));
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

pub fn write_csv_to_path<P: AsRef<Path>>(ranked: &RankedTable, path: P) -> Result<(), ExportError> {
    let file = std::fs::File::create(path)?;
    write_csv(ranked, file)
}

fn derived_cells(entry: &ScoredRecord) -> [String; 8] {
    let derived = &entry.derived;
    [
        derived.region_from_id.clone().unwrap_or_default(),
        derived.region_consistency.to_string(),
        derived
            .debt_ratio
            .map(|ratio| format!("{ratio:.4}"))
            .unwrap_or_default(),
        derived.overdue_months.to_string(),
        derived.age.map(|age| age.to_string()).unwrap_or_default(),
        derived.has_parent_contact.to_string(),
        derived.city_tier_score.to_string(),
        format_score(entry.score),
    ]
}

pub(crate) fn format_score(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.0}")
    } else {
        format!("{score:.2}")
    }
}
