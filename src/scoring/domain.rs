use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// File-name marker identifying a pre-collection export.
pub const PRE_COLLECTION_MARKER: &str = "前催";

/// Header fragment shared by every contact-relationship column.
pub const RELATIONSHIP_HEADER_FRAGMENT: &str = "关系";

/// Which rule set a batch of debtor records is scored with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordType {
    ActiveCase,
    PreCollection,
    Unrecognized(String),
}

impl RecordType {
    pub fn from_file_name(name: &str) -> Self {
        if name.contains(PRE_COLLECTION_MARKER) {
            Self::PreCollection
        } else {
            Self::ActiveCase
        }
    }

    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        match trimmed.to_ascii_lowercase().as_str() {
            "在案" | "active_case" | "active" => Self::ActiveCase,
            "前催" | "pre_collection" | "pre" => Self::PreCollection,
            _ => Self::Unrecognized(trimmed.to_string()),
        }
    }

    /// An explicit label wins over the file-name heuristic; with neither the
    /// batch is treated as active cases.
    pub fn resolve(label: Option<&str>, file_name: Option<&str>) -> Self {
        match (label, file_name) {
            (Some(label), _) => Self::parse(label),
            (None, Some(name)) => Self::from_file_name(name),
            (None, None) => Self::ActiveCase,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::ActiveCase => "在案",
            Self::PreCollection => "前催",
            Self::Unrecognized(label) => label,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Input columns the scoring rules know how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    IdentityNumber,
    BillingAddress,
    Principal,
    CurrentBillAmount,
    OverduePeriod,
    Relationship,
    LastCashWithdrawal,
    LatestDebtAmount,
    OverdueDays,
    CaseRetained,
}

impl Column {
    pub const fn ordered() -> [Self; 10] {
        [
            Self::IdentityNumber,
            Self::BillingAddress,
            Self::Principal,
            Self::CurrentBillAmount,
            Self::OverduePeriod,
            Self::Relationship,
            Self::LastCashWithdrawal,
            Self::LatestDebtAmount,
            Self::OverdueDays,
            Self::CaseRetained,
        ]
    }

    /// Source header. Relationship columns are matched by fragment instead.
    pub const fn header(self) -> &'static str {
        match self {
            Self::IdentityNumber => "证件号",
            Self::BillingAddress => "账单地址",
            Self::Principal => "本金",
            Self::CurrentBillAmount => "当期账单金额",
            Self::OverduePeriod => "逾期期数",
            Self::Relationship => RELATIONSHIP_HEADER_FRAGMENT,
            Self::LastCashWithdrawal => "最后取现日期",
            Self::LatestDebtAmount => "最新欠款",
            Self::OverdueDays => "过期天数",
            Self::CaseRetained => "留案",
        }
    }

    pub fn matches(self, header: &str) -> bool {
        match self {
            Self::Relationship => header.contains(RELATIONSHIP_HEADER_FRAGMENT),
            other => header == other.header(),
        }
    }
}

/// Recognized columns present in a given input table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnSet {
    present: BTreeSet<Column>,
}

impl ColumnSet {
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let present = Column::ordered()
            .into_iter()
            .filter(|column| headers.iter().any(|header| column.matches(header.as_ref())))
            .collect();
        Self { present }
    }

    pub fn with(mut self, column: Column) -> Self {
        self.present.insert(column);
        self
    }

    pub fn contains(&self, column: Column) -> bool {
        self.present.contains(&column)
    }

    pub fn missing(&self, required: &[Column]) -> Vec<Column> {
        required
            .iter()
            .copied()
            .filter(|column| !self.contains(*column))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = Column> + '_ {
        self.present.iter().copied()
    }
}

/// One debtor row as uploaded. `cells` keeps every original value in header
/// order so exports can reproduce the input shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DebtorRecord {
    pub row: usize,
    pub identity_number: Option<String>,
    pub billing_address: Option<String>,
    pub principal: Option<f64>,
    pub current_bill_amount: Option<f64>,
    pub overdue_period_code: Option<String>,
    pub contact_relationships: Vec<String>,
    pub last_cash_withdrawal: Option<String>,
    pub latest_debt_amount: Option<f64>,
    pub overdue_days: Option<f64>,
    pub case_retained_flag: Option<String>,
    pub cells: Vec<Option<String>>,
}

impl DebtorRecord {
    pub fn new(row: usize) -> Self {
        Self {
            row,
            ..Self::default()
        }
    }

    pub fn last_cash_withdrawal_on(&self) -> Option<NaiveDate> {
        self.last_cash_withdrawal.as_deref().and_then(parse_date)
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }

    ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| {
            NaiveDate::parse_from_str(trimmed, format)
                .ok()
                .or_else(|| {
                    chrono::NaiveDateTime::parse_from_str(trimmed, format)
                        .ok()
                        .map(|dt| dt.date())
                })
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_type_follows_file_name_marker() {
        assert_eq!(
            RecordType::from_file_name("2024-06 前催名单.xlsx"),
            RecordType::PreCollection
        );
        assert_eq!(
            RecordType::from_file_name("2406三手在案.csv"),
            RecordType::ActiveCase
        );
    }

    #[test]
    fn explicit_label_overrides_file_name() {
        let resolved = RecordType::resolve(Some("pre_collection"), Some("在案.csv"));
        assert_eq!(resolved, RecordType::PreCollection);

        let unknown = RecordType::resolve(Some(" 委外 "), None);
        assert_eq!(unknown, RecordType::Unrecognized("委外".to_string()));
        assert_eq!(RecordType::resolve(None, None), RecordType::ActiveCase);
    }

    #[test]
    fn column_set_detects_relationship_fragments() {
        let headers = ["证件号", "联系人1关系", "本金"];
        let columns = ColumnSet::from_headers(&headers);
        assert!(columns.contains(Column::IdentityNumber));
        assert!(columns.contains(Column::Relationship));
        assert!(columns.contains(Column::Principal));
        assert_eq!(
            columns.missing(&[Column::Principal, Column::CurrentBillAmount]),
            vec![Column::CurrentBillAmount]
        );
    }

    #[test]
    fn withdrawal_dates_parse_common_layouts() {
        let mut record = DebtorRecord::new(0);
        record.last_cash_withdrawal = Some("2024/03/05".to_string());
        assert_eq!(
            record.last_cash_withdrawal_on(),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );

        record.last_cash_withdrawal = Some("2024-03-05 10:11:12".to_string());
        assert_eq!(
            record.last_cash_withdrawal_on(),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );

        record.last_cash_withdrawal = Some("上月".to_string());
        assert!(record.last_cash_withdrawal_on().is_none());
    }
}
