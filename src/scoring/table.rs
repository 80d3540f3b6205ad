use super::domain::{Column, ColumnSet, DebtorRecord};
use std::io::Read;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum TableImportError {
    #[error("failed to read debtor table: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid debtor table data: {0}")]
    Csv(#[from] csv::Error),
}

/// In-memory debtor table: original headers, recognized columns and rows.
#[derive(Debug, Clone, Default)]
pub struct DebtorTable {
    headers: Vec<String>,
    columns: ColumnSet,
    records: Vec<DebtorRecord>,
}

impl DebtorTable {
    pub fn new(headers: Vec<String>, records: Vec<DebtorRecord>) -> Self {
        let columns = ColumnSet::from_headers(&headers);
        Self {
            headers,
            columns,
            records,
        }
    }

    /// Builds a table from typed records only, declaring which columns the
    /// upstream source carried.
    pub fn from_records(columns: ColumnSet, records: Vec<DebtorRecord>) -> Self {
        Self {
            headers: Vec::new(),
            columns,
            records,
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TableImportError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, TableImportError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = csv_reader.headers()?.iter().map(str::to_string).collect();
        let layout = ColumnLayout::from_headers(&headers);

        let mut records = Vec::new();
        for (row, result) in csv_reader.records().enumerate() {
            let raw = result?;
            let cells: Vec<Option<String>> = (0..headers.len())
                .map(|index| raw.get(index).and_then(non_empty))
                .collect();
            records.push(layout.record(row, cells));
        }

        Ok(Self::new(headers, records))
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    pub fn records(&self) -> &[DebtorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_parts(self) -> (Vec<String>, ColumnSet, Vec<DebtorRecord>) {
        (self.headers, self.columns, self.records)
    }
}

/// Header positions of every recognized column.
struct ColumnLayout {
    identity_number: Option<usize>,
    billing_address: Option<usize>,
    principal: Option<usize>,
    current_bill_amount: Option<usize>,
    overdue_period: Option<usize>,
    relationships: Vec<usize>,
    last_cash_withdrawal: Option<usize>,
    latest_debt_amount: Option<usize>,
    overdue_days: Option<usize>,
    case_retained: Option<usize>,
}

impl ColumnLayout {
    fn from_headers(headers: &[String]) -> Self {
        let position = |column: Column| headers.iter().position(|header| column.matches(header));

        Self {
            identity_number: position(Column::IdentityNumber),
            billing_address: position(Column::BillingAddress),
            principal: position(Column::Principal),
            current_bill_amount: position(Column::CurrentBillAmount),
            overdue_period: position(Column::OverduePeriod),
            relationships: headers
                .iter()
                .enumerate()
                .filter(|(_, header)| Column::Relationship.matches(header))
                .map(|(index, _)| index)
                .collect(),
            last_cash_withdrawal: position(Column::LastCashWithdrawal),
            latest_debt_amount: position(Column::LatestDebtAmount),
            overdue_days: position(Column::OverdueDays),
            case_retained: position(Column::CaseRetained),
        }
    }

    fn record(&self, row: usize, cells: Vec<Option<String>>) -> DebtorRecord {
        let text = |index: Option<usize>| index.and_then(|i| cells.get(i).cloned().flatten());
        let amount = |index: Option<usize>| text(index).as_deref().and_then(parse_amount);

        DebtorRecord {
            row,
            identity_number: text(self.identity_number),
            billing_address: text(self.billing_address),
            principal: amount(self.principal),
            current_bill_amount: amount(self.current_bill_amount),
            overdue_period_code: text(self.overdue_period),
            contact_relationships: self
                .relationships
                .iter()
                .filter_map(|index| text(Some(*index)))
                .collect(),
            last_cash_withdrawal: text(self.last_cash_withdrawal),
            latest_debt_amount: amount(self.latest_debt_amount),
            overdue_days: amount(self.overdue_days),
            case_retained_flag: text(self.case_retained),
            cells,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Lenient numeric parsing: unparseable cells become null rather than errors.
pub(crate) fn parse_amount(value: &str) -> Option<f64> {
    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| *c != ',' && *c != '，')
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn reader_maps_known_headers_into_typed_fields() {
        let csv = "\u{feff}姓名,证件号,本金,当期账单金额,逾期期数,联系人关系,紧急联系人关系,最后取现日期\n\
张三,110105199001011234,\"10,000\",12000,M3,朋友,父亲,2024-01-02\n\
李四,,abc,,,,,\n";

        let table = DebtorTable::from_reader(Cursor::new(csv)).expect("table parses");
        assert_eq!(table.headers()[0], "姓名");
        assert_eq!(table.len(), 2);
        assert!(table.columns().contains(Column::Relationship));
        assert!(!table.columns().contains(Column::LatestDebtAmount));

        let first = &table.records()[0];
        assert_eq!(first.row, 0);
        assert_eq!(first.identity_number.as_deref(), Some("110105199001011234"));
        assert_eq!(first.principal, Some(10_000.0));
        assert_eq!(first.current_bill_amount, Some(12_000.0));
        assert_eq!(first.overdue_period_code.as_deref(), Some("M3"));
        assert_eq!(first.contact_relationships, vec!["朋友", "父亲"]);
        assert_eq!(first.cells.len(), 8);

        let second = &table.records()[1];
        assert!(second.identity_number.is_none());
        assert!(second.principal.is_none());
        assert!(second.contact_relationships.is_empty());
    }

    #[test]
    fn short_rows_are_padded_with_nulls() {
        let csv = "证件号,最新欠款,过期天数\n110105199001011234\n";
        let table = DebtorTable::from_reader(Cursor::new(csv)).expect("table parses");
        let record = &table.records()[0];
        assert_eq!(record.cells, vec![Some("110105199001011234".to_string()), None, None]);
        assert!(record.latest_debt_amount.is_none());
    }

    #[test]
    fn amounts_tolerate_separators_and_reject_text() {
        assert_eq!(parse_amount(" 1,234.5 "), Some(1234.5));
        assert_eq!(parse_amount("-20"), Some(-20.0));
        assert_eq!(parse_amount("NaN"), None);
        assert_eq!(parse_amount("未知"), None);
    }

    #[test]
    fn from_path_propagates_io_errors() {
        let error = DebtorTable::from_path("./does-not-exist.csv").expect_err("expected io error");
        match error {
            TableImportError::Io(_) => {}
            other => panic!("expected io error, got {other:?}"),
        }
    }
}
