use super::city_tier::CityTierTable;
use super::domain::{DebtorRecord, RecordType};
use super::regions::RegionCodeTable;
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

const REGION_PREFIX_LEN: usize = 6;
const BIRTH_YEAR_START: usize = 6;
const BIRTH_YEAR_LEN: usize = 4;
const PARENT_MARKER: char = '父';

static OVERDUE_PATTERN: OnceLock<Regex> = OnceLock::new();
static DIGIT_PATTERN: OnceLock<Regex> = OnceLock::new();

/// Per-record fields computed from raw columns before any rule runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedFields {
    pub region_from_id: Option<String>,
    pub region_consistency: bool,
    pub debt_ratio: Option<f64>,
    pub overdue_months: u32,
    pub age: Option<i32>,
    pub has_parent_contact: bool,
    pub city_tier_score: u8,
    /// Identity present but unusable for region or birth-year extraction.
    pub identity_malformed: bool,
}

/// Computes [`DerivedFields`] against a shared region table and a fixed
/// reference year.
pub struct FieldDerivation<'a> {
    regions: &'a RegionCodeTable,
    reference_year: i32,
}

impl<'a> FieldDerivation<'a> {
    pub fn new(regions: &'a RegionCodeTable, reference_year: i32) -> Self {
        Self {
            regions,
            reference_year,
        }
    }

    pub fn derive(&self, record: &DebtorRecord, record_type: &RecordType) -> DerivedFields {
        let identity = record.identity_number.as_deref();
        let region_from_id = region_from_id(self.regions, identity);
        let region_consistency =
            region_consistency(region_from_id.as_deref(), record.billing_address.as_deref());

        let debt_ratio = match record_type {
            RecordType::ActiveCase => debt_ratio(record.current_bill_amount, record.principal),
            _ => None,
        };

        let age = age(identity, self.reference_year);

        DerivedFields {
            region_from_id,
            region_consistency,
            debt_ratio,
            overdue_months: overdue_months(record.overdue_period_code.as_deref()),
            age,
            has_parent_contact: has_parent_contact(&record.contact_relationships),
            city_tier_score: CityTierTable::tier_score_for_identity(identity),
            identity_malformed: identity_malformed(identity),
        }
    }
}

/// Region name for the first six characters of the identity number.
pub fn region_from_id(regions: &RegionCodeTable, identity_number: Option<&str>) -> Option<String> {
    let prefix = identity_prefix(identity_number?, REGION_PREFIX_LEN)?;
    regions.lookup(&prefix).map(str::to_string)
}

/// True only when the region is known, the address is non-blank and the
/// address mentions the region verbatim.
pub fn region_consistency(region: Option<&str>, billing_address: Option<&str>) -> bool {
    let Some(region) = region else {
        return false;
    };
    let address = billing_address.unwrap_or("").trim();
    !address.is_empty() && address.contains(region)
}

/// `current_bill_amount / principal - 1`, unavailable for a missing or zero
/// principal.
pub fn debt_ratio(current_bill_amount: Option<f64>, principal: Option<f64>) -> Option<f64> {
    match (current_bill_amount, principal) {
        (Some(bill), Some(principal)) if principal != 0.0 && principal.is_finite() => {
            let ratio = bill / principal - 1.0;
            ratio.is_finite().then_some(ratio)
        }
        _ => None,
    }
}

/// Months encoded as `M<n>` anywhere in the code, case-insensitive; 0 when
/// absent.
pub fn overdue_months(code: Option<&str>) -> u32 {
    let Some(code) = code else {
        return 0;
    };
    let pattern = OVERDUE_PATTERN
        .get_or_init(|| Regex::new(r"M(\d+)").expect("overdue pattern compiles"));
    let upper = code.to_uppercase();

    pattern
        .captures(&upper)
        .and_then(|captures| captures.get(1))
        .map(|digits| decimal_value(digits.as_str()))
        .unwrap_or(0)
}

/// Value of a run of Unicode decimal digits, saturating at `u32::MAX`.
fn decimal_value(digits: &str) -> u32 {
    digits
        .chars()
        .try_fold(0u32, |total, c| {
            total
                .checked_mul(10)
                .and_then(|total| total.checked_add(digit_value(c)))
        })
        .unwrap_or(u32::MAX)
}

/// Decimal digits are encoded in aligned runs of ten starting at zero, so a
/// digit's value is its offset within the run of consecutive digits ending at
/// it, modulo ten.
fn digit_value(c: char) -> u32 {
    if let Some(value) = c.to_digit(10) {
        return value;
    }

    let digit =
        DIGIT_PATTERN.get_or_init(|| Regex::new(r"^\d$").expect("digit pattern compiles"));
    let is_digit = |code: u32| {
        char::from_u32(code)
            .map(|candidate| digit.is_match(candidate.encode_utf8(&mut [0; 4])))
            .unwrap_or(false)
    };

    let code = u32::from(c);
    let offset = (1..code).take_while(|back| is_digit(code - back)).count() as u32;
    offset % 10
}

/// Birth year from the four ASCII digits at positions 6..10.
pub fn birth_year(identity_number: Option<&str>) -> Option<i32> {
    let digits: String = identity_number?
        .chars()
        .skip(BIRTH_YEAR_START)
        .take(BIRTH_YEAR_LEN)
        .collect();
    if digits.len() != BIRTH_YEAR_LEN || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn age(identity_number: Option<&str>, reference_year: i32) -> Option<i32> {
    birth_year(identity_number).map(|year| reference_year - year)
}

pub fn has_parent_contact(relationships: &[String]) -> bool {
    relationships
        .iter()
        .any(|relationship| relationship.contains(PARENT_MARKER))
}

fn identity_prefix(identity: &str, len: usize) -> Option<String> {
    if identity.chars().count() < len {
        return None;
    }
    Some(identity.chars().take(len).collect())
}

fn identity_malformed(identity_number: Option<&str>) -> bool {
    let Some(identity) = identity_number else {
        return false;
    };
    let prefix_ok = identity_prefix(identity, REGION_PREFIX_LEN)
        .map(|prefix| prefix.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false);
    !prefix_ok || birth_year(Some(identity)).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beijing() -> RegionCodeTable {
        RegionCodeTable::from_entries([("110105", "北京")])
    }

    #[test]
    fn region_consistency_requires_region_and_address() {
        let regions = beijing();
        let region = region_from_id(&regions, Some("110105199001011234"));
        assert_eq!(region.as_deref(), Some("北京"));

        assert!(region_consistency(region.as_deref(), Some("北京市朝阳区建国路1号")));
        assert!(!region_consistency(region.as_deref(), Some("   ")));
        assert!(!region_consistency(region.as_deref(), None));
        assert!(!region_consistency(region.as_deref(), Some("上海市黄浦区")));
        assert!(!region_consistency(None, Some("北京市朝阳区")));
    }

    #[test]
    fn short_identity_has_no_region() {
        let regions = beijing();
        assert!(region_from_id(&regions, Some("11010")).is_none());
        assert!(region_from_id(&regions, None).is_none());
    }

    #[test]
    fn debt_ratio_guards_division_hazards() {
        assert_eq!(debt_ratio(Some(150.0), Some(100.0)), Some(0.5));
        assert!(debt_ratio(Some(80.0), Some(100.0)).is_some_and(|ratio| ratio < 0.0));
        assert!(debt_ratio(Some(150.0), Some(0.0)).is_none());
        assert!(debt_ratio(Some(150.0), Some(-0.0)).is_none());
        assert!(debt_ratio(Some(150.0), None).is_none());
        assert!(debt_ratio(None, Some(100.0)).is_none());
    }

    #[test]
    fn overdue_months_parse_m_codes() {
        assert_eq!(overdue_months(Some("M7")), 7);
        assert_eq!(overdue_months(Some("m12")), 12);
        assert_eq!(overdue_months(Some("逾期M3+")), 3);
        assert_eq!(overdue_months(Some("AM-M25")), 25);
        assert_eq!(overdue_months(Some("三期")), 0);
        assert_eq!(overdue_months(None), 0);
        assert_eq!(overdue_months(Some("M99999999999")), u32::MAX);
    }

    #[test]
    fn overdue_months_accept_non_ascii_digits() {
        assert_eq!(overdue_months(Some("M１２")), 12);
        assert_eq!(overdue_months(Some("M٧")), 7);
        assert_eq!(overdue_months(Some("M۱۰")), 10);
        assert_eq!(overdue_months(Some("M９９９９９９９９９９９")), u32::MAX);
    }

    #[test]
    fn age_comes_from_birth_year_digits() {
        assert_eq!(birth_year(Some("110105199001011234")), Some(1990));
        assert_eq!(age(Some("110105199001011234"), 2025), Some(35));
        assert!(birth_year(Some("11010519")).is_none());
        assert!(birth_year(Some("110105ABCD011234")).is_none());
        assert!(age(None, 2025).is_none());
    }

    #[test]
    fn parent_contact_matches_father_character() {
        let relationships = vec!["朋友".to_string(), "父亲".to_string()];
        assert!(has_parent_contact(&relationships));
        assert!(has_parent_contact(&["父母".to_string()]));
        assert!(!has_parent_contact(&["配偶".to_string(), "母亲".to_string()]));
        assert!(!has_parent_contact(&[]));
    }

    #[test]
    fn derive_degrades_malformed_identity_without_failing() {
        let regions = beijing();
        let derivation = FieldDerivation::new(&regions, 2025);
        let mut record = DebtorRecord::new(3);
        record.identity_number = Some("12AB".to_string());
        record.billing_address = Some("北京市".to_string());

        let derived = derivation.derive(&record, &RecordType::ActiveCase);
        assert!(derived.identity_malformed);
        assert!(derived.region_from_id.is_none());
        assert!(!derived.region_consistency);
        assert!(derived.age.is_none());
        assert_eq!(derived.city_tier_score, 5);
    }

    #[test]
    fn debt_ratio_is_only_derived_for_active_cases() {
        let regions = RegionCodeTable::unavailable();
        let derivation = FieldDerivation::new(&regions, 2025);
        let mut record = DebtorRecord::new(0);
        record.principal = Some(100.0);
        record.current_bill_amount = Some(250.0);

        let active = derivation.derive(&record, &RecordType::ActiveCase);
        assert_eq!(active.debt_ratio, Some(1.5));

        let pre = derivation.derive(&record, &RecordType::PreCollection);
        assert!(pre.debt_ratio.is_none());
        assert!(!pre.identity_malformed);
    }
}
