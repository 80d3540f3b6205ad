use super::derivation::DerivedFields;
use super::domain::{Column, DebtorRecord};
use serde::{Deserialize, Serialize};

/// Age brackets as half-open `[lower, upper)` intervals; first match wins.
/// 30 therefore falls in the 30-40 bracket and 55 in none.
pub const AGE_BRACKETS: [(i32, i32, f64); 3] = [(18, 30, 8.0), (30, 40, 10.0), (40, 55, 5.0)];

pub const RETAINED_FLAG: &str = "是";

const DEBT_MAGNITUDE_UNIT: f64 = 1000.0;
const DEBT_MAGNITUDE_CAP: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    RegionConsistency,
    DebtRatio,
    CityTier,
    OverdueSeverity,
    AgeBracket,
    ParentContact,
    RecentWithdrawal,
    DebtMagnitude,
    OverdueDaysSweetSpot,
    CaseRetained,
}

impl RuleKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::RegionConsistency => "Region consistency",
            Self::DebtRatio => "Debt ratio",
            Self::CityTier => "City tier",
            Self::OverdueSeverity => "Overdue severity",
            Self::AgeBracket => "Age bracket",
            Self::ParentContact => "Parent contact",
            Self::RecentWithdrawal => "Recent withdrawal",
            Self::DebtMagnitude => "Debt magnitude",
            Self::OverdueDaysSweetSpot => "Overdue days sweet-spot",
            Self::CaseRetained => "Case retained",
        }
    }
}

/// Discrete contribution to a debtor's score, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub rule: RuleKind,
    pub points: f64,
    pub notes: String,
}

impl ScoreComponent {
    fn new(rule: RuleKind, points: f64, notes: impl Into<String>) -> Self {
        Self {
            rule,
            points,
            notes: notes.into(),
        }
    }
}

pub(crate) struct RuleInput<'a> {
    pub(crate) record: &'a DebtorRecord,
    pub(crate) derived: &'a DerivedFields,
}

/// A scoring rule and the input columns it cannot run without.
pub(crate) struct Rule {
    pub(crate) kind: RuleKind,
    pub(crate) requires: &'static [Column],
    pub(crate) evaluate: fn(&RuleInput<'_>) -> ScoreComponent,
}

pub(crate) const ACTIVE_CASE_RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::RegionConsistency,
        requires: &[Column::IdentityNumber],
        evaluate: region_consistency_rule,
    },
    Rule {
        kind: RuleKind::DebtRatio,
        requires: &[Column::Principal, Column::CurrentBillAmount],
        evaluate: debt_ratio_rule,
    },
    Rule {
        kind: RuleKind::CityTier,
        requires: &[Column::IdentityNumber],
        evaluate: city_tier_rule,
    },
    Rule {
        kind: RuleKind::OverdueSeverity,
        requires: &[Column::OverduePeriod],
        evaluate: overdue_severity_rule,
    },
    Rule {
        kind: RuleKind::AgeBracket,
        requires: &[Column::IdentityNumber],
        evaluate: age_bracket_rule,
    },
    Rule {
        kind: RuleKind::ParentContact,
        requires: &[Column::Relationship],
        evaluate: parent_contact_rule,
    },
    Rule {
        kind: RuleKind::RecentWithdrawal,
        requires: &[Column::LastCashWithdrawal],
        evaluate: recent_withdrawal_rule,
    },
];

pub(crate) const PRE_COLLECTION_RULES: &[Rule] = &[
    Rule {
        kind: RuleKind::DebtMagnitude,
        requires: &[Column::LatestDebtAmount],
        evaluate: debt_magnitude_rule,
    },
    Rule {
        kind: RuleKind::OverdueDaysSweetSpot,
        requires: &[Column::OverdueDays],
        evaluate: overdue_days_rule,
    },
    Rule {
        kind: RuleKind::CaseRetained,
        requires: &[Column::CaseRetained],
        evaluate: case_retained_rule,
    },
];

pub fn debt_ratio_points(ratio: Option<f64>) -> f64 {
    match ratio {
        Some(r) if r <= 0.5 => 10.0,
        Some(r) if r <= 1.0 => 8.0,
        Some(r) if r <= 1.5 => 5.0,
        _ => 0.0,
    }
}

pub fn overdue_points(months: u32) -> f64 {
    match months {
        0..=3 => 10.0,
        4..=12 => 8.0,
        13..=24 => 5.0,
        _ => 0.0,
    }
}

pub fn age_points(age: Option<i32>) -> f64 {
    let Some(age) = age else {
        return 0.0;
    };
    AGE_BRACKETS
        .iter()
        .find(|(lower, upper, _)| (*lower..*upper).contains(&age))
        .map(|(_, _, points)| *points)
        .unwrap_or(0.0)
}

pub fn debt_magnitude_points(latest_debt_amount: Option<f64>) -> f64 {
    latest_debt_amount
        .map(|amount| (amount / DEBT_MAGNITUDE_UNIT).clamp(0.0, DEBT_MAGNITUDE_CAP))
        .unwrap_or(0.0)
}

pub fn overdue_days_points(overdue_days: Option<f64>) -> f64 {
    match overdue_days {
        Some(days) if (30.0..=90.0).contains(&days) => 10.0,
        _ => 0.0,
    }
}

fn region_consistency_rule(input: &RuleInput<'_>) -> ScoreComponent {
    let derived = input.derived;
    match (&derived.region_from_id, derived.region_consistency) {
        (Some(region), true) => ScoreComponent::new(
            RuleKind::RegionConsistency,
            10.0,
            format!("billing address lies in identity region {region}"),
        ),
        (Some(region), false) => ScoreComponent::new(
            RuleKind::RegionConsistency,
            0.0,
            format!("billing address outside identity region {region}"),
        ),
        (None, _) => ScoreComponent::new(
            RuleKind::RegionConsistency,
            0.0,
            "identity region unknown",
        ),
    }
}

fn debt_ratio_rule(input: &RuleInput<'_>) -> ScoreComponent {
    let ratio = input.derived.debt_ratio;
    let points = debt_ratio_points(ratio);
    let notes = match ratio {
        Some(r) => format!("bill exceeds principal by {:.0}%", r * 100.0),
        None => "debt ratio unavailable".to_string(),
    };
    ScoreComponent::new(RuleKind::DebtRatio, points, notes)
}

fn city_tier_rule(input: &RuleInput<'_>) -> ScoreComponent {
    let tier = input.derived.city_tier_score;
    ScoreComponent::new(
        RuleKind::CityTier,
        f64::from(tier),
        format!("city tier score {tier}"),
    )
}

fn overdue_severity_rule(input: &RuleInput<'_>) -> ScoreComponent {
    let months = input.derived.overdue_months;
    ScoreComponent::new(
        RuleKind::OverdueSeverity,
        overdue_points(months),
        format!("{months} month(s) overdue"),
    )
}

fn age_bracket_rule(input: &RuleInput<'_>) -> ScoreComponent {
    let age = input.derived.age;
    let notes = match age {
        Some(age) => format!("age {age}"),
        None => "age unknown".to_string(),
    };
    ScoreComponent::new(RuleKind::AgeBracket, age_points(age), notes)
}

fn parent_contact_rule(input: &RuleInput<'_>) -> ScoreComponent {
    if input.derived.has_parent_contact {
        ScoreComponent::new(RuleKind::ParentContact, 5.0, "parent listed as contact")
    } else {
        ScoreComponent::new(RuleKind::ParentContact, 0.0, "no parent contact")
    }
}

/// Any recorded withdrawal scores; the date only normalizes the notes.
fn recent_withdrawal_rule(input: &RuleInput<'_>) -> ScoreComponent {
    let record = input.record;
    match (&record.last_cash_withdrawal, record.last_cash_withdrawal_on()) {
        (Some(_), Some(date)) => ScoreComponent::new(
            RuleKind::RecentWithdrawal,
            5.0,
            format!("last cash withdrawal on {date}"),
        ),
        (Some(raw), None) => ScoreComponent::new(
            RuleKind::RecentWithdrawal,
            5.0,
            format!("last cash withdrawal recorded as '{raw}'"),
        ),
        (None, _) => ScoreComponent::new(RuleKind::RecentWithdrawal, 0.0, "no cash withdrawal"),
    }
}

fn debt_magnitude_rule(input: &RuleInput<'_>) -> ScoreComponent {
    let amount = input.record.latest_debt_amount;
    let notes = match amount {
        Some(amount) => format!("latest debt {amount:.2}"),
        None => "latest debt unavailable".to_string(),
    };
    ScoreComponent::new(RuleKind::DebtMagnitude, debt_magnitude_points(amount), notes)
}

fn overdue_days_rule(input: &RuleInput<'_>) -> ScoreComponent {
    let days = input.record.overdue_days;
    let notes = match days {
        Some(days) => format!("{days:.0} day(s) overdue"),
        None => "overdue days unavailable".to_string(),
    };
    ScoreComponent::new(
        RuleKind::OverdueDaysSweetSpot,
        overdue_days_points(days),
        notes,
    )
}

fn case_retained_rule(input: &RuleInput<'_>) -> ScoreComponent {
    let retained = input
        .record
        .case_retained_flag
        .as_deref()
        .map(|flag| flag.trim() == RETAINED_FLAG)
        .unwrap_or(false);
    if retained {
        ScoreComponent::new(RuleKind::CaseRetained, 5.0, "case retained")
    } else {
        ScoreComponent::new(RuleKind::CaseRetained, 0.0, "case not retained")
    }
}
