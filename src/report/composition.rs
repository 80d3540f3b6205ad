use serde::Serialize;

/// Debt component columns summed by the composition breakdown.
pub const DEBT_COMPONENT_HEADERS: [&str; 9] = [
    "本金",
    "应收利息",
    "应收费用",
    "违约金",
    "滞纳金",
    "取现手续费",
    "现金分期手续费",
    "账单分期手续费",
    "年费",
];

/// Days-overdue column of profile exports; pre-collection tables carry
/// `过期天数` instead.
pub const OVERDUE_DAYS_HEADER: &str = "逾期天数";

/// Right-closed groups: (-1,30], (30,90], (90,180], (180,360], (360,∞).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverdueDaysGroup {
    Within30,
    From31To90,
    From91To180,
    From181To360,
    Above360,
}

impl OverdueDaysGroup {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Within30,
            Self::From31To90,
            Self::From91To180,
            Self::From181To360,
            Self::Above360,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Within30 => "30天内",
            Self::From31To90 => "31-90天",
            Self::From91To180 => "91-180天",
            Self::From181To360 => "181-360天",
            Self::Above360 => "360天以上",
        }
    }

    pub fn classify(days: f64) -> Option<Self> {
        match days {
            d if d <= -1.0 || d.is_nan() => None,
            d if d <= 30.0 => Some(Self::Within30),
            d if d <= 90.0 => Some(Self::From31To90),
            d if d <= 180.0 => Some(Self::From91To180),
            d if d <= 360.0 => Some(Self::From181To360),
            _ => Some(Self::Above360),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overdue_day_groups_are_right_closed() {
        assert_eq!(OverdueDaysGroup::classify(-1.0), None);
        assert_eq!(OverdueDaysGroup::classify(0.0), Some(OverdueDaysGroup::Within30));
        assert_eq!(OverdueDaysGroup::classify(30.0), Some(OverdueDaysGroup::Within30));
        assert_eq!(OverdueDaysGroup::classify(31.0), Some(OverdueDaysGroup::From31To90));
        assert_eq!(OverdueDaysGroup::classify(90.0), Some(OverdueDaysGroup::From31To90));
        assert_eq!(OverdueDaysGroup::classify(180.0), Some(OverdueDaysGroup::From91To180));
        assert_eq!(OverdueDaysGroup::classify(360.0), Some(OverdueDaysGroup::From181To360));
        assert_eq!(OverdueDaysGroup::classify(361.0), Some(OverdueDaysGroup::Above360));
    }
}
