use crate::scoring::parse_amount;
use serde::Serialize;

/// Minimum-repayment history columns, in the order the trailing run is
/// counted.
pub const MINIMUM_PAYMENT_HEADERS: [&str; 9] = [
    "上个月最小还款额",
    "上2个月最小还款额",
    "上3个月最小还款额",
    "上4个月最小还款额",
    "上5个月最小还款额",
    "上6个月最小还款额",
    "上7个月最小还款额",
    "上8个月最小还款额",
    "当期最小还款额",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentPattern {
    LongTermArrears,
    MediumTermArrears,
    ShortTermArrears,
    Regular,
}

impl PaymentPattern {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::LongTermArrears,
            Self::MediumTermArrears,
            Self::ShortTermArrears,
            Self::Regular,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::LongTermArrears => "长期拖欠",
            Self::MediumTermArrears => "中期拖欠",
            Self::ShortTermArrears => "短期拖欠",
            Self::Regular => "正常还款",
        }
    }

    pub fn classify(missed_months: usize) -> Self {
        match missed_months {
            6.. => Self::LongTermArrears,
            3..=5 => Self::MediumTermArrears,
            1..=2 => Self::ShortTermArrears,
            0 => Self::Regular,
        }
    }
}

/// Trailing run of months whose minimum repayment is missing or not positive.
/// A positive payment resets the run.
pub fn missed_months<'a, I>(payments: I) -> usize
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    payments.into_iter().fold(0, |run, cell| {
        match cell.and_then(parse_amount) {
            Some(amount) if amount > 0.0 => 0,
            _ => run + 1,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_payment_resets_the_run() {
        let cells = [Some("0"), None, Some("120.5"), Some("0"), None];
        assert_eq!(missed_months(cells), 2);
        assert_eq!(missed_months([Some("88"), Some("1,200")]), 0);
        assert_eq!(missed_months([Some("-5"), Some("n/a"), None]), 3);
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(PaymentPattern::classify(0), PaymentPattern::Regular);
        assert_eq!(PaymentPattern::classify(1), PaymentPattern::ShortTermArrears);
        assert_eq!(PaymentPattern::classify(2), PaymentPattern::ShortTermArrears);
        assert_eq!(PaymentPattern::classify(3), PaymentPattern::MediumTermArrears);
        assert_eq!(PaymentPattern::classify(5), PaymentPattern::MediumTermArrears);
        assert_eq!(PaymentPattern::classify(6), PaymentPattern::LongTermArrears);
        assert_eq!(PaymentPattern::classify(9), PaymentPattern::LongTermArrears);
    }
}
