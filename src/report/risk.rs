use super::views::HistogramBin;
use serde::Serialize;

/// Model-assigned repayment-risk probability column.
pub const RISK_PROBABILITY_HEADER: &str = "risk_prob";

pub const RISK_HISTOGRAM_BINS: usize = 20;

/// Right-closed levels over (-0.01, 0.3], (0.3, 0.7], (0.7, 1.01].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub const fn ordered() -> [Self; 3] {
        [Self::Low, Self::Medium, Self::High]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Low => "低风险",
            Self::Medium => "中风险",
            Self::High => "高风险",
        }
    }

    /// `None` outside (-0.01, 1.01].
    pub fn classify(probability: f64) -> Option<Self> {
        match probability {
            p if p <= -0.01 || p.is_nan() => None,
            p if p <= 0.3 => Some(Self::Low),
            p if p <= 0.7 => Some(Self::Medium),
            p if p <= 1.01 => Some(Self::High),
            _ => None,
        }
    }
}

/// Equal-width histogram spanning the observed range; the last bin is closed
/// on both ends. A single distinct value gets the range `value ± 0.5`.
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (lower, upper) = if min == max {
        (min - 0.5, max + 0.5)
    } else {
        (min, max)
    };
    let width = (upper - lower) / bins as f64;

    let mut counts = vec![0usize; bins];
    for value in values {
        let index = (((value - lower) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(index, count)| HistogramBin {
            lower: lower + width * index as f64,
            upper: if index + 1 == bins {
                upper
            } else {
                lower + width * (index + 1) as f64
            },
            count,
        })
        .collect()
}
