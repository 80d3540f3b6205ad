use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtRatioBand {
    UpToHalf,
    UpToFull,
    UpToOneAndHalf,
    AboveOneAndHalf,
    Invalid,
}

impl DebtRatioBand {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::UpToHalf,
            Self::UpToFull,
            Self::UpToOneAndHalf,
            Self::AboveOneAndHalf,
            Self::Invalid,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::UpToHalf => "50%以下",
            Self::UpToFull => "51%-100%",
            Self::UpToOneAndHalf => "101%-150%",
            Self::AboveOneAndHalf => "＞150%",
            Self::Invalid => "无效数据",
        }
    }

    pub fn classify(ratio: Option<f64>) -> Self {
        match ratio {
            Some(r) if r <= 0.5 => Self::UpToHalf,
            Some(r) if r <= 1.0 => Self::UpToFull,
            Some(r) if r <= 1.5 => Self::UpToOneAndHalf,
            Some(_) => Self::AboveOneAndHalf,
            None => Self::Invalid,
        }
    }
}

/// Right-closed age bands: (0,20], (20,30], ... (60,100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBand {
    UpTo20,
    From21To30,
    From31To40,
    From41To50,
    From51To60,
    Above60,
}

impl AgeBand {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::UpTo20,
            Self::From21To30,
            Self::From31To40,
            Self::From41To50,
            Self::From51To60,
            Self::Above60,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::UpTo20 => "20以下",
            Self::From21To30 => "21-30",
            Self::From31To40 => "31-40",
            Self::From41To50 => "41-50",
            Self::From51To60 => "51-60",
            Self::Above60 => "60以上",
        }
    }

    /// `None` outside (0, 100].
    pub fn classify(age: i32) -> Option<Self> {
        match age {
            1..=20 => Some(Self::UpTo20),
            21..=30 => Some(Self::From21To30),
            31..=40 => Some(Self::From31To40),
            41..=50 => Some(Self::From41To50),
            51..=60 => Some(Self::From51To60),
            61..=100 => Some(Self::Above60),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_band_edges_are_inclusive() {
        assert_eq!(DebtRatioBand::classify(Some(0.5)), DebtRatioBand::UpToHalf);
        assert_eq!(DebtRatioBand::classify(Some(1.0)), DebtRatioBand::UpToFull);
        assert_eq!(
            DebtRatioBand::classify(Some(1.5)),
            DebtRatioBand::UpToOneAndHalf
        );
        assert_eq!(
            DebtRatioBand::classify(Some(1.51)),
            DebtRatioBand::AboveOneAndHalf
        );
        assert_eq!(DebtRatioBand::classify(None), DebtRatioBand::Invalid);
    }

    #[test]
    fn age_bands_are_right_closed() {
        assert_eq!(AgeBand::classify(0), None);
        assert_eq!(AgeBand::classify(20), Some(AgeBand::UpTo20));
        assert_eq!(AgeBand::classify(30), Some(AgeBand::From21To30));
        assert_eq!(AgeBand::classify(31), Some(AgeBand::From31To40));
        assert_eq!(AgeBand::classify(100), Some(AgeBand::Above60));
        assert_eq!(AgeBand::classify(101), None);
    }
}
