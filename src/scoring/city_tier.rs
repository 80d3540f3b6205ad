use std::collections::HashMap;
use std::sync::OnceLock;

/// Tier score for prefixes outside the table and for short identities.
pub const DEFAULT_TIER_SCORE: u8 = 5;

const FIRST_TIER_SCORE: u8 = 10;
const SECOND_TIER_SCORE: u8 = 8;
const LOWER_TIER_SCORE: u8 = 5;

const FIRST_TIER: &[&str] = &["1101", "3101", "4401", "4403"];

const SECOND_TIER: &[&str] = &[
    "2101", "3501", "2102", "5301", "2301", "3701", "4406", "2201", "3303", "1301",
    "4501", "3204", "3505", "3601", "5201", "1401", "3706", "3304", "3206", "3307",
    "4404", "4413", "3203", "4601", "6501", "3306", "4420", "3310", "6201", "3707",
    "5101", "3301", "3201", "4201", "3205", "5001", "1201", "4301", "3702", "3302",
    "3202", "6101", "4101", "3401", "3502", "4419",
];

// Third- and fourth-tier cities share one score.
const LOWER_TIER: &[&str] = &[
    "1306", "3211", "3210", "4503", "1302", "4602", "3305", "1501", "1310", "4103",
    "3710", "3209", "3713", "4407", "4405", "3212", "3506", "1304", "3708", "3402",
    "3703", "6401", "4502", "5107", "4408", "2103", "3607", "2306", "4205", "1502",
    "6104", "1303", "4302", "3503", "2202", "3208", "4412", "3509", "4304", "3507",
    "3207", "2106", "5307", "4452", "2224", "3309", "3604", "3508", "1309", "2104",
    "4206", "3611", "2108", "3504", "3403", "3311", "4306", "4418", "4210", "3709",
    "3308", "2111", "3705", "4113", "3405", "5113", "6301", "4209", "2302", "5115",
    "5111", "4303", "5203", "3213", "4107", "4115", "3411", "2107", "4451", "4211",
    "4102", "5106", "3714", "4414", "1506", "1305", "4409", "5329", "4402", "4114",
    "3408", "4202", "3415", "4509", "3609", "4505", "2310", "1307", "4504", "3711",
    "4212", "4307", "2308", "5325", "5226", "4417", "1407", "6105", "1507", "4228",
    "4416", "4310", "3412", "3715", "1402", "6103", "4110", "1504", "1408", "4105",
    "1410", "3418", "5303", "5328", "4305", "2114", "4104", "2110", "3717", "2105",
    "4117", "4415", "4108", "3410", "4312", "2203", "6108", "4203", "3716", "3610",
    "3404", "4116", "5227", "5105", "5304", "5114", "2205", "3413", "3704", "5110",
    "5109", "3608", "1505", "3602", "2109", "5118", "2112", "1308", "4313",
];

static CITY_TIER_MAP: OnceLock<HashMap<&'static str, u8>> = OnceLock::new();

/// Four-digit administrative prefix to city-tier score.
#[derive(Debug, Clone, Copy, Default)]
pub struct CityTierTable;

impl CityTierTable {
    pub fn tier_score(prefix: &str) -> u8 {
        city_tier_map()
            .get(prefix)
            .copied()
            .unwrap_or(DEFAULT_TIER_SCORE)
    }

    pub fn tier_score_for_identity(identity_number: Option<&str>) -> u8 {
        let Some(identity) = identity_number else {
            return DEFAULT_TIER_SCORE;
        };
        if identity.chars().count() < 4 {
            return DEFAULT_TIER_SCORE;
        }
        let prefix: String = identity.chars().take(4).collect();
        Self::tier_score(&prefix)
    }
}

fn city_tier_map() -> &'static HashMap<&'static str, u8> {
    CITY_TIER_MAP.get_or_init(|| {
        let tiers = [
            (FIRST_TIER, FIRST_TIER_SCORE),
            (SECOND_TIER, SECOND_TIER_SCORE),
            (LOWER_TIER, LOWER_TIER_SCORE),
        ];
        tiers
            .iter()
            .flat_map(|(prefixes, score)| prefixes.iter().map(move |prefix| (*prefix, *score)))
            .collect()
    })
}
