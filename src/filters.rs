//! Chart filter resolvers
//!
//! Maps the dashboard's named lookback periods and volume buckets to the
//! concrete query bounds the storage layer binds as parameters. Both
//! resolvers are pure lookup tables.

use serde::{Deserialize, Serialize};

/// Named lookback window bounding time-series queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    OneMonth,
    ThreeMonths,
    SixMonths,
    OneYear,
    FiveYears,
    #[default]
    Max,
}

impl Period {
    /// Resolve a dashboard label.
    ///
    /// Unrecognized labels fall back to one month rather than failing.
    /// This mirrors the dashboard's historical behavior; callers that need
    /// strict validation should match on the known labels first.
    pub fn parse(label: &str) -> Self {
        match label {
            "1 month" => Period::OneMonth,
            "3 months" => Period::ThreeMonths,
            "6 months" => Period::SixMonths,
            "1 year" => Period::OneYear,
            "5 years" => Period::FiveYears,
            "max" => Period::Max,
            _ => Period::OneMonth,
        }
    }

    /// Lookback in days, or `None` when the window is unbounded
    pub fn days(&self) -> Option<i64> {
        match self {
            Period::OneMonth => Some(30),
            Period::ThreeMonths => Some(90),
            Period::SixMonths => Some(180),
            Period::OneYear => Some(365),
            Period::FiveYears => Some(1825),
            Period::Max => None,
        }
    }

    /// Display label matching the dashboard's buttons
    pub fn label(&self) -> &'static str {
        match self {
            Period::OneMonth => "1 month",
            Period::ThreeMonths => "3 months",
            Period::SixMonths => "6 months",
            Period::OneYear => "1 year",
            Period::FiveYears => "5 years",
            Period::Max => "max",
        }
    }
}

/// Named range of daily traded-share counts used as a display filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VolumeBucket {
    VeryLow,
    Low,
    Medium,
    High,
    VeryHigh,
    #[default]
    All,
}

impl VolumeBucket {
    /// Resolve a dashboard label. Unrecognized labels resolve to `All`.
    pub fn parse(label: &str) -> Self {
        match label {
            "very_low" => VolumeBucket::VeryLow,
            "low" => VolumeBucket::Low,
            "medium" => VolumeBucket::Medium,
            "high" => VolumeBucket::High,
            "very_high" => VolumeBucket::VeryHigh,
            "all" => VolumeBucket::All,
            _ => VolumeBucket::All,
        }
    }

    /// Half-open `[min, max)` volume range; `None` max means unbounded.
    ///
    /// The buckets tile `[0, inf)` with no gaps and no overlap.
    pub fn range(&self) -> (i64, Option<i64>) {
        match self {
            VolumeBucket::VeryLow => (0, Some(100_000)),
            VolumeBucket::Low => (100_000, Some(500_000)),
            VolumeBucket::Medium => (500_000, Some(1_000_000)),
            VolumeBucket::High => (1_000_000, Some(5_000_000)),
            VolumeBucket::VeryHigh => (5_000_000, None),
            VolumeBucket::All => (0, None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_day_counts() {
        assert_eq!(Period::parse("1 month").days(), Some(30));
        assert_eq!(Period::parse("3 months").days(), Some(90));
        assert_eq!(Period::parse("6 months").days(), Some(180));
        assert_eq!(Period::parse("1 year").days(), Some(365));
        assert_eq!(Period::parse("5 years").days(), Some(1825));
        assert_eq!(Period::parse("max").days(), None);
    }

    #[test]
    fn unknown_period_defaults_to_one_month() {
        assert_eq!(Period::parse("2 weeks"), Period::OneMonth);
        assert_eq!(Period::parse(""), Period::OneMonth);
    }

    #[test]
    fn unknown_bucket_defaults_to_all() {
        assert_eq!(VolumeBucket::parse("gigantic"), VolumeBucket::All);
        assert_eq!(VolumeBucket::parse(""), VolumeBucket::All);
    }

    #[test]
    fn bucket_ranges_tile_the_volume_axis() {
        let buckets = [
            VolumeBucket::VeryLow,
            VolumeBucket::Low,
            VolumeBucket::Medium,
            VolumeBucket::High,
            VolumeBucket::VeryHigh,
        ];

        // Each bucket starts exactly where the previous one ends
        let mut expected_min = 0;
        for bucket in buckets {
            let (min, max) = bucket.range();
            assert_eq!(min, expected_min, "gap or overlap before {:?}", bucket);
            match max {
                Some(max) => {
                    assert!(max > min);
                    expected_min = max;
                }
                None => assert_eq!(bucket, VolumeBucket::VeryHigh),
            }
        }

        // The catch-all covers everything
        assert_eq!(VolumeBucket::All.range(), (0, None));
    }
}
