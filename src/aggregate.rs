use serde::{Deserialize, Serialize};

use crate::error::{EcoError, Result};
use crate::score::ScoreReport;

/// Coarse classification of a 0..=100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl Tier {
    /// poor < 40 <= fair < 60 <= good < 80 <= excellent
    pub fn from_score(score: u32) -> Self {
        match score {
            80.. => Tier::Excellent,
            60..=79 => Tier::Good,
            40..=59 => Tier::Fair,
            _ => Tier::Poor,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Poor => "poor",
            Tier::Fair => "fair",
            Tier::Good => "good",
            Tier::Excellent => "excellent",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    pub overall: u32,
    pub tier: Tier,
}

/// Mean of the present category scores, rounded half up, and its tier
pub fn aggregate(report: &ScoreReport) -> Result<Aggregate> {
    let (sum, count) = report
        .iter()
        .fold((0u32, 0u32), |(sum, count), (_, s)| (sum + u32::from(s.score), count + 1));

    if count == 0 {
        return Err(EcoError::EmptyReport);
    }

    // round(sum / count) with halves rounded up, in integers
    let overall = (2 * sum + count) / (2 * count);
    Ok(Aggregate { overall, tier: Tier::from_score(overall) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::score::Category;

    fn report(scores: &[(Category, u8)]) -> ScoreReport {
        scores
            .iter()
            .fold(ScoreReport::default(), |r, (c, s)| r.with(*c, *s, ""))
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(Tier::from_score(0), Tier::Poor);
        assert_eq!(Tier::from_score(39), Tier::Poor);
        assert_eq!(Tier::from_score(40), Tier::Fair);
        assert_eq!(Tier::from_score(59), Tier::Fair);
        assert_eq!(Tier::from_score(60), Tier::Good);
        assert_eq!(Tier::from_score(79), Tier::Good);
        assert_eq!(Tier::from_score(80), Tier::Excellent);
        assert_eq!(Tier::from_score(100), Tier::Excellent);
    }

    #[test]
    fn test_mean_of_four() {
        let r = report(&[
            (Category::ShippingEmissions, 90),
            (Category::MaterialSustainability, 70),
            (Category::ProductLifecycle, 80),
            (Category::CompanyPractices, 100),
        ]);
        assert_eq!(aggregate(&r).unwrap(), Aggregate { overall: 85, tier: Tier::Excellent });
    }

    #[test]
    fn test_round_half_up() {
        let r = report(&[(Category::ShippingEmissions, 59), (Category::MaterialSustainability, 60)]);
        assert_eq!(aggregate(&r).unwrap().overall, 60);

        let r = report(&[
            (Category::ShippingEmissions, 40),
            (Category::MaterialSustainability, 40),
            (Category::ProductLifecycle, 41),
        ]);
        // 40.33 rounds down
        assert_eq!(aggregate(&r).unwrap().overall, 40);
    }

    #[test]
    fn test_partial_report() {
        let r = report(&[(Category::CompanyPractices, 39)]);
        assert_eq!(aggregate(&r).unwrap(), Aggregate { overall: 39, tier: Tier::Poor });
    }

    #[test]
    fn test_empty_report() {
        assert!(matches!(aggregate(&ScoreReport::default()), Err(EcoError::EmptyReport)));
    }

    #[test]
    fn test_idempotent() {
        let r = report(&[(Category::ShippingEmissions, 61), (Category::ProductLifecycle, 78)]);
        let first = aggregate(&r).unwrap();
        for _ in 0..3 {
            assert_eq!(aggregate(&r).unwrap(), first);
        }
    }
}
