use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    ElaResult,
    error::{ForensicsError, Result},
};

pub const DEFAULT_LOW_CUTOFF: f64 = 10.0;
pub const DEFAULT_HIGH_CUTOFF: f64 = 35.0;
pub const DEFAULT_COUNT_CUTOFF: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    LowRisk,
    Uncertain,
    HighRisk,
}

impl RiskLevel {
    pub fn description(&self) -> &'static str {
        match self {
            RiskLevel::LowRisk => "likely authentic",
            RiskLevel::Uncertain => "uncertain",
            RiskLevel::HighRisk => "likely manipulated",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RiskLevel::LowRisk => "Low Risk",
            RiskLevel::Uncertain => "Uncertain",
            RiskLevel::HighRisk => "High Risk",
        };
        f.write_str(label)
    }
}

/// Three-way decision on ELA dispersion. Values equal to either cutoff are
/// `Uncertain`. Fails unless both cutoffs are finite and `low < high`.
pub fn classify(dispersion: f64, low_cutoff: f64, high_cutoff: f64) -> Result<RiskLevel> {
    validate_cutoffs(low_cutoff, high_cutoff)?;

    Ok(match dispersion {
        d if d > high_cutoff => RiskLevel::HighRisk,
        d if d < low_cutoff => RiskLevel::LowRisk,
        _ => RiskLevel::Uncertain,
    })
}

/// Decision on an anomaly count: none is `LowRisk`, more than `cutoff` is
/// `HighRisk`, anything in between is `Uncertain`.
pub fn classify_count(measure: usize, cutoff: usize) -> RiskLevel {
    match measure {
        0 => RiskLevel::LowRisk,
        m if m > cutoff => RiskLevel::HighRisk,
        _ => RiskLevel::Uncertain,
    }
}

fn validate_cutoffs(low_cutoff: f64, high_cutoff: f64) -> Result<()> {
    if !low_cutoff.is_finite() || !high_cutoff.is_finite() {
        return Err(ForensicsError::InvalidParameter(format!(
            "cutoffs must be finite, got low={} high={}",
            low_cutoff, high_cutoff
        )));
    }

    if low_cutoff >= high_cutoff {
        return Err(ForensicsError::InvalidParameter(format!(
            "low cutoff {} must be below high cutoff {}",
            low_cutoff, high_cutoff
        )));
    }

    Ok(())
}

/// Which ELA statistic drives the risk decision.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum ClassificationPolicy {
    Dispersion { low_cutoff: f64, high_cutoff: f64 },
    /// Reads [`ElaResult::anomaly_measure`], so the count is pixels or
    /// regions depending on the aggregation strategy.
    AnomalyCount { cutoff: usize },
}

impl Default for ClassificationPolicy {
    fn default() -> Self {
        ClassificationPolicy::Dispersion {
            low_cutoff: DEFAULT_LOW_CUTOFF,
            high_cutoff: DEFAULT_HIGH_CUTOFF,
        }
    }
}

impl ClassificationPolicy {
    pub fn anomaly_count() -> Self {
        ClassificationPolicy::AnomalyCount {
            cutoff: DEFAULT_COUNT_CUTOFF,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            ClassificationPolicy::Dispersion {
                low_cutoff,
                high_cutoff,
            } => validate_cutoffs(low_cutoff, high_cutoff),
            ClassificationPolicy::AnomalyCount { .. } => Ok(()),
        }
    }

    pub fn evaluate(&self, result: &ElaResult) -> Result<RiskLevel> {
        match *self {
            ClassificationPolicy::Dispersion {
                low_cutoff,
                high_cutoff,
            } => classify(result.dispersion(), low_cutoff, high_cutoff),
            ClassificationPolicy::AnomalyCount { cutoff } => {
                Ok(classify_count(result.anomaly_measure(), cutoff))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgb, RgbImage};

    use super::*;
    use crate::{analysis::ela::ElaAnalyzer, analysis::regions::Aggregation};

    #[test]
    fn test_classification_boundaries() {
        assert_eq!(classify(9.99, 10.0, 35.0).unwrap(), RiskLevel::LowRisk);
        assert_eq!(classify(10.0, 10.0, 35.0).unwrap(), RiskLevel::Uncertain);
        assert_eq!(classify(20.0, 10.0, 35.0).unwrap(), RiskLevel::Uncertain);
        assert_eq!(classify(35.0, 10.0, 35.0).unwrap(), RiskLevel::Uncertain);
        assert_eq!(classify(35.01, 10.0, 35.0).unwrap(), RiskLevel::HighRisk);
    }

    #[test]
    fn test_misordered_cutoffs_rejected() {
        assert!(matches!(
            classify(20.0, 35.0, 10.0),
            Err(ForensicsError::InvalidParameter(_))
        ));
        assert!(matches!(
            classify(20.0, 10.0, 10.0),
            Err(ForensicsError::InvalidParameter(_))
        ));
        assert!(classify(20.0, f64::NAN, 35.0).is_err());
        assert!(classify(20.0, 10.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_count_classification() {
        assert_eq!(classify_count(0, 3), RiskLevel::LowRisk);
        assert_eq!(classify_count(1, 3), RiskLevel::Uncertain);
        assert_eq!(classify_count(3, 3), RiskLevel::Uncertain);
        assert_eq!(classify_count(4, 3), RiskLevel::HighRisk);
    }

    #[test]
    fn test_labels() {
        assert_eq!(RiskLevel::HighRisk.to_string(), "High Risk");
        assert_eq!(RiskLevel::LowRisk.description(), "likely authentic");
    }

    #[test]
    fn test_policy_reads_aggregated_measure() {
        let original = RgbImage::from_pixel(16, 16, Rgb([100, 100, 100]));
        let mut recompressed = original.clone();
        for y in 2..6 {
            for x in 2..6 {
                recompressed.put_pixel(x, y, Rgb([140, 140, 140]));
            }
        }
        recompressed.put_pixel(12, 12, Rgb([140, 140, 140]));

        let pixels = ElaAnalyzer::new(90, 50)
            .unwrap()
            .compare(&original, &recompressed)
            .unwrap();
        assert_eq!(pixels.anomaly_measure(), 17);
        assert_eq!(
            ClassificationPolicy::anomaly_count().evaluate(&pixels).unwrap(),
            RiskLevel::HighRisk
        );

        let regions = ElaAnalyzer::new(90, 50)
            .unwrap()
            .with_aggregation(Aggregation::ConnectedRegions { min_area: 4 })
            .compare(&original, &recompressed)
            .unwrap();
        assert_eq!(regions.anomaly_count(), 17);
        assert_eq!(regions.anomaly_measure(), 1);
        assert_eq!(
            ClassificationPolicy::anomaly_count().evaluate(&regions).unwrap(),
            RiskLevel::Uncertain
        );
    }
}
