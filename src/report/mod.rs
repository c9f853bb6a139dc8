pub mod visualization;

use serde::Serialize;

use crate::{Assessment, RiskLevel, SRegion};

#[derive(Debug, Serialize)]
pub struct ElaReport {
    pub source: Option<String>,
    pub width: u32,
    pub height: u32,
    pub quality: u8,
    pub threshold: u8,
    pub dispersion: f64,
    pub anomaly_count: usize,
    pub anomaly_ratio: f64,
    pub max_difference: u8,
    pub mean_difference: f64,
    pub regions: Vec<SRegion>,
    pub risk: RiskLevel,
    pub verdict: String,
}

impl From<&Assessment> for ElaReport {
    fn from(assessment: &Assessment) -> Self {
        let result = &assessment.result;
        let (width, height) = result.dimensions();

        Self {
            source: assessment.source.clone(),
            width,
            height,
            quality: result.quality(),
            threshold: result.threshold(),
            dispersion: result.dispersion(),
            anomaly_count: result.anomaly_count(),
            anomaly_ratio: result.anomaly_ratio(),
            max_difference: result.max_difference(),
            mean_difference: result.mean_difference(),
            regions: result.regions().to_vec(),
            risk: assessment.risk,
            verdict: format!("{}: {}", assessment.risk, assessment.risk.description()),
        }
    }
}

impl ElaReport {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
