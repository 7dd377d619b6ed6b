use serde::{Deserialize, Serialize};

use super::domain::RiskLevel;

/// Program policy values in one auditable place. The defaults mirror the
/// published program rules; operators can inject alternates without touching
/// the scoring algorithm.
pub const RESIDENCY_THRESHOLD: f64 = 0.35;
pub const OWNERSHIP_THRESHOLD: f64 = 0.51;
pub const RECERTIFICATION_WARNING_DAYS: i64 = 90;

/// Penalties for failed facts. Office location and ownership structure are
/// structurally harder to remediate than residency drift or a lapsed
/// certification, so they carry the larger deductions.
pub const OFFICE_PENALTY: f64 = 40.0;
pub const OWNERSHIP_PENALTY: f64 = 35.0;
pub const RESIDENCY_PENALTY: f64 = 25.0;
pub const CERTIFICATION_PENALTY: f64 = 25.0;

/// Borderline-margin deductions for facts that pass but sit close to their
/// threshold. Caps sum to 20 so a fully compliant business never drops
/// below the low-risk floor.
pub const RESIDENCY_MARGIN_BAND: f64 = 0.25;
pub const RESIDENCY_MARGIN_PENALTY: f64 = 10.0;
pub const OWNERSHIP_MARGIN_BAND: f64 = 0.25;
pub const OWNERSHIP_MARGIN_PENALTY: f64 = 5.0;
pub const RECERTIFICATION_MARGIN_PENALTY: f64 = 5.0;

/// Risk-level bucket floors.
pub const LOW_RISK_FLOOR: u8 = 80;
pub const MEDIUM_RISK_FLOOR: u8 = 60;
pub const HIGH_RISK_FLOOR: u8 = 40;

impl RiskLevel {
    pub const fn from_score(score: u8) -> Self {
        if score >= LOW_RISK_FLOOR {
            RiskLevel::Low
        } else if score >= MEDIUM_RISK_FLOOR {
            RiskLevel::Medium
        } else if score >= HIGH_RISK_FLOOR {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        }
    }
}

/// Threshold and weight configuration consumed by the evaluator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompliancePolicy {
    pub residency_threshold: f64,
    pub ownership_threshold: f64,
    pub recertification_warning_days: i64,
    pub office_penalty: f64,
    pub ownership_penalty: f64,
    pub residency_penalty: f64,
    pub certification_penalty: f64,
    pub residency_margin_band: f64,
    pub residency_margin_penalty: f64,
    pub ownership_margin_band: f64,
    pub ownership_margin_penalty: f64,
    pub recertification_margin_penalty: f64,
}

impl Default for CompliancePolicy {
    fn default() -> Self {
        Self {
            residency_threshold: RESIDENCY_THRESHOLD,
            ownership_threshold: OWNERSHIP_THRESHOLD,
            recertification_warning_days: RECERTIFICATION_WARNING_DAYS,
            office_penalty: OFFICE_PENALTY,
            ownership_penalty: OWNERSHIP_PENALTY,
            residency_penalty: RESIDENCY_PENALTY,
            certification_penalty: CERTIFICATION_PENALTY,
            residency_margin_band: RESIDENCY_MARGIN_BAND,
            residency_margin_penalty: RESIDENCY_MARGIN_PENALTY,
            ownership_margin_band: OWNERSHIP_MARGIN_BAND,
            ownership_margin_penalty: OWNERSHIP_MARGIN_PENALTY,
            recertification_margin_penalty: RECERTIFICATION_MARGIN_PENALTY,
        }
    }
}

impl CompliancePolicy {
    /// Deduction for a passing metric sitting inside the borderline band
    /// above its threshold: full penalty at the threshold, tapering to zero
    /// at threshold + band.
    pub(crate) fn margin_deduction(metric: f64, threshold: f64, band: f64, penalty: f64) -> f64 {
        if band <= 0.0 || metric >= threshold + band {
            return 0.0;
        }
        let shortfall = (threshold + band - metric) / band;
        penalty * shortfall.clamp(0.0, 1.0)
    }
}
