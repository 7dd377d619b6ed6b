use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{BusinessSnapshot, RiskLevel, VerificationStatus};
use super::policy::CompliancePolicy;
use crate::zones::{EligibilityVerdict, ZoneId};

/// Workforce residency fact with its supporting metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResidencyFact {
    pub compliant: bool,
    pub ratio: f64,
    pub resident_employees: u32,
    pub total_employees: u32,
}

/// Principal-office location fact derived from the eligibility verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficeFact {
    pub compliant: bool,
    pub zone_id: Option<ZoneId>,
    pub in_grace_period: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OwnershipFact {
    pub compliant: bool,
    pub qualifying_percentage: f64,
    pub citizenship_requirement_met: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CertificationFact {
    pub compliant: bool,
    /// True when the record itself has lapsed (status expired or the
    /// expiration date has passed), as opposed to being pending or revoked.
    pub lapsed: bool,
    pub days_until_expiration: Option<i64>,
    pub requires_recertification: bool,
}

/// The four independently gated compliance facts. Always recomputed from a
/// business snapshot at verification time, never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceBreakdown {
    pub residency: ResidencyFact,
    pub office: OfficeFact,
    pub ownership: OwnershipFact,
    pub certification: CertificationFact,
}

impl ComplianceBreakdown {
    pub fn all_compliant(&self) -> bool {
        self.residency.compliant
            && self.office.compliant
            && self.ownership.compliant
            && self.certification.compliant
    }
}

/// Full evaluation output: breakdown, score, bucket, and the overall
/// verification status classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceAssessment {
    pub breakdown: ComplianceBreakdown,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub status: VerificationStatus,
}

/// Stateless evaluator applying one policy to business snapshots.
pub struct ComplianceEvaluator {
    policy: CompliancePolicy,
}

impl ComplianceEvaluator {
    pub fn new(policy: CompliancePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &CompliancePolicy {
        &self.policy
    }

    pub fn assess(
        &self,
        snapshot: &BusinessSnapshot,
        office_verdict: &EligibilityVerdict,
        as_of: NaiveDate,
    ) -> ComplianceAssessment {
        let residency = self.residency_fact(snapshot);
        let office = OfficeFact {
            compliant: office_verdict.is_eligible,
            zone_id: office_verdict.zone_id.clone(),
            in_grace_period: office_verdict.in_grace_period,
        };
        let ownership = self.ownership_fact(snapshot);
        let certification = self.certification_fact(snapshot, as_of);

        let breakdown = ComplianceBreakdown {
            residency,
            office,
            ownership,
            certification,
        };
        let risk_score = self.score(&breakdown);
        let risk_level = RiskLevel::from_score(risk_score);
        let status = classify(&breakdown);

        ComplianceAssessment {
            breakdown,
            risk_score,
            risk_level,
            status,
        }
    }

    fn residency_fact(&self, snapshot: &BusinessSnapshot) -> ResidencyFact {
        let total = snapshot.workforce.total_employees;
        let resident = snapshot.workforce.zone_resident_employees;
        // An empty roster is non-compliant, not a division by zero.
        let ratio = if total == 0 {
            0.0
        } else {
            f64::from(resident) / f64::from(total)
        };
        ResidencyFact {
            compliant: total > 0 && ratio >= self.policy.residency_threshold,
            ratio,
            resident_employees: resident,
            total_employees: total,
        }
    }

    fn ownership_fact(&self, snapshot: &BusinessSnapshot) -> OwnershipFact {
        let ownership = snapshot.ownership;
        OwnershipFact {
            compliant: ownership.qualifying_percentage >= self.policy.ownership_threshold
                && ownership.citizenship_requirement_met,
            qualifying_percentage: ownership.qualifying_percentage,
            citizenship_requirement_met: ownership.citizenship_requirement_met,
        }
    }

    fn certification_fact(&self, snapshot: &BusinessSnapshot, as_of: NaiveDate) -> CertificationFact {
        let record = snapshot.certification;
        let days_until_expiration = record.expires_on.map(|expires| (expires - as_of).num_days());
        let date_lapsed = days_until_expiration.map_or(false, |days| days < 0);
        let lapsed = record.status == super::domain::CertificationStatus::Expired || date_lapsed;
        let compliant = record.status.is_valid() && !date_lapsed;
        // The warning fires on a closing window regardless of current
        // validity, so an already-lapsed record still flags for renewal.
        let requires_recertification = days_until_expiration
            .map_or(false, |days| days < self.policy.recertification_warning_days);

        CertificationFact {
            compliant,
            lapsed,
            days_until_expiration,
            requires_recertification,
        }
    }

    /// Weighted deduction model: start at 100, subtract the fact penalty for
    /// each failure, and shave borderline margins off facts that pass but
    /// sit near their threshold (residency at 36% scores worse than at 60%).
    fn score(&self, breakdown: &ComplianceBreakdown) -> u8 {
        let p = &self.policy;
        let mut deduction = 0.0;

        if breakdown.residency.compliant {
            deduction += CompliancePolicy::margin_deduction(
                breakdown.residency.ratio,
                p.residency_threshold,
                p.residency_margin_band,
                p.residency_margin_penalty,
            );
        } else {
            deduction += p.residency_penalty;
        }

        if !breakdown.office.compliant {
            deduction += p.office_penalty;
        }

        if breakdown.ownership.compliant {
            deduction += CompliancePolicy::margin_deduction(
                breakdown.ownership.qualifying_percentage,
                p.ownership_threshold,
                p.ownership_margin_band,
                p.ownership_margin_penalty,
            );
        } else {
            deduction += p.ownership_penalty;
        }

        if breakdown.certification.compliant {
            if let Some(days) = breakdown.certification.days_until_expiration {
                if days < p.recertification_warning_days {
                    let window = p.recertification_warning_days as f64;
                    let closeness = (window - days as f64) / window;
                    deduction += p.recertification_margin_penalty * closeness.clamp(0.0, 1.0);
                }
            }
        } else {
            deduction += p.certification_penalty;
        }

        (100.0 - deduction).clamp(0.0, 100.0).round() as u8
    }
}

/// Status classification: full compliance, a lapsed certification, or
/// general non-compliance.
fn classify(breakdown: &ComplianceBreakdown) -> VerificationStatus {
    if breakdown.all_compliant() {
        VerificationStatus::Compliant
    } else if breakdown.certification.lapsed {
        VerificationStatus::Expired
    } else {
        VerificationStatus::NonCompliant
    }
}
