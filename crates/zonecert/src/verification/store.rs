use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    BusinessId, BusinessSnapshot, RiskLevel, TriggeredBy, VerificationId, VerificationStatus,
};
use super::evaluation::ComplianceBreakdown;
use crate::zones::{Coordinate, EligibilityVerdict};

/// Immutable verification record. Created once per verification call and
/// never mutated; repeated verifications of the same business accumulate
/// as history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verification {
    pub id: VerificationId,
    pub business_id: BusinessId,
    pub business_name: String,
    pub verdict: EligibilityVerdict,
    pub breakdown: ComplianceBreakdown,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
    pub status: VerificationStatus,
    pub as_of: NaiveDate,
    pub verified_at: DateTime<Utc>,
    pub triggered_by: TriggeredBy,
}

impl Verification {
    pub fn summary_view(&self) -> VerificationView {
        VerificationView {
            verification_id: self.id.clone(),
            business_id: self.business_id.clone(),
            business_name: self.business_name.clone(),
            status: self.status.label(),
            risk_score: self.risk_score,
            risk_level: self.risk_level.label(),
            in_grace_period: self.verdict.in_grace_period,
            requires_recertification: self.breakdown.certification.requires_recertification,
            verified_at: self.verified_at,
        }
    }
}

/// Flattened representation for API responses and the audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationView {
    pub verification_id: VerificationId,
    pub business_id: BusinessId,
    pub business_name: String,
    pub status: &'static str,
    pub risk_score: u8,
    pub risk_level: &'static str,
    pub in_grace_period: bool,
    pub requires_recertification: bool,
    pub verified_at: DateTime<Utc>,
}

/// Query filters over the verification history.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct VerificationFilter {
    pub business_id: Option<BusinessId>,
    pub status: Option<VerificationStatus>,
    pub risk_level: Option<RiskLevel>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl VerificationFilter {
    pub fn matches(&self, record: &Verification) -> bool {
        if let Some(business_id) = &self.business_id {
            if record.business_id != *business_id {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(risk_level) = self.risk_level {
            if record.risk_level != risk_level {
                return false;
            }
        }
        let verified_on = record.verified_at.date_naive();
        if let Some(from) = self.from {
            if verified_on < from {
                return false;
            }
        }
        if let Some(to) = self.to {
            if verified_on > to {
                return false;
            }
        }
        true
    }
}

/// Append-only verification history. A store problem is the one dependency
/// failure that faults a whole bulk job.
pub trait VerificationStore: Send + Sync {
    fn append(&self, record: Verification) -> Result<(), StoreError>;
    fn history(&self, business_id: &BusinessId) -> Result<Vec<Verification>, StoreError>;
    fn query(&self, filter: &VerificationFilter) -> Result<Vec<Verification>, StoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("verification store unavailable: {0}")]
    Unavailable(String),
}

/// Read access to business snapshots owned by the business subsystem.
pub trait BusinessDirectory: Send + Sync {
    fn fetch(&self, business_id: &BusinessId) -> Result<Option<BusinessSnapshot>, DirectoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("business directory unavailable: {0}")]
    Unavailable(String),
}

/// Address-to-coordinate resolution for offices whose snapshot did not
/// arrive pre-geocoded. Failures are retryable per-item errors.
pub trait CoordinateResolver: Send + Sync {
    fn resolve(&self, address: &super::domain::OfficeAddress) -> Result<Coordinate, GeocodeError>;
}

#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("address could not be geocoded: {0}")]
    Unresolvable(String),
    #[error("geocoding service unavailable: {0}")]
    Unavailable(String),
}
