use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::zones::Coordinate;

/// External business identifier: exactly 12 ASCII-alphanumeric characters,
/// case-insensitive on input and stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusinessId(String);

pub const BUSINESS_ID_LENGTH: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid business identifier (12 alphanumeric characters)")]
pub struct InvalidBusinessId {
    pub value: String,
}

impl BusinessId {
    pub fn parse(value: &str) -> Result<Self, InvalidBusinessId> {
        let trimmed = value.trim();
        if trimmed.len() == BUSINESS_ID_LENGTH
            && trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(InvalidBusinessId {
                value: trimmed.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BusinessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registered principal-office address. The coordinate is filled in by the
/// geocoding dependency when the snapshot does not already carry one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfficeAddress {
    pub line1: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub coordinate: Option<Coordinate>,
}

/// Ownership structure relevant to the program's control requirements.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OwnershipStructure {
    /// Fraction of the business held by qualifying owners, 0.0 to 1.0.
    pub qualifying_percentage: f64,
    pub citizenship_requirement_met: bool,
}

/// Workforce roster summary as reported by the business subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkforceSummary {
    pub total_employees: u32,
    pub zone_resident_employees: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CertificationStatus {
    Certified,
    Pending,
    Expired,
    Revoked,
}

impl CertificationStatus {
    pub const fn is_valid(self) -> bool {
        matches!(self, CertificationStatus::Certified)
    }

    pub const fn label(self) -> &'static str {
        match self {
            CertificationStatus::Certified => "certified",
            CertificationStatus::Pending => "pending",
            CertificationStatus::Expired => "expired",
            CertificationStatus::Revoked => "revoked",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CertificationRecord {
    pub status: CertificationStatus,
    pub certified_on: NaiveDate,
    pub expires_on: Option<NaiveDate>,
}

/// Point-in-time view of a business as owned by the external business
/// subsystem. This engine only reads snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessSnapshot {
    pub id: BusinessId,
    pub legal_name: String,
    pub office: OfficeAddress,
    pub ownership: OwnershipStructure,
    pub workforce: WorkforceSummary,
    pub certification: CertificationRecord,
}

/// Identifier wrapper for verification records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerificationId(pub String);

/// What triggered a verification, kept for the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggeredBy {
    Operator(String),
    BulkJob(String),
}

impl TriggeredBy {
    pub fn label(&self) -> String {
        match self {
            TriggeredBy::Operator(name) => format!("operator:{name}"),
            TriggeredBy::BulkJob(job_id) => format!("job:{job_id}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationStatus {
    Compliant,
    NonCompliant,
    Expired,
}

impl VerificationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            VerificationStatus::Compliant => "compliant",
            VerificationStatus::NonCompliant => "non_compliant",
            VerificationStatus::Expired => "expired",
        }
    }
}

/// Risk classification buckets; ordering is from least to most severe so
/// comparisons read naturally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}
