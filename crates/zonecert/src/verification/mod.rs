//! Multi-factor compliance evaluation and the single-business verification
//! operation.

pub mod domain;
pub mod evaluation;
pub mod policy;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    BusinessId, BusinessSnapshot, CertificationRecord, CertificationStatus, InvalidBusinessId,
    OfficeAddress, OwnershipStructure, RiskLevel, TriggeredBy, VerificationId, VerificationStatus,
    WorkforceSummary, BUSINESS_ID_LENGTH,
};
pub use evaluation::{
    CertificationFact, ComplianceAssessment, ComplianceBreakdown, ComplianceEvaluator, OfficeFact,
    OwnershipFact, ResidencyFact,
};
pub use policy::CompliancePolicy;
pub use router::verification_router;
pub use service::{VerificationError, VerificationService};
pub use store::{
    BusinessDirectory, CoordinateResolver, DirectoryError, GeocodeError, StoreError, Verification,
    VerificationFilter, VerificationStore, VerificationView,
};
