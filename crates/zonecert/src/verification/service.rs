use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use tracing::debug;

use super::domain::{BusinessId, TriggeredBy, VerificationId};
use super::evaluation::ComplianceEvaluator;
use super::policy::CompliancePolicy;
use super::store::{
    BusinessDirectory, CoordinateResolver, DirectoryError, GeocodeError, StoreError, Verification,
    VerificationFilter, VerificationStore,
};
use crate::zones::{EligibilityResolver, ZoneIndexCell};

static VERIFICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_verification_id() -> VerificationId {
    let id = VERIFICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    VerificationId(format!("ver-{id:08}"))
}

/// The public synchronous verification operation: snapshot lookup, office
/// eligibility resolution, compliance assessment, and one appended record.
///
/// Re-verifying a business always recomputes from current state; nothing is
/// cached, so callers requiring freshness get it by construction.
pub struct VerificationService<D, G, S> {
    directory: Arc<D>,
    geocoder: Arc<G>,
    store: Arc<S>,
    zones: Arc<ZoneIndexCell>,
    evaluator: ComplianceEvaluator,
}

impl<D, G, S> VerificationService<D, G, S>
where
    D: BusinessDirectory + 'static,
    G: CoordinateResolver + 'static,
    S: VerificationStore + 'static,
{
    pub fn new(
        directory: Arc<D>,
        geocoder: Arc<G>,
        store: Arc<S>,
        zones: Arc<ZoneIndexCell>,
        policy: CompliancePolicy,
    ) -> Self {
        Self {
            directory,
            geocoder,
            store,
            zones,
            evaluator: ComplianceEvaluator::new(policy),
        }
    }

    pub fn verify(
        &self,
        business_id: &BusinessId,
        as_of: NaiveDate,
        triggered_by: TriggeredBy,
    ) -> Result<Verification, VerificationError> {
        let snapshot = self
            .directory
            .fetch(business_id)?
            .ok_or_else(|| VerificationError::UnknownBusiness(business_id.clone()))?;

        let office_coordinate = match snapshot.office.coordinate {
            Some(coordinate) => coordinate,
            None => self.geocoder.resolve(&snapshot.office)?,
        };

        let resolver = EligibilityResolver::new(self.zones.clone());
        let verdict = resolver.resolve(office_coordinate, as_of);
        let assessment = self.evaluator.assess(&snapshot, &verdict, as_of);

        let record = Verification {
            id: next_verification_id(),
            business_id: snapshot.id.clone(),
            business_name: snapshot.legal_name.clone(),
            verdict,
            breakdown: assessment.breakdown,
            risk_score: assessment.risk_score,
            risk_level: assessment.risk_level,
            status: assessment.status,
            as_of,
            verified_at: Utc::now(),
            triggered_by,
        };

        self.store.append(record.clone())?;
        debug!(
            business = %record.business_id,
            status = record.status.label(),
            score = record.risk_score,
            "verification recorded"
        );
        Ok(record)
    }

    pub fn history(
        &self,
        business_id: &BusinessId,
    ) -> Result<Vec<Verification>, VerificationError> {
        Ok(self.store.history(business_id)?)
    }

    pub fn query(
        &self,
        filter: &VerificationFilter,
    ) -> Result<Vec<Verification>, VerificationError> {
        Ok(self.store.query(filter)?)
    }
}

/// Error raised by the verification service. Unknown businesses and
/// geocoding problems are per-item outcomes for batch callers; only a store
/// failure is fatal to a job.
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("business {0} is not known to the directory")]
    UnknownBusiness(BusinessId),
    #[error(transparent)]
    Geocode(#[from] GeocodeError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl VerificationError {
    /// Whether a retry of the same item could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            VerificationError::Geocode(GeocodeError::Unavailable(_))
                | VerificationError::Directory(_)
        )
    }
}
