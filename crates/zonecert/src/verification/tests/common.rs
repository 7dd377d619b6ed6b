use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use crate::verification::domain::{
    BusinessId, BusinessSnapshot, CertificationRecord, CertificationStatus, OfficeAddress,
    OwnershipStructure, WorkforceSummary,
};
use crate::verification::policy::CompliancePolicy;
use crate::verification::service::VerificationService;
use crate::verification::store::{
    BusinessDirectory, CoordinateResolver, DirectoryError, GeocodeError, StoreError, Verification,
    VerificationFilter, VerificationStore,
};
use crate::zones::{
    Coordinate, DesignationType, MultiPolygon, Polygon, Zone, ZoneId, ZoneIndex, ZoneIndexCell,
    ZoneStatus,
};

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) const IN_ZONE: Coordinate = Coordinate::new(41.6, -93.6);
pub(super) const OUT_OF_ZONE: Coordinate = Coordinate::new(45.0, -90.0);

/// One square active tract around `IN_ZONE` plus a lapsed redesignated zone
/// off to the side.
pub(super) fn zone_fixtures() -> Vec<Zone> {
    let tract = Zone {
        id: ZoneId("QT-IA-0051".to_string()),
        name: "Des Moines Qualified Tract".to_string(),
        geometry: MultiPolygon(vec![Polygon::new(vec![
            Coordinate::new(41.0, -94.0),
            Coordinate::new(41.0, -93.0),
            Coordinate::new(42.0, -93.0),
            Coordinate::new(42.0, -94.0),
        ])]),
        designation: DesignationType::QualifiedTract,
        status: ZoneStatus::Active,
        effective: date(2019, 1, 1),
        expires: None,
        redesignated: false,
        grace_period_ends: None,
    };
    let redesignated = Zone {
        id: ZoneId("RD-IA-0007".to_string()),
        name: "Sioux Corridor (redesignated)".to_string(),
        geometry: MultiPolygon(vec![Polygon::new(vec![
            Coordinate::new(43.0, -97.0),
            Coordinate::new(43.0, -96.0),
            Coordinate::new(44.0, -96.0),
            Coordinate::new(44.0, -97.0),
        ])]),
        designation: DesignationType::Redesignated,
        status: ZoneStatus::Expired,
        effective: date(2015, 1, 1),
        expires: Some(date(2024, 12, 31)),
        redesignated: true,
        grace_period_ends: Some(date(2025, 12, 31)),
    };
    vec![tract, redesignated]
}

pub(super) fn zone_cell() -> Arc<ZoneIndexCell> {
    let index = ZoneIndex::build(zone_fixtures()).expect("fixture zones build");
    Arc::new(ZoneIndexCell::new(index))
}

pub(super) fn business_id(value: &str) -> BusinessId {
    BusinessId::parse(value).expect("fixture id valid")
}

pub(super) fn snapshot(id: &str, coordinate: Coordinate) -> BusinessSnapshot {
    BusinessSnapshot {
        id: business_id(id),
        legal_name: format!("Business {id}"),
        office: OfficeAddress {
            line1: "400 Locust St".to_string(),
            city: "Des Moines".to_string(),
            state: "IA".to_string(),
            postal_code: "50309".to_string(),
            coordinate: Some(coordinate),
        },
        ownership: OwnershipStructure {
            qualifying_percentage: 0.80,
            citizenship_requirement_met: true,
        },
        workforce: WorkforceSummary {
            total_employees: 40,
            zone_resident_employees: 28,
        },
        certification: CertificationRecord {
            status: CertificationStatus::Certified,
            certified_on: date(2024, 1, 15),
            expires_on: Some(date(2027, 1, 15)),
        },
    }
}

#[derive(Default)]
pub(super) struct MemoryDirectory {
    businesses: Mutex<HashMap<BusinessId, BusinessSnapshot>>,
    pub(super) unavailable: Mutex<bool>,
}

impl MemoryDirectory {
    pub(super) fn with(snapshots: Vec<BusinessSnapshot>) -> Self {
        let directory = Self::default();
        {
            let mut guard = directory.businesses.lock().expect("directory mutex");
            for snapshot in snapshots {
                guard.insert(snapshot.id.clone(), snapshot);
            }
        }
        directory
    }
}

impl BusinessDirectory for MemoryDirectory {
    fn fetch(&self, business_id: &BusinessId) -> Result<Option<BusinessSnapshot>, DirectoryError> {
        if *self.unavailable.lock().expect("flag mutex") {
            return Err(DirectoryError::Unavailable("fixture outage".to_string()));
        }
        let guard = self.businesses.lock().expect("directory mutex");
        Ok(guard.get(business_id).cloned())
    }
}

/// Geocoder fake: fails for every address, since fixtures carry coordinates.
#[derive(Default)]
pub(super) struct FailingGeocoder;

impl CoordinateResolver for FailingGeocoder {
    fn resolve(&self, address: &OfficeAddress) -> Result<Coordinate, GeocodeError> {
        Err(GeocodeError::Unavailable(format!(
            "no geocoder in tests (asked for {})",
            address.postal_code
        )))
    }
}

#[derive(Default)]
pub(super) struct MemoryStore {
    records: Mutex<Vec<Verification>>,
    pub(super) fail_appends: Mutex<bool>,
}

impl MemoryStore {
    pub(super) fn records(&self) -> Vec<Verification> {
        self.records.lock().expect("store mutex").clone()
    }
}

impl VerificationStore for MemoryStore {
    fn append(&self, record: Verification) -> Result<(), StoreError> {
        if *self.fail_appends.lock().expect("flag mutex") {
            return Err(StoreError::Unavailable("fixture outage".to_string()));
        }
        self.records.lock().expect("store mutex").push(record);
        Ok(())
    }

    fn history(&self, business_id: &BusinessId) -> Result<Vec<Verification>, StoreError> {
        let guard = self.records.lock().expect("store mutex");
        Ok(guard
            .iter()
            .filter(|record| record.business_id == *business_id)
            .cloned()
            .collect())
    }

    fn query(&self, filter: &VerificationFilter) -> Result<Vec<Verification>, StoreError> {
        let guard = self.records.lock().expect("store mutex");
        Ok(guard
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }
}

pub(super) type FixtureService = VerificationService<MemoryDirectory, FailingGeocoder, MemoryStore>;

pub(super) struct Fixture {
    pub(super) service: Arc<FixtureService>,
    pub(super) store: Arc<MemoryStore>,
    pub(super) directory: Arc<MemoryDirectory>,
}

pub(super) fn fixture(snapshots: Vec<BusinessSnapshot>) -> Fixture {
    let directory = Arc::new(MemoryDirectory::with(snapshots));
    let store = Arc::new(MemoryStore::default());
    let service = Arc::new(VerificationService::new(
        directory.clone(),
        Arc::new(FailingGeocoder),
        store.clone(),
        zone_cell(),
        CompliancePolicy::default(),
    ));
    Fixture {
        service,
        store,
        directory,
    }
}
