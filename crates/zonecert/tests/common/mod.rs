use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;

use zonecert::config::BulkConfig;
use zonecert::verification::{
    BusinessDirectory, BusinessId, BusinessSnapshot, CertificationRecord, CertificationStatus,
    CompliancePolicy, CoordinateResolver, DirectoryError, GeocodeError, OfficeAddress,
    OwnershipStructure, StoreError, Verification, VerificationFilter, VerificationService,
    VerificationStore, WorkforceSummary,
};
use zonecert::zones::{
    Coordinate, DesignationType, MultiPolygon, Polygon, Zone, ZoneId, ZoneIndex, ZoneIndexCell,
    ZoneStatus,
};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub const IN_TRACT: Coordinate = Coordinate::new(41.5, -93.5);
pub const IN_REDESIGNATED: Coordinate = Coordinate::new(43.5, -96.5);
pub const NOWHERE: Coordinate = Coordinate::new(20.0, -80.0);

fn square(lat: f64, lon: f64, size: f64) -> MultiPolygon {
    MultiPolygon(vec![Polygon::new(vec![
        Coordinate::new(lat, lon),
        Coordinate::new(lat, lon + size),
        Coordinate::new(lat + size, lon + size),
        Coordinate::new(lat + size, lon),
    ])])
}

/// An always-active qualified tract plus a redesignated zone whose
/// designation expired at the end of 2024 with grace through 2025.
pub fn seed_zones() -> Vec<Zone> {
    vec![
        Zone {
            id: ZoneId("QT-IA-0051".to_string()),
            name: "Qualified Tract 51".to_string(),
            geometry: square(41.0, -94.0, 1.0),
            designation: DesignationType::QualifiedTract,
            status: ZoneStatus::Active,
            effective: date(2019, 1, 1),
            expires: None,
            redesignated: false,
            grace_period_ends: None,
        },
        Zone {
            id: ZoneId("RD-IA-0007".to_string()),
            name: "Redesignated Corridor 7".to_string(),
            geometry: square(43.0, -97.0, 1.0),
            designation: DesignationType::Redesignated,
            status: ZoneStatus::Expired,
            effective: date(2015, 1, 1),
            expires: Some(date(2024, 12, 31)),
            redesignated: true,
            grace_period_ends: Some(date(2025, 12, 31)),
        },
    ]
}

pub fn zone_cell() -> Arc<ZoneIndexCell> {
    let index = ZoneIndex::build(seed_zones()).expect("seed zones build");
    Arc::new(ZoneIndexCell::new(index))
}

pub fn business_id(value: &str) -> BusinessId {
    BusinessId::parse(value).expect("fixture id valid")
}

pub fn compliant_snapshot(id: &str, coordinate: Coordinate) -> BusinessSnapshot {
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

/// Directory fake backed by explicit snapshots. With `synthesize_missing`
/// set, any well-formed identifier resolves to a fresh compliant business,
/// which keeps large-batch tests from enumerating fixtures.
#[derive(Default)]
pub struct FakeDirectory {
    snapshots: Mutex<HashMap<BusinessId, BusinessSnapshot>>,
    pub synthesize_missing: bool,
}

impl FakeDirectory {
    pub fn with(snapshots: Vec<BusinessSnapshot>) -> Self {
        let directory = Self::default();
        {
            let mut guard = directory.snapshots.lock().expect("directory mutex");
            for snapshot in snapshots {
                guard.insert(snapshot.id.clone(), snapshot);
            }
        }
        directory
    }

    pub fn synthetic() -> Self {
        Self {
            snapshots: Mutex::new(HashMap::new()),
            synthesize_missing: true,
        }
    }
}

impl BusinessDirectory for FakeDirectory {
    fn fetch(&self, id: &BusinessId) -> Result<Option<BusinessSnapshot>, DirectoryError> {
        let guard = self.snapshots.lock().expect("directory mutex");
        if let Some(snapshot) = guard.get(id) {
            return Ok(Some(snapshot.clone()));
        }
        if self.synthesize_missing {
            return Ok(Some(compliant_snapshot(id.as_str(), IN_TRACT)));
        }
        Ok(None)
    }
}

#[derive(Default)]
pub struct FakeGeocoder;

impl CoordinateResolver for FakeGeocoder {
    fn resolve(&self, _address: &OfficeAddress) -> Result<Coordinate, GeocodeError> {
        Err(GeocodeError::Unavailable("geocoder offline".to_string()))
    }
}

#[derive(Default)]
pub struct FakeStore {
    records: Mutex<Vec<Verification>>,
    pub fail_appends: Mutex<bool>,
}

impl FakeStore {
    pub fn records(&self) -> Vec<Verification> {
        self.records.lock().expect("store mutex").clone()
    }
}

impl VerificationStore for FakeStore {
    fn append(&self, record: Verification) -> Result<(), StoreError> {
        if *self.fail_appends.lock().expect("flag mutex") {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        self.records.lock().expect("store mutex").push(record);
        Ok(())
    }

    fn history(&self, id: &BusinessId) -> Result<Vec<Verification>, StoreError> {
        Ok(self
            .records()
            .into_iter()
            .filter(|record| record.business_id == *id)
            .collect())
    }

    fn query(&self, filter: &VerificationFilter) -> Result<Vec<Verification>, StoreError> {
        Ok(self
            .records()
            .into_iter()
            .filter(|record| filter.matches(record))
            .collect())
    }
}

pub type FakeService = VerificationService<FakeDirectory, FakeGeocoder, FakeStore>;

pub struct Harness {
    pub service: Arc<FakeService>,
    pub store: Arc<FakeStore>,
}

pub fn harness(directory: FakeDirectory) -> Harness {
    let store = Arc::new(FakeStore::default());
    let service = Arc::new(VerificationService::new(
        Arc::new(directory),
        Arc::new(FakeGeocoder),
        store.clone(),
        zone_cell(),
        CompliancePolicy::default(),
    ));
    Harness { service, store }
}

pub fn small_bulk_config() -> BulkConfig {
    BulkConfig {
        concurrency: 4,
        max_batch: 500,
    }
}
