use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;

use zonecert::bulk::{BulkVerificationOrchestrator, JobBoard};
use zonecert::config::BulkConfig;
use zonecert::verification::{
    BusinessDirectory, BusinessId, BusinessSnapshot, CertificationRecord, CertificationStatus,
    CompliancePolicy, CoordinateResolver, DirectoryError, GeocodeError, OfficeAddress,
    OwnershipStructure, StoreError, Verification, VerificationFilter, VerificationService,
    VerificationStore, WorkforceSummary,
};
use zonecert::zones::{
    Coordinate, DesignationType, MultiPolygon, Polygon, Zone, ZoneDataError, ZoneId, ZoneIndex,
    ZoneIndexCell, ZoneStatus,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// In-memory verification history; the production deployment points the
/// same trait at durable storage.
#[derive(Default)]
pub(crate) struct InMemoryVerificationStore {
    records: Mutex<Vec<Verification>>,
}

impl VerificationStore for InMemoryVerificationStore {
    fn append(&self, record: Verification) -> Result<(), StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?
            .push(record);
        Ok(())
    }

    fn history(&self, business_id: &BusinessId) -> Result<Vec<Verification>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(guard
            .iter()
            .filter(|record| record.business_id == *business_id)
            .cloned()
            .collect())
    }

    fn query(&self, filter: &VerificationFilter) -> Result<Vec<Verification>, StoreError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))?;
        Ok(guard
            .iter()
            .filter(|record| filter.matches(record))
            .cloned()
            .collect())
    }
}

/// Snapshot directory seeded at startup; stands in for the external
/// business-management subsystem.
#[derive(Default)]
pub(crate) struct InMemoryBusinessDirectory {
    snapshots: HashMap<BusinessId, BusinessSnapshot>,
}

impl InMemoryBusinessDirectory {
    pub(crate) fn with(snapshots: Vec<BusinessSnapshot>) -> Self {
        Self {
            snapshots: snapshots
                .into_iter()
                .map(|snapshot| (snapshot.id.clone(), snapshot))
                .collect(),
        }
    }
}

impl BusinessDirectory for InMemoryBusinessDirectory {
    fn fetch(&self, business_id: &BusinessId) -> Result<Option<BusinessSnapshot>, DirectoryError> {
        Ok(self.snapshots.get(business_id).cloned())
    }
}

/// Postal-code lookup table standing in for the external geocoder; an
/// unknown postal code reads as a resolver miss, not an outage.
pub(crate) struct PostalCodeGeocoder {
    table: HashMap<String, Coordinate>,
}

impl PostalCodeGeocoder {
    pub(crate) fn seeded() -> Self {
        let mut table = HashMap::new();
        table.insert("50309".to_string(), Coordinate::new(41.586, -93.625));
        table.insert("51101".to_string(), Coordinate::new(42.497, -96.405));
        table.insert("52801".to_string(), Coordinate::new(41.523, -90.574));
        Self { table }
    }
}

impl CoordinateResolver for PostalCodeGeocoder {
    fn resolve(&self, address: &OfficeAddress) -> Result<Coordinate, GeocodeError> {
        self.table
            .get(&address.postal_code)
            .copied()
            .ok_or_else(|| {
                GeocodeError::Unresolvable(format!("postal code {}", address.postal_code))
            })
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| format!("invalid date '{raw}': {err}"))
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("seed date valid")
}

fn square(lat: f64, lon: f64, size: f64) -> MultiPolygon {
    MultiPolygon(vec![Polygon::new(vec![
        Coordinate::new(lat, lon),
        Coordinate::new(lat, lon + size),
        Coordinate::new(lat + size, lon + size),
        Coordinate::new(lat + size, lon),
    ])])
}

/// Demo zone dataset: an open-ended qualified tract around Des Moines, a
/// tract with a donut hole, a tribal-land overlay, and a redesignated zone
/// in grace through the end of 2026.
pub(crate) fn seed_zones() -> Vec<Zone> {
    vec![
        Zone {
            id: ZoneId("QT-IA-0051".to_string()),
            name: "Des Moines Qualified Tract".to_string(),
            geometry: square(41.0, -94.0, 1.0),
            designation: DesignationType::QualifiedTract,
            status: ZoneStatus::Active,
            effective: date(2019, 1, 1),
            expires: None,
            redesignated: false,
            grace_period_ends: None,
        },
        Zone {
            id: ZoneId("QT-IA-0112".to_string()),
            name: "Quad Cities Tract (carve-out)".to_string(),
            geometry: MultiPolygon(vec![Polygon::with_holes(
                vec![
                    Coordinate::new(41.0, -91.0),
                    Coordinate::new(41.0, -90.0),
                    Coordinate::new(42.0, -90.0),
                    Coordinate::new(42.0, -91.0),
                ],
                vec![vec![
                    Coordinate::new(41.4, -90.7),
                    Coordinate::new(41.4, -90.3),
                    Coordinate::new(41.8, -90.3),
                    Coordinate::new(41.8, -90.7),
                ]],
            )]),
            designation: DesignationType::QualifiedTract,
            status: ZoneStatus::Active,
            effective: date(2020, 7, 1),
            expires: None,
            redesignated: false,
            grace_period_ends: None,
        },
        Zone {
            id: ZoneId("TL-IA-0003".to_string()),
            name: "Meskwaki Settlement Overlay".to_string(),
            geometry: square(41.6, -93.8, 0.3),
            designation: DesignationType::TribalLand,
            status: ZoneStatus::Active,
            effective: date(2017, 1, 1),
            expires: None,
            redesignated: false,
            grace_period_ends: None,
        },
        Zone {
            id: ZoneId("RD-IA-0007".to_string()),
            name: "Sioux Corridor (redesignated)".to_string(),
            geometry: square(42.0, -97.0, 1.0),
            designation: DesignationType::Redesignated,
            status: ZoneStatus::Expired,
            effective: date(2015, 1, 1),
            expires: Some(date(2025, 12, 31)),
            redesignated: true,
            grace_period_ends: Some(date(2026, 12, 31)),
        },
    ]
}

fn snapshot(
    id: &str,
    name: &str,
    postal_code: &str,
    coordinate: Option<Coordinate>,
    ownership: OwnershipStructure,
    workforce: WorkforceSummary,
    certification: CertificationRecord,
) -> BusinessSnapshot {
    BusinessSnapshot {
        id: BusinessId::parse(id).expect("seed id valid"),
        legal_name: name.to_string(),
        office: OfficeAddress {
            line1: "100 Main St".to_string(),
            city: "Des Moines".to_string(),
            state: "IA".to_string(),
            postal_code: postal_code.to_string(),
            coordinate,
        },
        ownership,
        workforce,
        certification,
    }
}

/// Demo business roster covering each outcome class.
pub(crate) fn seed_businesses() -> Vec<BusinessSnapshot> {
    vec![
        snapshot(
            "HAWK12345678",
            "Hawkeye Fabrication LLC",
            "50309",
            Some(Coordinate::new(41.62, -93.69)),
            OwnershipStructure {
                qualifying_percentage: 0.85,
                citizenship_requirement_met: true,
            },
            WorkforceSummary {
                total_employees: 52,
                zone_resident_employees: 31,
            },
            CertificationRecord {
                status: CertificationStatus::Certified,
                certified_on: date(2024, 3, 1),
                expires_on: Some(date(2027, 3, 1)),
            },
        ),
        snapshot(
            "PRAI98765432",
            "Prairie Logistics Co",
            "50309",
            Some(Coordinate::new(41.55, -93.40)),
            OwnershipStructure {
                qualifying_percentage: 0.55,
                citizenship_requirement_met: true,
            },
            WorkforceSummary {
                total_employees: 120,
                zone_resident_employees: 30,
            },
            CertificationRecord {
                status: CertificationStatus::Certified,
                certified_on: date(2023, 11, 1),
                expires_on: Some(date(2026, 11, 1)),
            },
        ),
        snapshot(
            "SIOU55512340",
            "Sioux Corridor Metals",
            "51101",
            Some(Coordinate::new(42.5, -96.5)),
            OwnershipStructure {
                qualifying_percentage: 0.70,
                citizenship_requirement_met: true,
            },
            WorkforceSummary {
                total_employees: 18,
                zone_resident_employees: 12,
            },
            CertificationRecord {
                status: CertificationStatus::Certified,
                certified_on: date(2022, 6, 1),
                expires_on: Some(date(2024, 6, 1)),
            },
        ),
        // Office address not yet geocoded; resolves through the postal table.
        snapshot(
            "RIVR24681357",
            "Riverbend Analytics",
            "52801",
            None,
            OwnershipStructure {
                qualifying_percentage: 0.60,
                citizenship_requirement_met: true,
            },
            WorkforceSummary {
                total_employees: 9,
                zone_resident_employees: 4,
            },
            CertificationRecord {
                status: CertificationStatus::Certified,
                certified_on: date(2025, 1, 10),
                expires_on: Some(date(2025, 9, 15)),
            },
        ),
    ]
}

pub(crate) type EngineService =
    VerificationService<InMemoryBusinessDirectory, PostalCodeGeocoder, InMemoryVerificationStore>;
pub(crate) type EngineOrchestrator = BulkVerificationOrchestrator<
    InMemoryBusinessDirectory,
    PostalCodeGeocoder,
    InMemoryVerificationStore,
>;

pub(crate) struct Engine {
    pub(crate) zones: Arc<ZoneIndexCell>,
    pub(crate) service: Arc<EngineService>,
    pub(crate) orchestrator: Arc<EngineOrchestrator>,
}

/// Build the engine over the seeded in-memory adapters.
pub(crate) fn build_engine(bulk: BulkConfig) -> Result<Engine, ZoneDataError> {
    let zones = Arc::new(ZoneIndexCell::new(ZoneIndex::build(seed_zones())?));
    let service = Arc::new(VerificationService::new(
        Arc::new(InMemoryBusinessDirectory::with(seed_businesses())),
        Arc::new(PostalCodeGeocoder::seeded()),
        Arc::new(InMemoryVerificationStore::default()),
        zones.clone(),
        CompliancePolicy::default(),
    ));
    let orchestrator = Arc::new(BulkVerificationOrchestrator::new(
        service.clone(),
        Arc::new(JobBoard::default()),
        bulk,
    ));
    Ok(Engine {
        zones,
        service,
        orchestrator,
    })
}
