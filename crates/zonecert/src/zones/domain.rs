use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Geographic point in decimal degrees (WGS 84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Single polygon: one exterior ring plus zero or more hole rings.
/// Rings are implicitly closed (last vertex connects back to the first).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub exterior: Vec<Coordinate>,
    #[serde(default)]
    pub holes: Vec<Vec<Coordinate>>,
}

impl Polygon {
    pub fn new(exterior: Vec<Coordinate>) -> Self {
        Self {
            exterior,
            holes: Vec::new(),
        }
    }

    pub fn with_holes(exterior: Vec<Coordinate>, holes: Vec<Vec<Coordinate>>) -> Self {
        Self { exterior, holes }
    }
}

/// A zone's geometry may be split across disjoint polygons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiPolygon(pub Vec<Polygon>);

/// Identifier wrapper for designated zones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub String);

/// Closed enumeration of program designation categories. Exhaustive matching
/// keeps new categories from slipping past the resolver unhandled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DesignationType {
    QualifiedTract,
    NonMetroCounty,
    TribalLand,
    BaseClosureArea,
    Redesignated,
}

impl DesignationType {
    /// Ordering used when overlapping zones contain the same point: lower
    /// rank wins. Base-closure areas are the narrowest designation; a
    /// redesignated zone is always the least specific claim on a point.
    pub const fn specificity_rank(self) -> u8 {
        match self {
            DesignationType::BaseClosureArea => 0,
            DesignationType::TribalLand => 1,
            DesignationType::QualifiedTract => 2,
            DesignationType::NonMetroCounty => 3,
            DesignationType::Redesignated => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            DesignationType::QualifiedTract => "qualified_tract",
            DesignationType::NonMetroCounty => "non_metro_county",
            DesignationType::TribalLand => "tribal_land",
            DesignationType::BaseClosureArea => "base_closure_area",
            DesignationType::Redesignated => "redesignated",
        }
    }
}

/// Zone status as delivered by the boundary refresh pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoneStatus {
    Active,
    Expired,
}

/// A designated eligibility zone. Read-only to this engine; the periodic
/// dataset refresh replaces whole zones rather than mutating them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub name: String,
    pub geometry: MultiPolygon,
    pub designation: DesignationType,
    pub status: ZoneStatus,
    pub effective: NaiveDate,
    pub expires: Option<NaiveDate>,
    pub redesignated: bool,
    pub grace_period_ends: Option<NaiveDate>,
}

/// Where a zone's designation stands relative to an as-of date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalState {
    Active,
    Grace { days_remaining: i64 },
    Lapsed,
}

impl Zone {
    /// Three-state temporal classification: active while the expiration date
    /// has not passed, then in grace until the redesignation window closes,
    /// then lapsed. A zone with no expiration never lapses.
    pub fn temporal_state(&self, as_of: NaiveDate) -> TemporalState {
        match self.expires {
            None => TemporalState::Active,
            Some(expires) if as_of <= expires => TemporalState::Active,
            Some(_) => match self.grace_period_ends {
                Some(grace_end) if as_of <= grace_end => TemporalState::Grace {
                    days_remaining: (grace_end - as_of).num_days().max(0),
                },
                _ => TemporalState::Lapsed,
            },
        }
    }
}
