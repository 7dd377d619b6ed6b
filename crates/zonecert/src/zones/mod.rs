//! Zone geometry, spatial index, and the eligibility resolver.

pub mod domain;
pub mod geometry;
pub mod index;
pub mod resolver;
pub mod router;

pub use domain::{
    Coordinate, DesignationType, MultiPolygon, Polygon, TemporalState, Zone, ZoneId, ZoneStatus,
};
pub use index::{ZoneDataError, ZoneIndex, ZoneIndexCell, GRID_CELL_DEGREES};
pub use resolver::{EligibilityResolver, EligibilityVerdict};
pub use router::zone_router;
