use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use super::domain::{Coordinate, Zone};
use super::geometry::{multi_polygon_contains, multi_polygon_distance, BoundingBox};

/// Grid cell edge length in degrees. At ~0.25 degrees a cell covers roughly
/// a county-sized area, which keeps candidate lists short for tract-scale
/// polygons while bounding the number of cells a large zone spans.
pub const GRID_CELL_DEGREES: f64 = 0.25;

/// Zone dataset problems caught while building an index. The refresh
/// pipeline is expected to deliver clean data; a build failure keeps the
/// previous index in service.
#[derive(Debug, thiserror::Error)]
pub enum ZoneDataError {
    #[error("zone {zone} has no polygon geometry")]
    EmptyGeometry { zone: String },
    #[error("zone {zone} has a ring with fewer than 3 vertices")]
    DegenerateRing { zone: String },
    #[error("zone {zone} is redesignated but has no grace period end date")]
    MissingGracePeriod { zone: String },
    #[error("zone {zone} grace period ends on or before its effective date")]
    GracePeriodBeforeEffective { zone: String },
}

/// In-memory spatial index over designated-zone polygons. Immutable once
/// built; concurrent readers share it through [`ZoneIndexCell`].
///
/// Lookup is a uniform grid keyed by bounding box: each zone is registered
/// in every cell its bbox covers, so `resolve` only runs the full
/// point-in-polygon test against the handful of zones near the query point
/// instead of scanning tens of thousands of polygons.
#[derive(Debug)]
pub struct ZoneIndex {
    zones: Vec<Zone>,
    boxes: Vec<BoundingBox>,
    grid: HashMap<(i32, i32), Vec<usize>>,
}

fn cell_of(point: Coordinate) -> (i32, i32) {
    (
        (point.lon / GRID_CELL_DEGREES).floor() as i32,
        (point.lat / GRID_CELL_DEGREES).floor() as i32,
    )
}

impl ZoneIndex {
    pub fn build(zones: Vec<Zone>) -> Result<Self, ZoneDataError> {
        let mut boxes = Vec::with_capacity(zones.len());
        for zone in &zones {
            validate_zone(zone)?;
            let bbox = BoundingBox::of_multi_polygon(&zone.geometry)
                .ok_or_else(|| ZoneDataError::EmptyGeometry {
                    zone: zone.id.0.clone(),
                })?;
            boxes.push(bbox);
        }

        let mut grid: HashMap<(i32, i32), Vec<usize>> = HashMap::new();
        for (idx, bbox) in boxes.iter().enumerate() {
            let (min_cx, min_cy) = cell_of(Coordinate::new(bbox.min_lat, bbox.min_lon));
            let (max_cx, max_cy) = cell_of(Coordinate::new(bbox.max_lat, bbox.max_lon));
            for cx in min_cx..=max_cx {
                for cy in min_cy..=max_cy {
                    grid.entry((cx, cy)).or_default().push(idx);
                }
            }
        }

        Ok(Self { zones, boxes, grid })
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    /// All zones containing the point, most specific designation first;
    /// ties broken by earliest effective date (longest-standing wins).
    pub fn resolve(&self, point: Coordinate) -> Vec<&Zone> {
        let mut hits: Vec<&Zone> = match self.grid.get(&cell_of(point)) {
            Some(candidates) => candidates
                .iter()
                .copied()
                .filter(|idx| self.boxes[*idx].contains(point))
                .filter(|idx| multi_polygon_contains(&self.zones[*idx].geometry, point))
                .map(|idx| &self.zones[idx])
                .collect(),
            None => Vec::new(),
        };
        hits.sort_by_key(|zone| (zone.designation.specificity_rank(), zone.effective));
        hits
    }

    /// Nearest zone by planar distance to its boundary (zero when the point
    /// is inside one). Searches expanding rings of grid cells; a candidate
    /// surfaces in the first ring its bounding box touches, which can be
    /// well before its boundary, so the walk keeps expanding until the
    /// ring's inner edge is farther than the best distance found.
    pub fn nearest(&self, point: Coordinate) -> Option<(&Zone, f64)> {
        if self.zones.is_empty() {
            return None;
        }

        let origin = cell_of(point);
        let max_radius = self.grid_radius_bound(origin);
        let mut best: Option<(usize, f64)> = None;

        for radius in 0..=max_radius {
            if let Some((_, best_distance)) = best {
                // A zone first seen at this ring sits entirely outside the
                // inner rings, so its boundary is at least this far away.
                if (radius - 1) as f64 * GRID_CELL_DEGREES > best_distance {
                    break;
                }
            }
            for idx in self.ring_candidates(origin, radius) {
                let distance = multi_polygon_distance(&self.zones[idx].geometry, point);
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((idx, distance));
                }
            }
        }

        // Grid walk found nothing near the point; fall back to a full scan
        // so callers still get an answer for far-out coordinates.
        if best.is_none() {
            for (idx, zone) in self.zones.iter().enumerate() {
                let distance = multi_polygon_distance(&zone.geometry, point);
                if best.map_or(true, |(_, d)| distance < d) {
                    best = Some((idx, distance));
                }
            }
        }

        best.map(|(idx, distance)| (&self.zones[idx], distance))
    }

    fn grid_radius_bound(&self, origin: (i32, i32)) -> i32 {
        self.grid
            .keys()
            .map(|(cx, cy)| (cx - origin.0).abs().max((cy - origin.1).abs()))
            .max()
            .unwrap_or(0)
    }

    fn ring_candidates(&self, origin: (i32, i32), radius: i32) -> Vec<usize> {
        let mut candidates = Vec::new();
        for cx in (origin.0 - radius)..=(origin.0 + radius) {
            for cy in (origin.1 - radius)..=(origin.1 + radius) {
                let on_ring = (cx - origin.0).abs() == radius || (cy - origin.1).abs() == radius;
                if !on_ring {
                    continue;
                }
                if let Some(bucket) = self.grid.get(&(cx, cy)) {
                    candidates.extend_from_slice(bucket);
                }
            }
        }
        candidates.sort_unstable();
        candidates.dedup();
        candidates
    }
}

fn validate_zone(zone: &Zone) -> Result<(), ZoneDataError> {
    if zone.geometry.0.is_empty() {
        return Err(ZoneDataError::EmptyGeometry {
            zone: zone.id.0.clone(),
        });
    }
    for polygon in &zone.geometry.0 {
        if polygon.exterior.len() < 3 {
            return Err(ZoneDataError::DegenerateRing {
                zone: zone.id.0.clone(),
            });
        }
        for hole in &polygon.holes {
            if hole.len() < 3 {
                return Err(ZoneDataError::DegenerateRing {
                    zone: zone.id.0.clone(),
                });
            }
        }
    }
    if zone.redesignated {
        match zone.grace_period_ends {
            None => {
                return Err(ZoneDataError::MissingGracePeriod {
                    zone: zone.id.0.clone(),
                })
            }
            Some(grace_end) if grace_end <= zone.effective => {
                return Err(ZoneDataError::GracePeriodBeforeEffective {
                    zone: zone.id.0.clone(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Shared handle to the current index snapshot. Readers take an `Arc` and
/// keep using it even while a data refresh publishes a replacement, so no
/// reader ever observes a partially-built index.
pub struct ZoneIndexCell {
    current: RwLock<Arc<ZoneIndex>>,
}

impl ZoneIndexCell {
    pub fn new(index: ZoneIndex) -> Self {
        Self {
            current: RwLock::new(Arc::new(index)),
        }
    }

    pub fn snapshot(&self) -> Arc<ZoneIndex> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Swap in a freshly built index. Existing snapshots remain valid.
    pub fn replace(&self, index: ZoneIndex) {
        let mut guard = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = Arc::new(index);
    }
}
