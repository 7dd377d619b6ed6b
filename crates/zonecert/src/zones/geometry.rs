//! Planar point-in-polygon and distance primitives.
//!
//! Coordinates are treated as planar (lon = x, lat = y). Zone polygons are
//! small enough that great-circle corrections do not change containment, and
//! distances are only compared against each other, never reported as ground
//! lengths.

use super::domain::{Coordinate, MultiPolygon, Polygon};

/// Tolerance for treating a point as lying on a boundary segment.
const BOUNDARY_EPSILON: f64 = 1e-9;

/// Axis-aligned bounding box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    pub fn of_multi_polygon(geometry: &MultiPolygon) -> Option<Self> {
        let mut bbox: Option<BoundingBox> = None;
        for polygon in &geometry.0 {
            for point in &polygon.exterior {
                bbox = Some(match bbox {
                    None => BoundingBox {
                        min_lon: point.lon,
                        min_lat: point.lat,
                        max_lon: point.lon,
                        max_lat: point.lat,
                    },
                    Some(b) => BoundingBox {
                        min_lon: b.min_lon.min(point.lon),
                        min_lat: b.min_lat.min(point.lat),
                        max_lon: b.max_lon.max(point.lon),
                        max_lat: b.max_lat.max(point.lat),
                    },
                });
            }
        }
        bbox
    }

    pub fn contains(&self, point: Coordinate) -> bool {
        point.lon >= self.min_lon - BOUNDARY_EPSILON
            && point.lon <= self.max_lon + BOUNDARY_EPSILON
            && point.lat >= self.min_lat - BOUNDARY_EPSILON
            && point.lat <= self.max_lat + BOUNDARY_EPSILON
    }
}

/// Closed-polygon containment: boundary points count as inside, including
/// the boundary of a hole. A point strictly inside a hole is outside.
pub fn multi_polygon_contains(geometry: &MultiPolygon, point: Coordinate) -> bool {
    geometry.0.iter().any(|p| polygon_contains(p, point))
}

pub fn polygon_contains(polygon: &Polygon, point: Coordinate) -> bool {
    if on_ring_boundary(&polygon.exterior, point) {
        return true;
    }
    if !ring_interior(&polygon.exterior, point) {
        return false;
    }
    for hole in &polygon.holes {
        if on_ring_boundary(hole, point) {
            return true;
        }
        if ring_interior(hole, point) {
            return false;
        }
    }
    true
}

/// Even-odd ray cast along +x. Boundary behavior is unspecified here; call
/// `on_ring_boundary` first.
fn ring_interior(ring: &[Coordinate], point: Coordinate) -> bool {
    if ring.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let (xi, yi) = (ring[i].lon, ring[i].lat);
        let (xj, yj) = (ring[j].lon, ring[j].lat);
        if (yi > point.lat) != (yj > point.lat) {
            let cross_x = (xj - xi) * (point.lat - yi) / (yj - yi) + xi;
            if point.lon < cross_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

fn on_ring_boundary(ring: &[Coordinate], point: Coordinate) -> bool {
    if ring.len() < 2 {
        return false;
    }
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        if point_segment_distance(point, ring[j], ring[i]) <= BOUNDARY_EPSILON {
            return true;
        }
        j = i;
    }
    false
}

/// Planar distance from a point to a segment, in degrees.
pub fn point_segment_distance(point: Coordinate, a: Coordinate, b: Coordinate) -> f64 {
    let (px, py) = (point.lon, point.lat);
    let (ax, ay) = (a.lon, a.lat);
    let (bx, by) = (b.lon, b.lat);

    let dx = bx - ax;
    let dy = by - ay;
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((px - ax).powi(2) + (py - ay).powi(2)).sqrt();
    }
    let t = (((px - ax) * dx + (py - ay) * dy) / len_sq).clamp(0.0, 1.0);
    let (cx, cy) = (ax + t * dx, ay + t * dy);
    ((px - cx).powi(2) + (py - cy).powi(2)).sqrt()
}

/// Distance from a point to the nearest boundary of the geometry; zero when
/// the point is contained.
pub fn multi_polygon_distance(geometry: &MultiPolygon, point: Coordinate) -> f64 {
    if multi_polygon_contains(geometry, point) {
        return 0.0;
    }
    let mut best = f64::INFINITY;
    for polygon in &geometry.0 {
        best = best.min(ring_distance(&polygon.exterior, point));
        for hole in &polygon.holes {
            best = best.min(ring_distance(hole, point));
        }
    }
    best
}

fn ring_distance(ring: &[Coordinate], point: Coordinate) -> f64 {
    if ring.len() < 2 {
        return f64::INFINITY;
    }
    let mut best = f64::INFINITY;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        best = best.min(point_segment_distance(point, ring[j], ring[i]));
        j = i;
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            Coordinate::new(0.0, 0.0),
            Coordinate::new(0.0, 1.0),
            Coordinate::new(1.0, 1.0),
            Coordinate::new(1.0, 0.0),
        ])
    }

    fn square_with_hole() -> Polygon {
        Polygon::with_holes(
            vec![
                Coordinate::new(0.0, 0.0),
                Coordinate::new(0.0, 4.0),
                Coordinate::new(4.0, 4.0),
                Coordinate::new(4.0, 0.0),
            ],
            vec![vec![
                Coordinate::new(1.0, 1.0),
                Coordinate::new(1.0, 3.0),
                Coordinate::new(3.0, 3.0),
                Coordinate::new(3.0, 1.0),
            ]],
        )
    }

    #[test]
    fn interior_point_is_inside() {
        assert!(polygon_contains(&unit_square(), Coordinate::new(0.5, 0.5)));
    }

    #[test]
    fn exterior_point_is_outside() {
        assert!(!polygon_contains(&unit_square(), Coordinate::new(1.5, 0.5)));
        assert!(!polygon_contains(&unit_square(), Coordinate::new(-0.1, 0.5)));
    }

    #[test]
    fn boundary_and_vertex_points_are_inside() {
        assert!(polygon_contains(&unit_square(), Coordinate::new(0.0, 0.5)));
        assert!(polygon_contains(&unit_square(), Coordinate::new(1.0, 1.0)));
    }

    #[test]
    fn hole_interior_is_outside_but_hole_boundary_is_inside() {
        let p = square_with_hole();
        assert!(!polygon_contains(&p, Coordinate::new(2.0, 2.0)));
        assert!(polygon_contains(&p, Coordinate::new(1.0, 2.0)));
        assert!(polygon_contains(&p, Coordinate::new(0.5, 0.5)));
    }

    #[test]
    fn multi_polygon_matches_any_member() {
        let far_square = Polygon::new(vec![
            Coordinate::new(10.0, 10.0),
            Coordinate::new(10.0, 11.0),
            Coordinate::new(11.0, 11.0),
            Coordinate::new(11.0, 10.0),
        ]);
        let geometry = MultiPolygon(vec![unit_square(), far_square]);
        assert!(multi_polygon_contains(&geometry, Coordinate::new(10.5, 10.5)));
        assert!(multi_polygon_contains(&geometry, Coordinate::new(0.5, 0.5)));
        assert!(!multi_polygon_contains(&geometry, Coordinate::new(5.0, 5.0)));
    }

    #[test]
    fn boundary_distance_is_zero_inside_and_positive_outside() {
        let geometry = MultiPolygon(vec![unit_square()]);
        assert_eq!(multi_polygon_distance(&geometry, Coordinate::new(0.5, 0.5)), 0.0);
        let d = multi_polygon_distance(&geometry, Coordinate::new(0.5, 2.0));
        assert!((d - 1.0).abs() < 1e-9);
    }
}
