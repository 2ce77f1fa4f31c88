//! Geographic regions of interest

use geo_types::{Coord, LineString, Polygon};

/// A rectangular geographic region of interest.
///
/// Constructed from two corner points and stored as a closed ring; immutable
/// once built. Coordinates are in the same frame as the rasters it is used
/// against (proxfield never reprojects).
#[derive(Debug, Clone, PartialEq)]
pub struct BoundingPolygon {
    ring: Polygon<f64>,
}

impl BoundingPolygon {
    /// Build the region from two opposite corner points `(x, y)`.
    ///
    /// Corner order does not matter; the ring is normalized to the
    /// axis-aligned rectangle spanning both points.
    pub fn from_corners(a: (f64, f64), b: (f64, f64)) -> Self {
        let (min_x, max_x) = (a.0.min(b.0), a.0.max(b.0));
        let (min_y, max_y) = (a.1.min(b.1), a.1.max(b.1));

        let exterior = LineString::from(vec![
            Coord { x: min_x, y: min_y },
            Coord { x: max_x, y: min_y },
            Coord { x: max_x, y: max_y },
            Coord { x: min_x, y: max_y },
            Coord { x: min_x, y: min_y },
        ]);

        Self {
            ring: Polygon::new(exterior, vec![]),
        }
    }

    /// Bounds as (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for c in self.ring.exterior().coords() {
            min_x = min_x.min(c.x);
            min_y = min_y.min(c.y);
            max_x = max_x.max(c.x);
            max_y = max_y.max(c.y);
        }
        (min_x, min_y, max_x, max_y)
    }

    /// Whether this region overlaps the given bounds (min_x, min_y, max_x, max_y)
    pub fn intersects_bounds(&self, other: (f64, f64, f64, f64)) -> bool {
        let (min_x, min_y, max_x, max_y) = self.bounds();
        min_x < other.2 && max_x > other.0 && min_y < other.3 && max_y > other.1
    }

    /// The underlying closed ring
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.ring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corner_order_is_normalized() {
        let a = BoundingPolygon::from_corners((10.0, 20.0), (0.0, 5.0));
        let b = BoundingPolygon::from_corners((0.0, 5.0), (10.0, 20.0));
        assert_eq!(a.bounds(), (0.0, 5.0, 10.0, 20.0));
        assert_eq!(a, b);
    }

    #[test]
    fn test_ring_is_closed() {
        let region = BoundingPolygon::from_corners((0.0, 0.0), (1.0, 1.0));
        let coords: Vec<_> = region.polygon().exterior().coords().collect();
        assert_eq!(coords.len(), 5);
        assert_eq!(coords.first(), coords.last());
    }

    #[test]
    fn test_intersects_bounds() {
        let region = BoundingPolygon::from_corners((0.0, 0.0), (10.0, 10.0));
        assert!(region.intersects_bounds((5.0, 5.0, 15.0, 15.0)));
        assert!(!region.intersects_bounds((20.0, 20.0, 30.0, 30.0)));
    }
}
