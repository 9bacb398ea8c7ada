//! Proximity math for the two filtering strategies.

use geo::{Distance as _, Geodesic, Point};
use nox_crime_incident_models::GeoPoint;

/// Kilometers per degree of latitude (and of longitude at the equator).
pub const KM_PER_DEGREE: f64 = 111.0;

/// A latitude/longitude rectangle approximating a circle.
///
/// Does not wrap the antimeridian; at city scale that never matters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    /// Southern edge.
    pub min_lat: f64,
    /// Northern edge.
    pub max_lat: f64,
    /// Western edge.
    pub min_lon: f64,
    /// Eastern edge.
    pub max_lon: f64,
}

impl BoundingBox {
    /// Builds the box that encloses a circle of `radius_km` around `center`.
    ///
    /// The longitude span widens with `1 / cos(latitude)` and is capped at
    /// 180 degrees so it stays finite at the poles.
    #[must_use]
    pub fn around(center: GeoPoint, radius_km: f64) -> Self {
        let lat_delta = radius_km / KM_PER_DEGREE;
        let cos_lat = center.latitude().to_radians().cos().abs();
        let lon_delta = if cos_lat > f64::EPSILON {
            (radius_km / (KM_PER_DEGREE * cos_lat)).min(180.0)
        } else {
            180.0
        };

        Self {
            min_lat: center.latitude() - lat_delta,
            max_lat: center.latitude() + lat_delta,
            min_lon: center.longitude() - lon_delta,
            max_lon: center.longitude() + lon_delta,
        }
    }

    /// Whether `point` lies inside the box, edges included.
    #[must_use]
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.latitude())
            && (self.min_lon..=self.max_lon).contains(&point.longitude())
    }
}

/// Geodesic (WGS84 ellipsoid) distance between two points in kilometers.
#[must_use]
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let a = Point::new(a.longitude(), a.latitude());
    let b = Point::new(b.longitude(), b.latitude());
    Geodesic.distance(a, b) / 1_000.0
}

/// Whether `point` is within `radius_km` of `center`.
#[must_use]
pub fn within_radius(center: GeoPoint, point: GeoPoint, radius_km: f64) -> bool {
    distance_km(center, point) <= radius_km
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chicago() -> GeoPoint {
        GeoPoint::new(41.8781, -87.6298).unwrap()
    }

    #[test]
    fn box_deltas_follow_latitude() {
        let bbox = BoundingBox::around(chicago(), 0.8);
        let lat_delta = bbox.max_lat - 41.8781;
        let lon_delta = bbox.max_lon - -87.6298;
        assert!((lat_delta - 0.8 / 111.0).abs() < 1e-9);
        let expected_lon = 0.8 / (111.0 * 41.8781_f64.to_radians().cos());
        assert!((lon_delta - expected_lon).abs() < 1e-9);
        assert!(lon_delta > lat_delta);
    }

    #[test]
    fn box_at_pole_stays_finite() {
        let pole = GeoPoint::new(90.0, 0.0).unwrap();
        let bbox = BoundingBox::around(pole, 1.0);
        assert!(bbox.min_lon.is_finite());
        assert!((bbox.max_lon - 180.0).abs() < f64::EPSILON);
    }

    #[test]
    fn box_contains_center_and_edges() {
        let bbox = BoundingBox::around(chicago(), 0.5);
        assert!(bbox.contains(chicago()));
        assert!(bbox.contains(GeoPoint::new(bbox.max_lat, bbox.min_lon).unwrap()));
        assert!(!bbox.contains(GeoPoint::new(bbox.max_lat + 0.001, -87.6298).unwrap()));
    }

    #[test]
    fn distance_of_hundredth_degree_latitude() {
        let north = GeoPoint::new(41.8881, -87.6298).unwrap();
        let d = distance_km(chicago(), north);
        assert!((1.10..1.12).contains(&d), "got {d}");
        assert!(distance_km(chicago(), chicago()).abs() < 1e-9);
    }

    #[test]
    fn box_corner_is_outside_radius() {
        let bbox = BoundingBox::around(chicago(), 0.8);
        let corner = GeoPoint::new(bbox.max_lat, bbox.max_lon).unwrap();
        assert!(bbox.contains(corner));
        assert!(!within_radius(chicago(), corner, 0.8));
    }

    #[test]
    fn nearby_point_is_within_radius() {
        let east = GeoPoint::new(41.8781, -87.6218).unwrap();
        assert!(within_radius(chicago(), east, 0.8));
        assert!(!within_radius(chicago(), east, 0.5));
    }
}
