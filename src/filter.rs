//! Area pre-filter: keep samples within a great-circle radius.
//!
//! Unlike the grid trim, which works on the local planar approximation,
//! this filter must be accurate at the full analysis radius, so it uses
//! true great-circle (Haversine) distance.

use geo::{Distance, Haversine, Point};

use crate::types::Sample;

/// Great-circle distance between two positions, in kilometers.
pub fn geodesic_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    Haversine.distance(Point::new(lon1, lat1), Point::new(lon2, lat2)) / 1000.0
}

/// Keep samples whose great-circle distance to the center is within
/// `radius_km`. Samples with non-finite coordinates are excluded here too;
/// they can never be assigned to a cell.
///
/// Returns a new vector; the input is only borrowed.
pub fn filter_within_radius(
    samples: &[Sample],
    center_lat: f64,
    center_lon: f64,
    radius_km: f64,
) -> Vec<Sample> {
    let kept: Vec<Sample> = samples
        .iter()
        .filter(|s| {
            s.has_finite_position()
                && geodesic_distance_km(s.latitude, s.longitude, center_lat, center_lon)
                    <= radius_km
        })
        .cloned()
        .collect();

    log::debug!(
        "Area filter kept {}/{} samples within {} km",
        kept.len(),
        samples.len(),
        radius_km
    );

    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_geodesic_distance_one_degree_latitude() {
        // One degree of latitude is ~111.2 km on the sphere
        let d = geodesic_distance_km(0.0, 0.0, 1.0, 0.0);
        assert_relative_eq!(d, 111.2, max_relative = 0.01);
    }

    #[test]
    fn test_filter_keeps_inside_drops_outside() {
        let samples = vec![
            Sample::new(0, 0.0, 0.0, 0),
            Sample::new(1, 0.005, 0.005, 0),   // ~0.79 km out
            Sample::new(2, 0.02, 0.0, 0),      // ~2.2 km out
            Sample::new(3, 0.0, 0.1, 0),       // ~11 km out
        ];
        let kept = filter_within_radius(&samples, 0.0, 0.0, 1.0);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].timestamp_ms, 0);
        assert_eq!(kept[1].timestamp_ms, 1);
    }

    #[test]
    fn test_filter_drops_nonfinite_positions() {
        let samples = vec![
            Sample::new(0, f64::NAN, 0.0, 0),
            Sample::new(1, 0.0, f64::INFINITY, 0),
            Sample::new(2, 0.0, 0.0, 0),
        ];
        let kept = filter_within_radius(&samples, 0.0, 0.0, 5.0);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].timestamp_ms, 2);
    }

    #[test]
    fn test_filter_does_not_mutate_input() {
        let samples = vec![Sample::new(0, 0.0, 0.0, 1).with_channel(0, -70.0)];
        let kept = filter_within_radius(&samples, 0.0, 0.0, 1.0);
        assert_eq!(kept, samples);
        assert_eq!(samples.len(), 1);
    }

    #[test]
    fn test_empty_input_is_fine() {
        assert!(filter_within_radius(&[], 40.0, -74.0, 10.0).is_empty());
    }
}
