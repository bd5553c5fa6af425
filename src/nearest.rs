//! Closest-POI selection.
//!
//! Picks the point of interest nearest a reference location, for routing
//! the user from where they stand to the closest stop on the tour.

use crate::GeoPoint;

/// Comparison value for the planar distance between two points.
///
/// Computes `latDiff^2 + (cos(baseline_latitude) * lonDiff)^2`, a cheap
/// approximation that treats the Earth's surface as a plane and shrinks
/// longitude differences by the cosine of a single baseline latitude. The
/// result has a nonlinear relationship to the actual distance and is only
/// usable for comparison, never as a distance.
pub fn distance_value(baseline_latitude: f64, a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat_adjust = baseline_latitude.to_radians().cos();
    let lat_diff = a.latitude - b.latitude;
    let lon_diff = a.longitude - b.longitude;
    lat_diff.powi(2) + (lat_adjust * lon_diff).powi(2)
}

/// Find the candidate nearest the reference location.
///
/// The longitude correction is computed once from the first candidate's
/// latitude, which works well for candidates spread over a walkable area.
/// Ties go to the first-encountered candidate. Returns `None` for an
/// empty candidate list.
///
/// # Example
/// ```
/// use tour_router::{closest_point, GeoPoint};
///
/// let here = GeoPoint::new(49.2606, -123.2460);
/// let pois = vec![
///     GeoPoint::new(49.2699, -123.2548),
///     GeoPoint::new(49.2666, -123.2521),
/// ];
///
/// assert_eq!(closest_point(&here, &pois), Some(&pois[1]));
/// ```
pub fn closest_point<'a>(
    reference: &GeoPoint,
    candidates: &'a [GeoPoint],
) -> Option<&'a GeoPoint> {
    let baseline_latitude = candidates.first()?.latitude;

    let mut closest = None;
    let mut min_value = f64::MAX;
    for candidate in candidates {
        let value = distance_value(baseline_latitude, reference, candidate);
        if value < min_value {
            min_value = value;
            closest = Some(candidate);
        }
    }

    closest
}

/// The 2-point list from a reference location to its nearest candidate,
/// ready to hand to the route retriever. `None` when there are no
/// candidates to walk to.
pub fn path_to_nearest(
    reference: GeoPoint,
    candidates: &[GeoPoint],
) -> Option<Vec<GeoPoint>> {
    let closest = closest_point(&reference, candidates)?;
    Some(vec![reference, *closest])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_picks_nearest_candidate() {
        let here = GeoPoint::new(49.26, -123.25);
        let pois = vec![
            GeoPoint::new(49.30, -123.20),
            GeoPoint::new(49.261, -123.251),
            GeoPoint::new(49.28, -123.27),
        ];
        assert_eq!(closest_point(&here, &pois), Some(&pois[1]));
    }

    #[test]
    fn test_empty_candidates_is_none() {
        let here = GeoPoint::new(49.26, -123.25);
        assert_eq!(closest_point(&here, &[]), None);
        assert_eq!(path_to_nearest(here, &[]), None);
    }

    #[test]
    fn test_tie_goes_to_first_candidate() {
        let here = GeoPoint::new(49.26, -123.25);
        let twin = GeoPoint::new(49.27, -123.25);
        let pois = vec![twin, twin];

        let chosen = closest_point(&here, &pois).unwrap();
        assert!(std::ptr::eq(chosen, &pois[0]));
    }

    #[test]
    fn test_latitude_correction_changes_the_winner() {
        // Same offsets from the reference at two different latitudes: one
        // candidate displaced only in latitude, one only in longitude. At
        // 49 degrees the cosine correction shrinks the longitude offset
        // enough to make the east-west neighbour closer; at 1 degree it
        // barely shrinks and the north-south neighbour wins.
        let winner_at = |base_lat: f64| {
            let here = GeoPoint::new(base_lat, 0.0);
            let north = GeoPoint::new(base_lat + 0.08, 0.0);
            let east = GeoPoint::new(base_lat, 0.1);
            // The first candidate sets the correction baseline.
            let pois = vec![GeoPoint::new(base_lat, 0.2), north, east];
            *closest_point(&here, &pois).unwrap()
        };

        assert_eq!(winner_at(49.0), GeoPoint::new(49.0, 0.1));
        assert_eq!(winner_at(1.0), GeoPoint::new(1.08, 0.0));
    }

    #[test]
    fn test_path_to_nearest_is_reference_then_closest() {
        let here = GeoPoint::new(49.26, -123.25);
        let pois = vec![
            GeoPoint::new(49.30, -123.20),
            GeoPoint::new(49.261, -123.251),
        ];
        assert_eq!(
            path_to_nearest(here, &pois),
            Some(vec![here, pois[1]])
        );
    }
}
