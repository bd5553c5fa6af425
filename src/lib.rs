//! # Tour Router
//!
//! Walking-route retrieval, caching and tour assembly for point-of-interest maps.
//!
//! This library is the routing core of a POI tour map: it fetches walking
//! routes between geographic points from an OSM routing service, caches them
//! by endpoint pair, and assembles multi-segment tour routes on a background
//! task that reports back to the foreground through a channel.
//!
//! - Flattened `[lon,lat]` geometry decoding ([`decode`])
//! - Thread-safe route cache keyed by directed endpoint pairs ([`cache`])
//! - HTTP routing client fixed to walking / shortest-path results ([`client`])
//! - Cancellable multi-segment route retrieval ([`retrieve`])
//! - Closest-POI selection with a planar latitude correction ([`nearest`])
//!
//! ## Quick Start
//!
//! ```rust
//! use tour_router::{decode_coordinates, closest_point, GeoPoint};
//!
//! // Geometry arrives from the routing service as one flattened string.
//! let waypoints = decode_coordinates("[-123.250,49.261][-123.248,49.262]").unwrap();
//! assert_eq!(waypoints.len(), 2);
//! assert_eq!(waypoints[0], GeoPoint::new(49.261, -123.250));
//!
//! // Pick the POI nearest the user's current position.
//! let here = GeoPoint::new(49.2606, -123.2460);
//! let nearest = closest_point(&here, &waypoints).unwrap();
//! assert_eq!(*nearest, waypoints[1]);
//! ```
//!
//! Fetching and assembling real routes is asynchronous; see
//! [`RoutingClient`](client::RoutingClient) and
//! [`RouteRetriever`](retrieve::RouteRetriever).

use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

// Route cache keyed by endpoint pairs
pub mod cache;
pub use cache::RouteCache;

// HTTP client for the routing service
pub mod client;
pub use client::{RoutingClient, RoutingConfig, RoutingError, SegmentSource};

// Flattened geometry decoding
pub mod decode;
pub use decode::{decode_coordinates, DecodeError};

// Closest-POI selection
pub mod nearest;
pub use nearest::{closest_point, distance_value, path_to_nearest};

// Cancellable multi-segment route retrieval
pub mod retrieve;
pub use retrieve::{RouteEvent, RouteRetriever};

// ============================================================================
// Core Types
// ============================================================================

/// A geographic coordinate with latitude and longitude.
///
/// # Example
/// ```
/// use tour_router::GeoPoint;
/// let point = GeoPoint::new(49.2609, -123.2460); // UBC
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// The directed (start, end) endpoint pair of a route segment.
///
/// Used as the cache key for fetched segments. The pair is directed:
/// `(A, B)` and `(B, A)` are distinct keys and cache independently.
///
/// Equality and hashing compare the raw bit patterns of the four
/// coordinates, which lets the pair key a `HashMap` without any float
/// rounding surprises. Endpoints come from the same POI values on every
/// request, so bit-identical keys are exactly the repeats worth caching.
#[derive(Debug, Clone, Copy)]
pub struct EndpointPair {
    pub start: GeoPoint,
    pub end: GeoPoint,
}

impl EndpointPair {
    /// Create an endpoint pair for a segment from `start` to `end`.
    pub fn new(start: GeoPoint, end: GeoPoint) -> Self {
        Self { start, end }
    }

    fn key_bits(&self) -> [u64; 4] {
        [
            self.start.latitude.to_bits(),
            self.start.longitude.to_bits(),
            self.end.latitude.to_bits(),
            self.end.longitude.to_bits(),
        ]
    }
}

impl PartialEq for EndpointPair {
    fn eq(&self, other: &Self) -> bool {
        self.key_bits() == other.key_bits()
    }
}

impl Eq for EndpointPair {}

impl Hash for EndpointPair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for bits in self.key_bits() {
            state.write_u64(bits);
        }
    }
}

/// One fetched route segment: the ordered waypoints between two endpoints.
///
/// The waypoints are the intermediate points returned by the routing
/// service; the requested endpoints themselves are not included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub waypoints: Vec<GeoPoint>,
}

impl Route {
    /// Create a route from its waypoints.
    pub fn new(waypoints: Vec<GeoPoint>) -> Self {
        Self { waypoints }
    }
}

// ============================================================================
// Tour Helpers
// ============================================================================

/// Close a tour by appending its first point to the end.
///
/// A tour of selected POIs loops back to where it started, so the routed
/// point list gets the first POI appended as the final destination. Lists
/// of fewer than 2 points are returned unchanged, as there is nothing to
/// loop.
///
/// # Example
/// ```
/// use tour_router::{close_tour, GeoPoint};
///
/// let pois = vec![
///     GeoPoint::new(49.2606, -123.2460),
///     GeoPoint::new(49.2666, -123.2521),
///     GeoPoint::new(49.2699, -123.2548),
/// ];
///
/// let tour = close_tour(&pois);
/// assert_eq!(tour.len(), 4);
/// assert_eq!(tour[3], pois[0]);
/// ```
pub fn close_tour(points: &[GeoPoint]) -> Vec<GeoPoint> {
    let mut tour = points.to_vec();
    if points.len() > 1 {
        tour.push(points[0]);
    }
    tour
}

// ============================================================================
// Unit Tests
// ============================================================================
