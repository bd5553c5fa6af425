//! HTTP client for the YOURS walking-route service.
//!
//! One GET per segment against the gosmore routing API, with:
//! - Travel mode fixed to walking and routing fixed to shortest-path
//!   (fastest-path results can differ with the direction of travel)
//! - A self-synchronized route cache consulted and filled per request
//! - Every failure normalized to a single [`RoutingError`]

use crate::cache::RouteCache;
use crate::decode::{decode_coordinates, DecodeError};
use crate::{EndpointPair, GeoPoint, Route};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Production routing endpoint (YOURS gosmore API).
pub const YOURS_API_URL: &str = "http://www.yournavigation.org/api/1.0/gosmore.php";

/// Configuration for the routing client.
#[derive(Debug, Clone)]
pub struct RoutingConfig {
    /// Base URL of the routing service.
    pub base_url: String,
    /// Value sent in the `X-Yours-client` identifying header.
    pub client_tag: String,
    /// Timeout applied to each segment request.
    pub timeout: Duration,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            base_url: YOURS_API_URL.to_string(),
            client_tag: "tour-router".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Why a segment fetch failed.
///
/// Consumers of the routing client do not distinguish causes; the variants
/// exist so logs can say what actually went wrong.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// The request could not be sent or the body could not be read.
    #[error("routing request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("routing service returned HTTP {0}")]
    Status(StatusCode),

    /// The response body was not a readable document.
    #[error("unreadable routing response: {0}")]
    Response(#[from] serde_json::Error),

    /// The geometry string inside the response failed to decode.
    #[error("malformed geometry in routing response: {0}")]
    Decode(#[from] DecodeError),
}

/// A source of per-segment walking routes.
///
/// The retrieval layer depends on this seam rather than on the HTTP
/// client directly, so alternate routing services (or test doubles) can
/// stand in for [`RoutingClient`].
#[async_trait]
pub trait SegmentSource: Send + Sync {
    /// Fetch the route for one segment from `start` to `end`.
    ///
    /// With `use_cache` set, a cached route is returned without any
    /// network access, and a freshly fetched route is stored before it is
    /// returned. Errors are never cached.
    async fn fetch_segment(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        use_cache: bool,
    ) -> Result<Route, RoutingError>;
}

/// Response document for the route endpoint. The geometry arrives as one
/// flattened string of `[lon,lat]` groups; every other field is ignored.
#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    coordinates: String,
}

/// Client for fetching walking routes between geographic points.
///
/// Safe to share across tasks: the underlying HTTP client pools its
/// connections, the cache synchronizes itself, and each call owns its own
/// network exchange.
pub struct RoutingClient {
    http: Client,
    config: RoutingConfig,
    cache: RouteCache,
}

impl RoutingClient {
    /// Create a routing client with the given configuration.
    pub fn new(config: RoutingConfig) -> Result<Self, RoutingError> {
        let http = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            config,
            cache: RouteCache::new(),
        })
    }

    /// The client's route cache.
    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    async fn fetch_from_service(
        &self,
        endpoints: &EndpointPair,
    ) -> Result<Route, RoutingError> {
        // v=foot: walking. fast=0: shortest rather than fastest, so the
        // route between two points does not depend on travel direction.
        let response = self
            .http
            .get(&self.config.base_url)
            .query(&[
                ("format", "geojson"),
                ("v", "foot"),
                ("fast", "0"),
                ("layer", "mapnik"),
            ])
            .query(&[
                ("flat", endpoints.start.latitude),
                ("flon", endpoints.start.longitude),
                ("tlat", endpoints.end.latitude),
                ("tlon", endpoints.end.longitude),
            ])
            .header("X-Yours-client", &self.config.client_tag)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            warn!("[RoutingClient] HTTP {} fetching {:?}", status, endpoints);
            return Err(RoutingError::Status(status));
        }

        let bytes = response.bytes().await?;
        let document: DirectionsResponse = serde_json::from_slice(&bytes)?;
        let waypoints = decode_coordinates(&document.coordinates)?;

        debug!(
            "[RoutingClient] fetched {} waypoints for {:?}",
            waypoints.len(),
            endpoints
        );
        Ok(Route::new(waypoints))
    }
}

#[async_trait]
impl SegmentSource for RoutingClient {
    async fn fetch_segment(
        &self,
        start: GeoPoint,
        end: GeoPoint,
        use_cache: bool,
    ) -> Result<Route, RoutingError> {
        let endpoints = EndpointPair::new(start, end);

        if use_cache {
            if let Some(route) = self.cache.lookup(&endpoints) {
                debug!("[RoutingClient] cache hit for {:?}", endpoints);
                return Ok(route);
            }
        }

        let route = self.fetch_from_service(&endpoints).await?;

        if use_cache {
            self.cache.store(endpoints, route.clone());
        }

        Ok(route)
    }
}
