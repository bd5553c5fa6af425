//! Thread-safe cache of fetched routes, keyed by endpoint pair.

use crate::{EndpointPair, Route};
use std::collections::HashMap;
use std::sync::Mutex;

/// Caches routes by their directed endpoint pair.
///
/// Lookups and stores are atomic with respect to each other; concurrent
/// writers last-write-win, which is harmless because the route for a given
/// endpoint pair is deterministic. Entries live for the lifetime of the
/// process: no eviction, no expiry, no persistence.
///
/// Only successfully fetched routes belong here; failures are never
/// stored.
#[derive(Debug, Default)]
pub struct RouteCache {
    routes: Mutex<HashMap<EndpointPair, Route>>,
}

impl RouteCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached route for `endpoints`, if one has been stored.
    pub fn lookup(&self, endpoints: &EndpointPair) -> Option<Route> {
        self.lock().get(endpoints).cloned()
    }

    /// Store a fetched route under its endpoint pair.
    pub fn store(&self, endpoints: EndpointPair, route: Route) {
        self.lock().insert(endpoints, route);
    }

    /// Number of cached routes.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache holds no routes.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<EndpointPair, Route>> {
        // A poisoned lock only means some thread panicked between lock and
        // unlock; the map itself is never left half-written.
        self.routes
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GeoPoint;
    use std::sync::Arc;

    fn pair(a: (f64, f64), b: (f64, f64)) -> EndpointPair {
        EndpointPair::new(GeoPoint::new(a.0, a.1), GeoPoint::new(b.0, b.1))
    }

    #[test]
    fn test_lookup_after_store_returns_route() {
        let cache = RouteCache::new();
        let key = pair((49.26, -123.25), (49.27, -123.24));
        let route = Route::new(vec![GeoPoint::new(49.265, -123.245)]);

        cache.store(key, route.clone());
        assert_eq!(cache.lookup(&key), Some(route));
    }

    #[test]
    fn test_lookup_on_missing_key_is_none() {
        let cache = RouteCache::new();
        let key = pair((49.26, -123.25), (49.27, -123.24));
        assert_eq!(cache.lookup(&key), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_forward_and_reverse_keys_are_independent() {
        let cache = RouteCache::new();
        let forward = pair((49.26, -123.25), (49.27, -123.24));
        let reverse = pair((49.27, -123.24), (49.26, -123.25));
        let route = Route::new(vec![GeoPoint::new(49.265, -123.245)]);

        cache.store(forward, route.clone());
        assert_eq!(cache.lookup(&forward), Some(route));
        assert_eq!(cache.lookup(&reverse), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_concurrent_stores_and_lookups() {
        let cache = Arc::new(RouteCache::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    let lat = 49.0 + f64::from(i);
                    let key = pair((lat, -123.25), (lat + 1.0, -123.24));
                    let route = Route::new(vec![GeoPoint::new(lat + 0.5, -123.245)]);
                    for _ in 0..100 {
                        cache.store(key, route.clone());
                        assert_eq!(cache.lookup(&key), Some(route.clone()));
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.len(), 8);
    }
}
