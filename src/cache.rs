//! Disk-backed memoisation of geocoding and routing results.
//!
//! Upstream services are slow and rate limited, while an event is usually
//! planned several times with slightly different options. Results are kept in
//! memory and written to a JSON file on [`Cached::save`].

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ProviderError;
use crate::traits::{GeoPoint, Geocoder, TravelTimeProvider};

/// Default cache file in the system temp directory.
pub fn default_cache_path() -> PathBuf {
    std::env::temp_dir().join("dinner-plan-cache.json")
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheStore {
    #[serde(default)]
    places: HashMap<String, GeoPoint>,
    #[serde(default)]
    routes: HashMap<String, u32>,
}

/// Memoising wrapper around a provider and/or geocoder.
#[derive(Debug)]
pub struct Cached<P> {
    inner: P,
    path: Option<PathBuf>,
    store: Mutex<CacheStore>,
}

impl<P> Cached<P> {
    /// In-memory cache only.
    pub fn in_memory(inner: P) -> Self {
        Self {
            inner,
            path: None,
            store: Mutex::new(CacheStore::default()),
        }
    }

    /// Loads the cache file at `path` if present.
    pub fn open(inner: P, path: impl Into<PathBuf>) -> Result<Self, ProviderError> {
        let path = path.into();
        let store = if path.exists() {
            let text = fs::read_to_string(&path)?;
            let store: CacheStore = serde_json::from_str(&text)?;
            info!(
                path = %path.display(),
                places = store.places.len(),
                routes = store.routes.len(),
                "loaded travel cache"
            );
            store
        } else {
            CacheStore::default()
        };

        Ok(Self {
            inner,
            path: Some(path),
            store: Mutex::new(store),
        })
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the cache file. A no-op for in-memory caches.
    pub fn save(&self) -> Result<(), ProviderError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let text = {
            let store = self.lock();
            serde_json::to_string(&*store)?
        };
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, text)?;
        fs::rename(tmp_path, path)?;
        debug!(path = %path.display(), "saved travel cache");
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheStore> {
        match self.store.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Looks up `key` in the routes table, computing and storing on a miss.
    /// The lock is not held while the upstream call runs.
    fn route(
        &self,
        key: String,
        compute: impl FnOnce() -> Result<u32, ProviderError>,
    ) -> Result<u32, ProviderError> {
        if let Some(minutes) = self.lock().routes.get(&key) {
            return Ok(*minutes);
        }
        let minutes = compute()?;
        self.lock().routes.insert(key, minutes);
        Ok(minutes)
    }
}

fn route_key(kind: &str, from: GeoPoint, to: GeoPoint, at: NaiveDateTime) -> String {
    format!("{}|{}|{}|{}", kind, from.key(), to.key(), at.format("%Y-%m-%dT%H:%M"))
}

impl<P: TravelTimeProvider> TravelTimeProvider for Cached<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn duration_between(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        at: NaiveDateTime,
    ) -> Result<u32, ProviderError> {
        let key = route_key(self.inner.name(), from, to, at);
        self.route(key, || self.inner.duration_between(from, to, at))
    }

    fn duration_to_afterparty(
        &self,
        from: GeoPoint,
        afterparty: GeoPoint,
        at: NaiveDateTime,
    ) -> Result<u32, ProviderError> {
        let key = route_key(&format!("{}-afterparty", self.inner.name()), from, afterparty, at);
        self.route(key, || self.inner.duration_to_afterparty(from, afterparty, at))
    }
}

impl<G: Geocoder> Geocoder for Cached<G> {
    fn locate(&self, address: &str) -> Result<GeoPoint, ProviderError> {
        if let Some(point) = self.lock().places.get(address) {
            return Ok(*point);
        }
        let point = self.inner.locate(address)?;
        self.lock().places.insert(address.to_string(), point);
        Ok(point)
    }
}
