//! Minimum-interval throttling for upstream services.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;

use crate::error::ProviderError;
use crate::traits::{GeoPoint, Geocoder, TravelTimeProvider};

/// Wraps a provider so that consecutive upstream calls are at least
/// `min_interval` apart, across all threads.
#[derive(Debug)]
pub struct Throttled<P> {
    inner: P,
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl<P> Throttled<P> {
    pub fn new(inner: P, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Blocks until the next call is allowed, then records it.
    fn wait_turn(&self) {
        let mut last_call = match self.last_call.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(previous) = *last_call {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                std::thread::sleep(self.min_interval - elapsed);
            }
        }
        *last_call = Some(Instant::now());
    }
}

impl<P: TravelTimeProvider> TravelTimeProvider for Throttled<P> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn duration_between(
        &self,
        from: GeoPoint,
        to: GeoPoint,
        at: NaiveDateTime,
    ) -> Result<u32, ProviderError> {
        self.wait_turn();
        self.inner.duration_between(from, to, at)
    }

    fn duration_to_afterparty(
        &self,
        from: GeoPoint,
        afterparty: GeoPoint,
        at: NaiveDateTime,
    ) -> Result<u32, ProviderError> {
        self.wait_turn();
        self.inner.duration_to_afterparty(from, afterparty, at)
    }
}

impl<G: Geocoder> Geocoder for Throttled<G> {
    fn locate(&self, address: &str) -> Result<GeoPoint, ProviderError> {
        self.wait_turn();
        self.inner.locate(address)
    }
}
