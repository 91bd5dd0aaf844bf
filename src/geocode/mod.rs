// src/geocode/mod.rs

pub mod nominatim;

pub use nominatim::{Nominatim, Place};

use std::collections::HashMap;
use std::time::Duration;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use tokio::time::sleep;
use tracing::{debug, warn};

static LOCATION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^(?:near|off|over)\s+").unwrap());

/// Strip a directional prefix ("Near", "Off", "Over", any case) before
/// lookup. The cache key stays the original, unstripped string.
pub fn clean_location(location: &str) -> String {
    LOCATION_PREFIX.replace(location, "").trim().to_string()
}

/// What a lookup produced for one location string. Everything except
/// `Found` collapses to null coordinates at the serialization boundary;
/// the distinction exists so failures stay inspectable.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    Found { lat: f64, lon: f64 },
    /// The service answered with an empty result set.
    NotFound,
    /// Transport error, non-success status, or undecodable response body.
    Failed,
    /// A result came back but its lat/lon fields did not parse.
    Malformed,
}

impl GeocodeOutcome {
    pub fn coords(&self) -> (Option<f64>, Option<f64>) {
        match *self {
            GeocodeOutcome::Found { lat, lon } => (Some(lat), Some(lon)),
            _ => (None, None),
        }
    }
}

/// The external lookup seam. The production implementation is
/// [`Nominatim`]; tests substitute a scripted stub to observe cache
/// behavior.
#[allow(async_fn_in_trait)]
pub trait Lookup {
    async fn search(&self, query: &str) -> Result<Vec<Place>>;
}

/// Location → coordinates with an in-process cache.
///
/// Cache entries live for the process lifetime and are never evicted.
/// Failures are cached too, so a failing string is looked up at most once
/// per run. A fixed delay follows every call that actually went out.
pub struct Geocoder<L> {
    lookup: L,
    delay: Duration,
    cache: HashMap<String, GeocodeOutcome>,
}

impl<L: Lookup> Geocoder<L> {
    pub fn new(lookup: L, delay: Duration) -> Self {
        Self {
            lookup,
            delay,
            cache: HashMap::new(),
        }
    }

    /// Resolve `location`, consulting the cache first. Lookup failures of
    /// any kind are swallowed into their [`GeocodeOutcome`] variant; this
    /// never errors.
    pub async fn locate(&mut self, location: &str) -> GeocodeOutcome {
        if let Some(hit) = self.cache.get(location) {
            debug!(location, "geocode cache hit");
            return hit.clone();
        }

        let query = clean_location(location);
        let outcome = match self.lookup.search(&query).await {
            Ok(places) => match places.first() {
                Some(place) => match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
                    (Ok(lat), Ok(lon)) => GeocodeOutcome::Found { lat, lon },
                    _ => {
                        warn!(location, lat = %place.lat, lon = %place.lon, "unparseable coordinates");
                        GeocodeOutcome::Malformed
                    }
                },
                None => {
                    debug!(location, "no geocode result");
                    GeocodeOutcome::NotFound
                }
            },
            Err(err) => {
                warn!(location, error = %err, "geocode lookup failed");
                GeocodeOutcome::Failed
            }
        };

        self.cache.insert(location.to_string(), outcome.clone());
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    struct Scripted {
        calls: Cell<usize>,
        queries: RefCell<Vec<String>>,
        responses: RefCell<VecDeque<Result<Vec<Place>>>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<Vec<Place>>>) -> Self {
            Self {
                calls: Cell::new(0),
                queries: RefCell::new(Vec::new()),
                responses: RefCell::new(responses.into()),
            }
        }
    }

    impl<'a> Lookup for &'a Scripted {
        async fn search(&self, query: &str) -> Result<Vec<Place>> {
            self.calls.set(self.calls.get() + 1);
            self.queries.borrow_mut().push(query.to_string());
            self.responses
                .borrow_mut()
                .pop_front()
                .expect("unexpected extra lookup")
        }
    }

    fn place(lat: &str, lon: &str) -> Place {
        Place {
            lat: lat.to_string(),
            lon: lon.to_string(),
        }
    }

    #[test]
    fn directional_prefixes_are_stripped_case_insensitively() {
        assert_eq!(clean_location("Near Chicago"), "Chicago");
        assert_eq!(clean_location("Off Coast"), "Coast");
        assert_eq!(clean_location("OVER the Atlantic"), "the Atlantic");
        assert_eq!(clean_location("near  Moscow, Russia"), "Moscow, Russia");
        assert_eq!(clean_location("Overton, Nevada"), "Overton, Nevada");
        assert_eq!(clean_location("Chicago"), "Chicago");
    }

    #[tokio::test]
    async fn repeated_location_triggers_one_lookup() {
        let stub = Scripted::new(vec![Ok(vec![place("41.8781", "-87.6298")])]);
        let mut geocoder = Geocoder::new(&stub, Duration::ZERO);

        let first = geocoder.locate("Near Chicago, Illinois").await;
        let second = geocoder.locate("Near Chicago, Illinois").await;

        assert_eq!(stub.calls.get(), 1);
        assert_eq!(
            first,
            GeocodeOutcome::Found {
                lat: 41.8781,
                lon: -87.6298
            }
        );
        assert_eq!(first, second);
        // the query goes out cleaned, the cache key does not
        assert_eq!(stub.queries.borrow().as_slice(), ["Chicago, Illinois"]);
    }

    #[tokio::test]
    async fn failed_lookup_is_cached_and_not_retried() {
        let stub = Scripted::new(vec![Err(anyhow!("connection reset"))]);
        let mut geocoder = Geocoder::new(&stub, Duration::ZERO);

        assert_eq!(geocoder.locate("Mount Erebus").await, GeocodeOutcome::Failed);
        assert_eq!(geocoder.locate("Mount Erebus").await, GeocodeOutcome::Failed);
        assert_eq!(stub.calls.get(), 1);
    }

    #[tokio::test]
    async fn prefix_variants_are_distinct_cache_keys() {
        let stub = Scripted::new(vec![
            Ok(vec![place("41.8781", "-87.6298")]),
            Ok(vec![place("41.8781", "-87.6298")]),
        ]);
        let mut geocoder = Geocoder::new(&stub, Duration::ZERO);

        geocoder.locate("Near Chicago").await;
        geocoder.locate("Chicago").await;

        // both lookups went out, even though the cleaned query is the same
        assert_eq!(stub.calls.get(), 2);
        assert_eq!(stub.queries.borrow().as_slice(), ["Chicago", "Chicago"]);
    }

    #[tokio::test]
    async fn empty_result_set_is_not_found() {
        let stub = Scripted::new(vec![Ok(vec![])]);
        let mut geocoder = Geocoder::new(&stub, Duration::ZERO);

        let outcome = geocoder.locate("Nowhere in particular").await;
        assert_eq!(outcome, GeocodeOutcome::NotFound);
        assert_eq!(outcome.coords(), (None, None));
    }

    #[tokio::test]
    async fn unparseable_coordinates_are_malformed() {
        let stub = Scripted::new(vec![Ok(vec![place("not-a-number", "-87.6298")])]);
        let mut geocoder = Geocoder::new(&stub, Duration::ZERO);

        let outcome = geocoder.locate("Chicago").await;
        assert_eq!(outcome, GeocodeOutcome::Malformed);
        assert_eq!(outcome.coords(), (None, None));
    }
}
