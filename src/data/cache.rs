//! Memoization of provider fetches by exact request tuple.

use std::sync::Arc;

use moka::sync::Cache;
use tracing::debug;

use crate::data::IndicatorSource;
use crate::domain::{Country, FetchRequest, WideTable};
use crate::error::AppError;

const MAX_TABLES: u64 = 64;

/// Wraps an `IndicatorSource` so identical requests skip the network.
///
/// Failed fetches are not cached.
pub struct CachedSource<S> {
    inner: S,
    tables: Cache<FetchRequest, Arc<WideTable>>,
    countries: Cache<(), Arc<Vec<Country>>>,
}

impl<S: IndicatorSource> CachedSource<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            tables: Cache::new(MAX_TABLES),
            countries: Cache::new(1),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: IndicatorSource> IndicatorSource for CachedSource<S> {
    fn fetch(&self, request: &FetchRequest) -> Result<WideTable, AppError> {
        if self.tables.contains_key(request) {
            debug!(countries = ?request.countries, "fetch cache hit");
        }
        let table = self
            .tables
            .try_get_with_by_ref(request, || self.inner.fetch(request).map(Arc::new))
            .map_err(|e| (*e).clone())?;
        Ok((*table).clone())
    }

    fn countries(&self) -> Result<Vec<Country>, AppError> {
        let countries = self
            .countries
            .try_get_with((), || self.inner.countries().map(Arc::new))
            .map_err(|e| (*e).clone())?;
        Ok((*countries).clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use crate::domain::YearRange;

    struct CountingSource {
        fetches: Cell<usize>,
        fail: bool,
    }

    impl IndicatorSource for CountingSource {
        fn fetch(&self, request: &FetchRequest) -> Result<WideTable, AppError> {
            self.fetches.set(self.fetches.get() + 1);
            if self.fail {
                return Err(AppError::data("boom"));
            }
            let mut t = WideTable::with_columns(request.codes.clone());
            t.set("France", &request.start_year, 0, Some(1.0));
            Ok(t)
        }

        fn countries(&self) -> Result<Vec<Country>, AppError> {
            self.fetches.set(self.fetches.get() + 1);
            Ok(vec![Country {
                id: "FRA".into(),
                name: "France".into(),
            }])
        }
    }

    fn request(start: i32) -> FetchRequest {
        FetchRequest::new(["NY.GDP.MKTP.CD"], ["FRA"], YearRange::new(start, 2020).unwrap())
    }

    #[test]
    fn identical_requests_hit_the_provider_once() {
        let cached = CachedSource::new(CountingSource {
            fetches: Cell::new(0),
            fail: false,
        });
        let a = cached.fetch(&request(2000)).unwrap();
        let b = cached.fetch(&request(2000)).unwrap();
        assert_eq!(a, b);
        assert_eq!(cached.inner().fetches.get(), 1);

        cached.fetch(&request(2001)).unwrap();
        assert_eq!(cached.inner().fetches.get(), 2);
    }

    #[test]
    fn failures_are_not_memoized() {
        let cached = CachedSource::new(CountingSource {
            fetches: Cell::new(0),
            fail: true,
        });
        assert!(cached.fetch(&request(2000)).is_err());
        assert!(cached.fetch(&request(2000)).is_err());
        assert_eq!(cached.inner().fetches.get(), 2);
    }

    #[test]
    fn country_list_is_memoized() {
        let cached = CachedSource::new(CountingSource {
            fetches: Cell::new(0),
            fail: false,
        });
        cached.countries().unwrap();
        cached.countries().unwrap();
        assert_eq!(cached.inner().fetches.get(), 1);
    }
}
