//! Provider integrations.
//!
//! - World Bank Indicators API (`world_bank`) behind the `IndicatorSource` seam
//! - in-process memoization of fetches (`cache`)
//! - IMF World Economic Outlook release download + parsing (`weo`)

pub mod cache;
pub mod weo;
pub mod world_bank;

pub use cache::CachedSource;
pub use world_bank::WorldBankClient;

use crate::domain::{Country, FetchRequest, WideTable};
use crate::error::AppError;

/// Anything that can answer indicator queries with a wide table.
pub trait IndicatorSource {
    /// Fetch the given indicator codes for the given countries and years.
    fn fetch(&self, request: &FetchRequest) -> Result<WideTable, AppError>;

    /// List the provider's countries (and aggregates), sorted by name.
    fn countries(&self) -> Result<Vec<Country>, AppError>;
}

impl<S: IndicatorSource + ?Sized> IndicatorSource for &S {
    fn fetch(&self, request: &FetchRequest) -> Result<WideTable, AppError> {
        (**self).fetch(request)
    }

    fn countries(&self) -> Result<Vec<Country>, AppError> {
        (**self).countries()
    }
}
