//! Domain types shared by the fetch, reshape, and chart stages.
//!
//! This module defines:
//!
//! - provider-facing inputs (`Country`, `FetchRequest`, `YearRange`)
//! - the wide provider table (`WideTable`)
//! - the tidy long table (`Observation`, `TidyTable`)

pub mod types;

pub use types::*;
