//! `econ-dash` library crate.
//!
//! The binary (`econ`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes or a terminal
//! - the fetch/reshape/chart stages can be reused by other front-ends
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod catalog;
pub mod chart;
pub mod cli;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod projections;
pub mod report;
pub mod reshape;
pub mod tui;
