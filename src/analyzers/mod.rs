//! Regional short-term-rental performance analysis.
//!
//! This module turns per-property monthly AirDNA rows into occupancy, ADR
//! and RevPAR by region, rolls the months up into quarters, and assembles the
//! text report comparing the prior-year quarter with the months since.

pub mod analyzer;
pub mod monthly;
pub mod periods;
pub mod quarterly;
pub mod regions;
pub mod report;
pub mod series;
pub mod types;
pub mod utility;
