//! Climate choropleth and heritage-site data pipeline.
//!
//! Parses a climate projection table, joins it onto boundary polygons with a
//! regional-then-national fallback, and prepares heritage-site points, time
//! slider state and date-range selections for a map renderer.

pub mod boundaries;
pub mod calendar;
pub mod climate;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod sites;
pub mod source;
pub mod state;
pub mod tabular;
pub mod timeline;
pub mod types;
pub mod util;

pub use error::{ClimateError, Result};
