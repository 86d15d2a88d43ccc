//! co2_trends
//!
//! Loads a per-country yearly CO2 emission table (EDGAR export, `;`-delimited,
//! decimal comma), keeps it as an immutable in-memory [`Store`], and answers the
//! questions a globe view asks while the user hovers and scrubs through years.
//! Pairs with the `co2` CLI.
//!
//! ### Features
//! - Tolerant parsing: short rows are dropped, bad cells become uncertain records
//! - O(1) lookup by country code and by region
//! - Region totals computed on demand, skipping uncertain members
//! - Four-year least-squares trend classification (rising / falling / stable)
//! - JSON or CSV export of the normalized table
//!
//! ### Example
//! ```no_run
//! use co2_trends::{ParseOptions, Store};
//!
//! let (store, _report) = Store::from_path("co2.csv", &ParseOptions::default())?;
//! let europe = co2_trends::aggregate::aggregate(&store, "OECD_Europe", 2020);
//! println!("{:.3} Gt from {} countries", europe.absolute, europe.member_count);
//!
//! let window = co2_trends::trend::entity_window(&store, "DEU", 2020);
//! println!("{:?}", window.estimate().label);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod models;
pub mod parser;
pub mod sample;
pub mod storage;
pub mod store;
pub mod trend;

pub use config::ParseOptions;
pub use error::LoadError;
pub use models::{Confidence, Entity, RegionAggregate, TrendLabel, TrendResult, YearRecord};
pub use sample::Sample;
pub use store::Store;
