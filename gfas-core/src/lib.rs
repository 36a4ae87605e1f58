//! Biomass-burning emission fields from dry matter burnt and dominant land cover
//!
//! - [`emission_factors`]: per-species, per-land-cover emission factors from two literature sources
//! - [`compositor`]: emission flux and factor-ratio fields on the input grid
//! - [`pipeline`]: reading inputs, computing and writing output streams in one run

pub mod compositor;
pub mod emission_factors;
pub mod errors;
pub mod grid;
pub mod land_cover;
pub mod parameters;
pub mod pipeline;
pub mod species;
pub mod store;

/// Floating point type used for factors and field values
pub type FloatValue = f64;
