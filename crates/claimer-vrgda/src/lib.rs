//! # claimer-vrgda: Variable Rate Gradual Dutch Auction pricing.
//!
//! All calculations use 256-bit integer fixed point with 18 decimals.
//!
//! - **Natural exp/ln**: [`wad::exp_wad`] and [`wad::ln_wad`] evaluate the
//!   Balancer `LogExpMath` series, accurate to a few wei across the domain.
//! - **Linear VRGDA**: [`vrgda::price`] grows the target price exponentially
//!   with how far sales lag a constant-rate schedule, and saturates instead
//!   of overflowing.
//! - **Calibration**: [`vrgda::maximum_price_delta_scale`] finds the
//!   per-second growth that turns a minimum into a maximum over a window.

pub mod vrgda;
pub mod wad;

pub use vrgda::{VrgdaEngine, decay_constant, maximum_price_delta_scale, per_time_unit, price};
