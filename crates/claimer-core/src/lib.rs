//! # claimer-core
//! Foundation types and traits for the VRGDA prize claimer.

pub mod constants;
pub mod error;
pub mod memory;
pub mod traits;
pub mod types;
pub mod u256_decimal;

pub use alloy_primitives::{Address, I256, U256};
