//! # claimer-engine: batch prize claiming priced by a VRGDA fee curve.
//!
//! [`Claimer`] wires a [`PrizeLedger`](claimer_core::traits::PrizeLedger)
//! and an [`AuctionPricing`](claimer_core::traits::AuctionPricing) curve into
//! fee quoting and batch execution against a
//! [`ClaimableVault`](claimer_core::traits::ClaimableVault).

pub mod claimer;
pub mod config;

pub use claimer::{Claimer, CurveParams};
pub use config::{ClaimerConfig, FeeCurve, ReferenceTiers};
