//! Integration test suite for the VRGDA prize claimer.
//!
//! Drives [`claimer_engine::Claimer`] end to end against the in-memory
//! ledger and vault, with the production pricing engine.

pub mod helpers;
