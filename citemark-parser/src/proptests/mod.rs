//! Property-based tests for the citation parser
//!
//! These check invariants that must hold for any input: the pipeline never panics,
//! locations are always sliceable, parsing is deterministic, and canonical markup
//! survives a round trip.

mod generators;
mod invariants;
