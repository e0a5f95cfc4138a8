//! Developer tooling: read-only inspectors over world and clock state.
//!
//! # Invariants
//! - Inspectors never mutate what they inspect.

mod inspector;

pub use inspector::{ClockInspector, ClockSummary, PropInfo, WorldInspector, WorldSummary};

pub fn crate_info() -> &'static str {
    "blockyard-tools v0.1.0"
}
