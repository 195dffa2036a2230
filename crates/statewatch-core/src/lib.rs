//! statewatch-core: pure data model and decision logic for the
//! statewatch state-sync client.
//!
//! Everything in this crate is deterministic given its inputs: no IO,
//! no async, no clocks. The async layer lives in `statewatch-client`.

pub mod cycle;
pub mod diagnostics;
pub mod notify;
pub mod resolver;
pub mod state;
