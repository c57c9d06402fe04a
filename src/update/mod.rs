//! Client update lifecycle.
//!
//! Observes the background worker registration for a newer staged
//! version, applies it on demand, and reports success exactly once
//! after the relaunch it caused.

pub mod controller;

pub use controller::{UpdateConfig, UpdateController, UpdateState, take_update_success};
