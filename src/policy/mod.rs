//! Policy configuration for replace requests.
//!
//! Consumers construct a [`Policy`](crate::policy::Policy) via `Policy::default()` or
//! `Policy::strict_preset()`, customize fields, and pass it to
//! [`ReplaceManager`](crate::ReplaceManager).
//!
//! Submodules:
//! - `config`: policy struct and presets
//! - `types`: grouped knobs

pub mod config;
pub mod types;

pub use config::Policy;
