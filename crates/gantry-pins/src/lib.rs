//! gantry-pins: pin expressions, claims, and virtual fan-out.
//!
//! Provides:
//! - [`PinExpr`]: parsed `<controller>:<modifiers><pin>` / `virtual:<name>`
//!   expressions with pull and invert markers
//! - [`PinClaims`]: the per-load claim table guaranteeing at most one
//!   claimant per physical `(controller, pin)` pair
//!
//! The claim table is owned by one loader for the duration of one load and
//! discarded with it; it is never shared across loads.

pub mod claims;
pub mod expr;

pub use claims::{Claimant, PinClaims};
pub use expr::{PinCaps, PinExpr, Pull};

use gantry_core::PartKey;

pub type PinResult<T> = Result<T, PinError>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PinError {
    #[error("invalid pin expression '{desc}': {reason}")]
    InvalidExpr { desc: String, reason: String },

    #[error("unknown controller '{name}'")]
    UnknownController { name: String },

    #[error("unknown virtual aggregator '{name}'")]
    UnknownAggregator { name: String },

    #[error("virtual aggregator '{name}' has no targets")]
    EmptyAggregator { name: String },

    #[error("pin {controller}:{pin} claimed by both [{first}] and [{second}]")]
    PinConflict {
        controller: String,
        pin: String,
        first: PartKey,
        second: PartKey,
    },
}
