//! gantry-topology: reference-graph builder and validator.
//!
//! Provides:
//! - [`Loader`]: the single-pass composition pipeline (parse → classify →
//!   resolve pins and references → validate → freeze)
//! - [`Topology`]: the immutable, queryable result
//!
//! The load is strictly single threaded and single pass: records are
//! processed in source order and every cross-reference must already be
//! resolved at its point of use. Diagnostics accumulate across the whole
//! pass; the topology is handed out only when the error list is empty
//! (all-or-nothing commit).

pub mod loader;
pub mod part;
pub mod topology;
pub(crate) mod validate;

pub use loader::{Loaded, Loader, load_str};
pub use part::{AttrValue, Binding, Part, RefEdge};
pub use topology::{PinAssignment, PrinterRoot, Topology};

use gantry_core::Diagnostic;

pub type LoadResult<T> = Result<T, LoadError>;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    /// Structural parse failure; the rest of the document is untrusted.
    #[error(transparent)]
    Parse(#[from] gantry_config::ParseError),

    /// One or more validation errors, reported together after a full pass.
    #[error("configuration rejected with {} diagnostic(s)", diagnostics.len())]
    Invalid { diagnostics: Vec<Diagnostic> },
}

impl LoadError {
    /// Every diagnostic carried by this error, in source order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            LoadError::Parse(_) => &[],
            LoadError::Invalid { diagnostics } => diagnostics,
        }
    }
}
