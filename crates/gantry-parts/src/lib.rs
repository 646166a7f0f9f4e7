//! gantry-parts: the part-type registry.
//!
//! Provides:
//! - [`PartSchema`] / [`AttrSpec`] / [`AttrType`]: per-kind attribute
//!   contracts (category, required/optional options, typed validators)
//! - closed enumerations for every string-typed choice in the format
//! - kinematics role tables consulted for toolhead axis coverage
//! - the capability-checked plugin [`ProviderRegistry`]
//!
//! The registry is the single source of truth the validator consults; new
//! kinds are added by registering schemas (or providers), never by editing
//! validation code.

pub mod kinematics;
pub mod provider;
pub mod registry;
pub mod schema;
pub mod types;

pub use kinematics::{AxisRole, Kinematics};
pub use provider::{Provider, ProviderRegistry, PsuProvider};
pub use registry::{Registry, SchemaError, tool_variant};
pub use schema::{AttrSpec, AttrType, Category, PartSchema, PinCaps};
pub use types::{ControlAlgorithm, CoolerKind, PinBoardMap, RestartMethod, SensorType, ToolType};
