//! Structured load diagnostics.
//!
//! Every defect found while loading a configuration becomes one
//! [`Diagnostic`]: a severity, a defect category, the offending section,
//! optionally the offending attribute, and a human-readable message.
//! Diagnostics are collected in source order and reported as a batch so a
//! user can fix a configuration in one edit cycle.

use core::fmt;
use serde::{Deserialize, Serialize};

use crate::key::PartKey;

/// Whether a defect fails the load or merely annotates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Load fails once the full pass has completed.
    Error,
    /// Load continues; the defect is reported alongside the result.
    Warning,
}

/// Category of configuration defect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DefectKind {
    /// Section header or body line that cannot be read at all.
    MalformedSection,
    /// Second declaration of an already-declared `(kind, name)` pair.
    DuplicateDefinition,
    /// Section kind known neither to the registry nor to any plugin provider.
    UnknownKind,
    /// A required attribute of the part's kind is absent.
    MissingRequiredAttribute,
    /// Attribute present but failing its type, enumeration, or range check.
    InvalidAttributeValue,
    /// Reference to a `(kind, name)` that is declared nowhere in the source.
    UndeclaredReference,
    /// Reference to a part declared later than its point of use.
    ForwardReferenceNotAllowed,
    /// Two simple parts claiming the same physical `(controller, pin)`.
    PinConflict,
    /// Pin expression naming a controller or aggregator that does not exist.
    UnknownController,
    /// Numeric bounds out of order (e.g. `position_min` above `position_max`).
    BoundOrderingViolation,
    /// Kinematics axis role left uncovered, or over-covered on a single rail role.
    KinematicsRoleUnsatisfied,
    /// Plugin provider found but its mandatory-attribute contract is unmet.
    PluginContractUnmet,
}

impl DefectKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DefectKind::MalformedSection => "MalformedSection",
            DefectKind::DuplicateDefinition => "DuplicateDefinition",
            DefectKind::UnknownKind => "UnknownKind",
            DefectKind::MissingRequiredAttribute => "MissingRequiredAttribute",
            DefectKind::InvalidAttributeValue => "InvalidAttributeValue",
            DefectKind::UndeclaredReference => "UndeclaredReference",
            DefectKind::ForwardReferenceNotAllowed => "ForwardReferenceNotAllowed",
            DefectKind::PinConflict => "PinConflict",
            DefectKind::UnknownController => "UnknownController",
            DefectKind::BoundOrderingViolation => "BoundOrderingViolation",
            DefectKind::KinematicsRoleUnsatisfied => "KinematicsRoleUnsatisfied",
            DefectKind::PluginContractUnmet => "PluginContractUnmet",
        }
    }
}

/// One defect, bound to the section (and attribute) that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DefectKind,
    pub section: PartKey,
    pub attribute: Option<String>,
    pub message: String,
}

impl Diagnostic {
    pub fn error(kind: DefectKind, section: PartKey, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            kind,
            section,
            attribute: None,
            message: message.into(),
        }
    }

    pub fn warning(kind: DefectKind, section: PartKey, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            kind,
            section,
            attribute: None,
            message: message.into(),
        }
    }

    /// Attach the offending attribute name.
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sev = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}[{}] [{}]", sev, self.kind.as_str(), self.section)?;
        if let Some(attr) = &self.attribute {
            write!(f, " {}", attr)?;
        }
        write!(f, ": {}", self.message)
    }
}
