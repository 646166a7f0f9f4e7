//! Resolved part instances.

use gantry_core::{PartId, PartKey};
use gantry_parts::Category;
use gantry_pins::PinExpr;
use serde::Serialize;

/// A fully resolved attribute value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AttrValue {
    Str(String),
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Canonical spelling of a closed-enumeration choice.
    Enum(&'static str),
    /// A claimed pin expression (simple parts only).
    Pin(PinExpr),
    /// Ordered physical targets of a virtual aggregator.
    PinTargets(Vec<(String, String)>),
    /// Resolved part references, in declaration order (composites only).
    Refs(Vec<PartId>),
}

/// One directed reference edge out of a composite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefEdge {
    /// Attribute slot the reference came from.
    pub attribute: String,
    pub target: PartId,
}

/// How a part's kind was resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Binding {
    /// A registry built-in.
    Builtin,
    /// An extension kind bound to a live provider.
    Plugin { provider: String },
    /// An extension kind whose provider contract was unmet; the part is an
    /// inert placeholder kept only so the rest of the load can proceed.
    Inert { missing: Vec<String> },
}

/// One part instance in the loaded topology.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Part {
    pub id: PartId,
    pub key: PartKey,
    pub category: Category,
    pub binding: Binding,
    /// Source line of the section header.
    pub line: usize,
    /// Resolved attributes in declaration order.
    pub attrs: Vec<(String, AttrValue)>,
    /// Outgoing reference edges in declaration order (composites only).
    pub refs: Vec<RefEdge>,
}

impl Part {
    pub fn kind(&self) -> &str {
        &self.key.kind
    }

    pub fn name(&self) -> &str {
        &self.key.name
    }

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Resolved reference ids of one attribute slot, empty if absent.
    pub fn refs_in(&self, attribute: &str) -> &[PartId] {
        match self.attr(attribute) {
            Some(AttrValue::Refs(ids)) => ids,
            _ => &[],
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.attr(name) {
            Some(AttrValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn enum_value(&self, name: &str) -> Option<&'static str> {
        match self.attr(name) {
            Some(AttrValue::Enum(v)) => Some(v),
            _ => None,
        }
    }

    pub fn is_inert(&self) -> bool {
        matches!(self.binding, Binding::Inert { .. })
    }
}
