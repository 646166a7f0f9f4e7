//! Attribute contracts: what each part kind may and must declare.

pub use gantry_pins::PinCaps;
use serde::Serialize;

/// Whether a part kind is a pin-bearing leaf or a reference-bearing container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    /// Leaf device. Declares physical pins, never references to other parts.
    Simple,
    /// Container. References other parts by `(kind, name)`, never raw pins.
    Composite,
}

/// Typed validator for one attribute slot.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrType {
    /// Free-form text.
    Str,
    /// `true`/`false`.
    Bool,
    /// Integer with optional inclusive bounds.
    Int {
        min: Option<i64>,
        max: Option<i64>,
    },
    /// Float with optional inclusive bounds and an optional exclusive
    /// lower bound (`above`), mirroring the usual config accessors.
    Float {
        min: Option<f64>,
        max: Option<f64>,
        above: Option<f64>,
    },
    /// One of a closed word list.
    Enum(&'static [&'static str]),
    /// A single pin expression. Only valid on simple kinds.
    Pin(PinCaps),
    /// A non-empty list of bare `controller:pin` targets (no modifiers).
    /// Only valid on simple kinds (the virtual aggregator).
    PinList,
    /// A list of references to parts of one kind. Only valid on composites.
    Refs {
        kind: &'static str,
        min: usize,
        max: Option<usize>,
    },
}

impl AttrType {
    pub fn float_any() -> Self {
        AttrType::Float {
            min: None,
            max: None,
            above: None,
        }
    }

    pub fn float_above(above: f64) -> Self {
        AttrType::Float {
            min: None,
            max: None,
            above: Some(above),
        }
    }

    /// Single optional reference (0..1 once the attribute is present).
    pub fn ref_one(kind: &'static str) -> Self {
        AttrType::Refs {
            kind,
            min: 1,
            max: Some(1),
        }
    }

    /// Non-empty reference list.
    pub fn ref_many(kind: &'static str) -> Self {
        AttrType::Refs {
            kind,
            min: 1,
            max: None,
        }
    }

    /// True for slot types only a simple part may carry.
    pub fn is_pin(&self) -> bool {
        matches!(self, AttrType::Pin(_) | AttrType::PinList)
    }

    /// True for slot types only a composite part may carry.
    pub fn is_ref(&self) -> bool {
        matches!(self, AttrType::Refs { .. })
    }
}

/// One attribute slot of a part schema.
#[derive(Debug, Clone, PartialEq)]
pub struct AttrSpec {
    pub name: &'static str,
    pub ty: AttrType,
}

impl AttrSpec {
    pub fn new(name: &'static str, ty: AttrType) -> Self {
        Self { name, ty }
    }
}

/// The full contract for one part kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PartSchema {
    pub kind: &'static str,
    pub category: Category,
    pub required: Vec<AttrSpec>,
    pub optional: Vec<AttrSpec>,
}

impl PartSchema {
    pub fn new(
        kind: &'static str,
        category: Category,
        required: Vec<AttrSpec>,
        optional: Vec<AttrSpec>,
    ) -> Self {
        Self {
            kind,
            category,
            required,
            optional,
        }
    }

    /// Look up an attribute slot by option key.
    pub fn attr(&self, name: &str) -> Option<&AttrSpec> {
        self.required
            .iter()
            .chain(self.optional.iter())
            .find(|a| a.name == name)
    }

    /// Names of required attributes absent from the given section keys.
    /// This existence check is also the plugin dispatch contract.
    pub fn missing_required(&self, has: impl Fn(&str) -> bool) -> Vec<&'static str> {
        self.required
            .iter()
            .filter(|a| !has(a.name))
            .map(|a| a.name)
            .collect()
    }

    /// A schema is internally consistent when its slot types match its
    /// category: pins on simple parts only, references on composites only.
    pub fn category_violation(&self) -> Option<&'static str> {
        for attr in self.required.iter().chain(self.optional.iter()) {
            match self.category {
                Category::Simple if attr.ty.is_ref() => return Some(attr.name),
                Category::Composite if attr.ty.is_pin() => return Some(attr.name),
                _ => {}
            }
        }
        None
    }
}
