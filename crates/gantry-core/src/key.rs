use core::fmt;
use serde::{Deserialize, Serialize};

/// Address of a configuration section and of the part it declares.
///
/// Parts are addressed by `(kind, name)` everywhere: in cross-references,
/// in diagnostics, and in topology lookups. The unique `printer` root is
/// the one section declared without a name; its key has an empty `name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartKey {
    pub kind: String,
    pub name: String,
}

impl PartKey {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Key for an unnamed section (the `printer` root).
    pub fn unnamed(kind: impl Into<String>) -> Self {
        Self::new(kind, "")
    }
}

impl fmt::Display for PartKey {
    // Writes `kind name`, or just `kind` for unnamed sections, matching the
    // section-header spelling so diagnostics read back like the source.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{} {}", self.kind, self.name)
        }
    }
}
