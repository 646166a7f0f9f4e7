//! Capability-checked providers for extension kinds.
//!
//! A provider supplies the schema for a kind the built-in registry does
//! not know. Dispatch is capability checked: the provider is bound only
//! when the section satisfies the provider's mandatory-attribute contract
//! (an existence check, not behavioral verification). An unmet contract
//! downgrades the part to an inert placeholder with a warning, because
//! extension kinds are not load-critical.

use std::collections::HashMap;

use crate::registry::SchemaError;
use crate::schema::{AttrSpec, AttrType, Category, PartSchema, PinCaps};

/// A handler for one extension kind.
pub trait Provider: Send + Sync {
    /// The contract and category this provider binds to its kind.
    fn schema(&self) -> &PartSchema;

    fn kind(&self) -> &'static str {
        self.schema().kind
    }
}

/// Kind → provider lookup, populated at process start.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: HashMap<&'static str, Box<dyn Provider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every provider shipped in-tree.
    pub fn with_builtin() -> Self {
        let mut reg = Self::new();
        if reg.register(Box::new(PsuProvider::new())).is_err() {
            unreachable!("built-in provider set is consistent");
        }
        reg
    }

    pub fn register(&mut self, provider: Box<dyn Provider>) -> Result<(), SchemaError> {
        let schema = provider.schema();
        if let Some(attr) = schema.category_violation() {
            return Err(SchemaError::CategoryViolation {
                kind: schema.kind,
                attr,
            });
        }
        let kind = provider.kind();
        if self.providers.contains_key(kind) {
            return Err(SchemaError::Duplicate { kind });
        }
        self.providers.insert(kind, provider);
        Ok(())
    }

    pub fn get(&self, kind: &str) -> Option<&dyn Provider> {
        self.providers.get(kind).map(|p| p.as_ref())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.providers.contains_key(kind)
    }
}

/// Power-supply management extension: a simple part monitoring the supply
/// rail, with a power-good input pin.
pub struct PsuProvider {
    schema: PartSchema,
}

impl PsuProvider {
    pub fn new() -> Self {
        Self {
            schema: PartSchema::new(
                "psu",
                Category::Simple,
                vec![
                    AttrSpec::new("volt", AttrType::float_above(0.0)),
                    AttrSpec::new("power", AttrType::float_above(0.0)),
                    AttrSpec::new("pin_pg", AttrType::Pin(PinCaps::INVERT_PULLUP)),
                ],
                vec![],
            ),
        }
    }
}

impl Default for PsuProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl Provider for PsuProvider {
    fn schema(&self) -> &PartSchema {
        &self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn psu_contract_checks_existence() {
        let reg = ProviderRegistry::with_builtin();
        let psu = reg.get("psu").unwrap();
        assert_eq!(psu.kind(), "psu");

        let missing = psu.schema().missing_required(|k| k == "volt");
        assert_eq!(missing, vec!["power", "pin_pg"]);

        let satisfied = psu
            .schema()
            .missing_required(|k| matches!(k, "volt" | "power" | "pin_pg"));
        assert!(satisfied.is_empty());
    }

    #[test]
    fn duplicate_provider_is_rejected() {
        let mut reg = ProviderRegistry::with_builtin();
        let err = reg.register(Box::new(PsuProvider::new())).unwrap_err();
        assert_eq!(err, SchemaError::Duplicate { kind: "psu" });
    }
}
