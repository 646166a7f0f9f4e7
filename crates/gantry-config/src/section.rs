//! Typed section records produced by the parser.

use gantry_core::PartKey;
use serde::Serialize;

/// One `key: value` line inside a section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionLine {
    pub key: String,
    /// Raw value text, comments stripped, surrounding whitespace trimmed.
    pub value: String,
    pub line: usize,
}

/// One parsed `[kind name]` section, options in source order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionRecord {
    pub kind: String,
    /// Empty for the unnamed `printer` root section.
    pub name: String,
    /// Line of the section header.
    pub line: usize,
    pub options: Vec<OptionLine>,
}

impl SectionRecord {
    pub fn key(&self) -> PartKey {
        PartKey::new(self.kind.clone(), self.name.clone())
    }

    /// Raw value of an option, if present.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.key == key)
            .map(|o| o.value.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.options.iter().any(|o| o.key == key)
    }

    /// Split a raw value on commas. Single scalars come back as one item.
    ///
    /// The format forbids whitespace around separators, so splitting is a
    /// plain `,` split; empty items (``, `a,,b`) are preserved so the
    /// validator can reject them with a precise message.
    pub fn split_list(value: &str) -> Vec<&str> {
        value.split(',').collect()
    }
}
