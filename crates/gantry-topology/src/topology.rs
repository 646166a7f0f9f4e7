//! The finished, queryable topology graph.

use std::collections::HashMap;

use gantry_core::{PartId, PartKey};
use serde::Serialize;

use crate::part::{AttrValue, Part};

/// One physical pin assignment surviving the load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PinAssignment {
    pub controller: String,
    pub pin: String,
    pub owner: PartId,
}

/// The printer root's resolved mount points.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PrinterRoot {
    /// Id of the `printer` part itself.
    pub part: Option<PartId>,
    /// Controllers in declaration order; the first one is primary.
    pub controllers: Vec<PartId>,
    pub toolheads: Vec<PartId>,
    /// Tools mounted on the root rather than on a toolhead.
    pub free_tools: Vec<PartId>,
    /// Auxiliary mounts (plugin kinds and directly mounted leaves).
    pub aux: Vec<PartId>,
}

/// An immutable, fully resolved topology.
///
/// Built only by [`crate::Loader`]; handed out read-only. All cross part
/// links are ids into the arena, so the graph is cheap to clone, compare,
/// and serialize. Loading the same source twice yields equal topologies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Topology {
    parts: Vec<Part>,
    #[serde(skip)]
    index: HashMap<PartKey, PartId>,
    printer: PrinterRoot,
    /// Parts declared but not reachable from the printer root.
    spares: Vec<PartId>,
    pins: Vec<PinAssignment>,
}

impl Topology {
    pub(crate) fn new(
        parts: Vec<Part>,
        index: HashMap<PartKey, PartId>,
        printer: PrinterRoot,
        spares: Vec<PartId>,
        pins: Vec<PinAssignment>,
    ) -> Self {
        Self {
            parts,
            index,
            printer,
            spares,
            pins,
        }
    }

    /// All parts in declaration order.
    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    pub fn part(&self, id: PartId) -> &Part {
        &self.parts[id.index() as usize]
    }

    /// Look up a part by `(kind, name)`.
    pub fn get(&self, kind: &str, name: &str) -> Option<&Part> {
        self.index
            .get(&PartKey::new(kind, name))
            .map(|&id| self.part(id))
    }

    /// Controllers in declaration order; the first is the primary.
    pub fn controllers(&self) -> impl Iterator<Item = &Part> {
        self.printer.controllers.iter().map(|&id| self.part(id))
    }

    pub fn primary_controller(&self) -> Option<&Part> {
        self.printer.controllers.first().map(|&id| self.part(id))
    }

    pub fn toolheads(&self) -> impl Iterator<Item = &Part> {
        self.printer.toolheads.iter().map(|&id| self.part(id))
    }

    /// Tools mounted on the printer root, outside any toolhead.
    pub fn free_tools(&self) -> impl Iterator<Item = &Part> {
        self.printer.free_tools.iter().map(|&id| self.part(id))
    }

    pub fn printer_root(&self) -> &PrinterRoot {
        &self.printer
    }

    /// Parts kept out of the assembled tree (declared, valid, unmounted).
    pub fn spares(&self) -> impl Iterator<Item = &Part> {
        self.spares.iter().map(|&id| self.part(id))
    }

    /// Physical pin ownership, in `(controller, pin)` order.
    pub fn pins(&self) -> &[PinAssignment] {
        &self.pins
    }

    /// Indented human-readable dump of the assembled tree.
    pub fn render_tree(&self) -> String {
        let mut out = String::new();
        out.push_str("printer\n");
        for &id in &self.printer.controllers {
            let tag = if Some(id) == self.printer.controllers.first().copied() {
                " (primary)"
            } else {
                ""
            };
            out.push_str(&format!("  {}{}\n", self.part(id).key, tag));
        }
        for part in self.parts.iter().filter(|p| p.kind() == "virtual") {
            out.push_str(&format!("  {}\n", part.key));
        }
        for &id in &self.printer.toolheads {
            self.render_part(&mut out, id, 1);
        }
        for &id in &self.printer.free_tools {
            self.render_part(&mut out, id, 1);
        }
        for &id in &self.printer.aux {
            self.render_part(&mut out, id, 1);
        }
        if !self.spares.is_empty() {
            out.push_str("spares\n");
            for &id in &self.spares {
                out.push_str(&format!("  {}\n", self.part(id).key));
            }
        }
        out
    }

    fn render_part(&self, out: &mut String, id: PartId, depth: usize) {
        let part = self.part(id);
        out.push_str(&"  ".repeat(depth));
        out.push_str(&part.key.to_string());
        out.push('\n');
        for edge in &part.refs {
            self.render_part(out, edge.target, depth + 1);
        }
    }

    /// Ids reachable from a part by following reference edges.
    pub fn reachable_from(&self, id: PartId) -> Vec<PartId> {
        let mut seen = vec![false; self.parts.len()];
        let mut stack = vec![id];
        let mut order = Vec::new();
        while let Some(next) = stack.pop() {
            let idx = next.index() as usize;
            if seen[idx] {
                continue;
            }
            seen[idx] = true;
            order.push(next);
            for edge in &self.parts[idx].refs {
                stack.push(edge.target);
            }
        }
        order
    }

    /// Convenience: a rail is dual-stepper when it binds more than one stepper.
    pub fn is_dual_stepper_rail(&self, rail: &Part) -> bool {
        rail.refs_in("stepper").len() > 1
    }

    /// Convenience: an axis is dual-cart when a toolhead binds more than
    /// one rail to the role.
    pub fn is_dual_cart_axis(&self, toolhead: &Part, role: &str) -> bool {
        toolhead.refs_in(role).len() > 1
    }

    /// Scalar attributes kept verbatim on the printer root.
    pub fn printer_attr(&self, name: &str) -> Option<&AttrValue> {
        let part = self.printer.part.map(|id| self.part(id))?;
        part.attr(name)
    }
}
