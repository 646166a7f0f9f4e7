//! The single-pass composition pipeline.

use std::collections::HashMap;

use gantry_config::{SectionRecord, parse_document};
use gantry_core::{DefectKind, Diagnostic, PartId, PartKey};
use gantry_parts::{
    AttrType, Category, Kinematics, ProviderRegistry, Registry, ToolType, tool_variant,
};
use gantry_pins::{PinClaims, PinError, PinExpr};
use tracing::{debug, warn};

use crate::part::{AttrValue, Binding, Part, RefEdge};
use crate::topology::{PinAssignment, PrinterRoot, Topology};
use crate::validate;
use crate::{LoadError, LoadResult};

/// A successful load: the frozen topology plus any non-fatal diagnostics.
#[derive(Debug)]
pub struct Loaded {
    pub topology: Topology,
    pub warnings: Vec<Diagnostic>,
}

/// Load a source with the built-in registry and provider set.
pub fn load_str(source: &str) -> LoadResult<Loaded> {
    let registry = Registry::builtin();
    let providers = ProviderRegistry::with_builtin();
    Loader::new(&registry, &providers).load(source)
}

/// One-shot topology loader.
///
/// Owns the claim table and name index for exactly one load; both die with
/// it. Records are processed strictly in source order, so every reference
/// must already be resolved at its point of use, and the result is either
/// a complete valid topology or the full list of defects, never a partial
/// graph.
pub struct Loader<'a> {
    registry: &'a Registry,
    providers: &'a ProviderRegistry,
}

struct LoadState {
    /// `(kind, name)` → record position, for forward-reference diagnosis.
    declared: HashMap<PartKey, usize>,
    index: HashMap<PartKey, PartId>,
    parts: Vec<Part>,
    claims: PinClaims,
    diags: Vec<Diagnostic>,
    printer: PrinterRoot,
}

impl LoadState {
    fn new() -> Self {
        Self {
            declared: HashMap::new(),
            index: HashMap::new(),
            parts: Vec::new(),
            claims: PinClaims::new(),
            diags: Vec::new(),
            printer: PrinterRoot::default(),
        }
    }

    fn next_id(&self) -> PartId {
        PartId::from_index(self.parts.len() as u32)
    }

    fn push_part(&mut self, part: Part) {
        self.index.insert(part.key.clone(), part.id);
        self.parts.push(part);
    }
}

impl<'a> Loader<'a> {
    pub fn new(registry: &'a Registry, providers: &'a ProviderRegistry) -> Self {
        Self {
            registry,
            providers,
        }
    }

    pub fn load(&self, source: &str) -> LoadResult<Loaded> {
        let records = parse_document(source)?;
        debug!(sections = records.len(), "composing topology");

        let mut st = LoadState::new();
        for (pos, record) in records.iter().enumerate() {
            st.declared.insert(record.key(), pos);
        }
        for (pos, record) in records.iter().enumerate() {
            self.load_record(pos, record, &mut st);
        }

        if !st.index.contains_key(&PartKey::unnamed("printer")) {
            st.diags.push(Diagnostic::error(
                DefectKind::MalformedSection,
                PartKey::unnamed("printer"),
                "no [printer] root section declared",
            ));
        }

        if st.diags.iter().any(Diagnostic::is_error) {
            return Err(LoadError::Invalid {
                diagnostics: st.diags,
            });
        }

        Ok(self.freeze(st))
    }

    /// Assemble the immutable topology once the pass finished clean.
    fn freeze(&self, st: LoadState) -> Loaded {
        let LoadState {
            index,
            parts,
            claims,
            diags: warnings,
            printer,
            ..
        } = st;

        let pins: Vec<PinAssignment> = claims
            .claimed()
            .filter_map(|((controller, pin), claimant)| {
                index.get(&claimant.part).map(|&owner| PinAssignment {
                    controller: controller.clone(),
                    pin: pin.clone(),
                    owner,
                })
            })
            .collect();

        // Reachability from the printer root; virtual aggregators are
        // always mounted under their controllers. Everything else that is
        // declared but unreferenced is kept aside as a spare.
        let mut reachable = vec![false; parts.len()];
        let mut stack: Vec<PartId> = Vec::new();
        if let Some(root) = printer.part {
            stack.push(root);
        }
        for part in &parts {
            if part.kind() == "virtual" {
                stack.push(part.id);
            }
        }
        while let Some(id) = stack.pop() {
            let idx = id.index() as usize;
            if reachable[idx] {
                continue;
            }
            reachable[idx] = true;
            for edge in &parts[idx].refs {
                stack.push(edge.target);
            }
        }
        let spares: Vec<PartId> = parts
            .iter()
            .filter(|p| !reachable[p.id.index() as usize])
            .map(|p| p.id)
            .collect();
        for &id in &spares {
            debug!(part = %parts[id.index() as usize].key, "unmounted part kept as spare");
        }

        let topology = Topology::new(parts, index, printer, spares, pins);
        Loaded {
            topology,
            warnings,
        }
    }

    fn load_record(&self, pos: usize, record: &SectionRecord, st: &mut LoadState) {
        let key = record.key();

        if record.kind == "printer" {
            if !record.name.is_empty() {
                st.diags.push(Diagnostic::error(
                    DefectKind::MalformedSection,
                    key,
                    "the printer root section does not take a name",
                ));
                return;
            }
        } else if record.name.is_empty() {
            st.diags.push(Diagnostic::error(
                DefectKind::MalformedSection,
                key.clone(),
                format!("section '[{}]' requires a name", record.kind),
            ));
            return;
        }

        let (mut schema, binding) = if let Some(schema) = self.registry.get(&record.kind) {
            (schema.clone(), Binding::Builtin)
        } else if let Some(provider) = self.providers.get(&record.kind) {
            let missing = provider.schema().missing_required(|k| record.has(k));
            if !missing.is_empty() {
                warn!(
                    section = %key,
                    missing = missing.join(","),
                    "extension contract unmet, binding inert placeholder"
                );
                st.diags.push(
                    Diagnostic::warning(
                        DefectKind::PluginContractUnmet,
                        key.clone(),
                        format!(
                            "provider '{}' requires attribute(s): {}",
                            record.kind,
                            missing.join(", ")
                        ),
                    ),
                );
                let missing = missing.into_iter().map(str::to_string).collect();
                self.push_unresolved(
                    record,
                    provider.schema().category,
                    Binding::Inert { missing },
                    st,
                );
                return;
            }
            (
                provider.schema().clone(),
                Binding::Plugin {
                    provider: record.kind.clone(),
                },
            )
        } else {
            st.diags.push(Diagnostic::error(
                DefectKind::UnknownKind,
                key,
                format!("unknown section kind '{}'", record.kind),
            ));
            return;
        };

        // A tool's full contract depends on its variant.
        if record.kind == "tool" {
            match record.get("type").map(|raw| (raw, ToolType::parse(raw))) {
                Some((_, Some(variant))) => schema = tool_variant(variant),
                Some((raw, None)) => {
                    st.diags.push(
                        Diagnostic::error(
                            DefectKind::InvalidAttributeValue,
                            key,
                            format!("'{raw}' is not one of: {}", ToolType::VALUES.join(", ")),
                        )
                        .with_attribute("type"),
                    );
                    self.push_unresolved(record, schema.category, binding, st);
                    return;
                }
                None => {
                    st.diags.push(
                        Diagnostic::error(
                            DefectKind::MissingRequiredAttribute,
                            key,
                            "missing required attribute 'type'",
                        )
                        .with_attribute("type"),
                    );
                    self.push_unresolved(record, schema.category, binding, st);
                    return;
                }
            }
        }

        if record.kind == "mcu" {
            st.claims.register_controller(&record.name);
        }

        let mut attrs: Vec<(String, AttrValue)> = Vec::new();
        let mut refs: Vec<RefEdge> = Vec::new();

        for opt in &record.options {
            let Some(spec) = schema.attr(&opt.key) else {
                self.unknown_option(pos, record, &key, opt, &mut attrs, &mut refs, st);
                continue;
            };
            match &spec.ty {
                AttrType::Pin(caps) => match PinExpr::parse(&opt.value, *caps) {
                    Ok(expr) => match st.claims.claim(&expr, &key, &opt.key) {
                        Ok(_) => attrs.push((opt.key.clone(), AttrValue::Pin(expr))),
                        Err(err) => st.diags.push(pin_diag(err, &key, &opt.key)),
                    },
                    Err(err) => st.diags.push(pin_diag(err, &key, &opt.key)),
                },

                AttrType::PinList => {
                    let mut targets = Vec::new();
                    let mut ok = true;
                    for item in SectionRecord::split_list(&opt.value) {
                        match PinExpr::parse_target(item) {
                            Ok(target) => targets.push(target),
                            Err(err) => {
                                ok = false;
                                st.diags.push(pin_diag(err, &key, &opt.key));
                            }
                        }
                    }
                    if ok {
                        match st.claims.register_virtual(&record.name, targets.clone()) {
                            Ok(()) => {
                                attrs.push((opt.key.clone(), AttrValue::PinTargets(targets)));
                            }
                            Err(err) => st.diags.push(pin_diag(err, &key, &opt.key)),
                        }
                    }
                }

                AttrType::Refs { kind, min, max } => {
                    let ids = self.resolve_refs(
                        pos, &key, &opt.key, &opt.value, kind, *min, *max, &mut refs, st,
                    );
                    attrs.push((opt.key.clone(), AttrValue::Refs(ids)));
                }

                scalar => match validate::resolve_scalar(&key, &opt.key, &opt.value, scalar) {
                    Ok(value) => attrs.push((opt.key.clone(), value)),
                    Err(diag) => st.diags.push(diag),
                },
            }
        }

        for name in schema.missing_required(|k| record.has(k)) {
            st.diags.push(
                Diagnostic::error(
                    DefectKind::MissingRequiredAttribute,
                    key.clone(),
                    format!("missing required attribute '{name}'"),
                )
                .with_attribute(name),
            );
        }

        let part = Part {
            id: st.next_id(),
            key: key.clone(),
            category: schema.category,
            binding,
            line: record.line,
            attrs,
            refs,
        };

        match record.kind.as_str() {
            "rail" => st.diags.extend(validate::check_rail(&part)),
            "tool" => {
                if part.enum_value("type") == Some("tcontrol") {
                    st.diags.extend(validate::check_tcontrol(&part, record));
                }
            }
            "sensor" | "heater" => {
                if let Some(diag) = validate::check_range_pair(&part, "temp_min", "temp_max") {
                    st.diags.push(diag);
                }
            }
            "toolhead" => {
                if let Some(kin) = part.enum_value("kinematics").and_then(Kinematics::parse) {
                    st.diags
                        .extend(validate::check_toolhead(&key, record, kin));
                }
            }
            "printer" => {
                st.printer.part = Some(part.id);
                st.printer.controllers = part.refs_in("mcu").to_vec();
                st.printer.toolheads = part.refs_in("toolhead").to_vec();
                st.printer.free_tools = part.refs_in("tool").to_vec();
                for (name, value) in &part.attrs {
                    if matches!(name.as_str(), "mcu" | "toolhead" | "tool") {
                        continue;
                    }
                    if let AttrValue::Refs(ids) = value {
                        st.printer.aux.extend(ids.iter().copied());
                    }
                }
            }
            _ => {}
        }

        st.push_part(part);
    }

    /// Printer-root options are open: a key naming any known kind mounts
    /// parts of that kind; anything else is kept as a verbatim scalar.
    /// On every other kind an undeclared option is a defect.
    fn unknown_option(
        &self,
        pos: usize,
        record: &SectionRecord,
        key: &PartKey,
        opt: &gantry_config::OptionLine,
        attrs: &mut Vec<(String, AttrValue)>,
        refs: &mut Vec<RefEdge>,
        st: &mut LoadState,
    ) {
        if record.kind == "printer" {
            if self.registry.contains(&opt.key) || self.providers.contains(&opt.key) {
                let ids =
                    self.resolve_refs(pos, key, &opt.key, &opt.value, &opt.key, 1, None, refs, st);
                attrs.push((opt.key.clone(), AttrValue::Refs(ids)));
            } else {
                attrs.push((opt.key.clone(), AttrValue::Str(opt.value.clone())));
            }
        } else {
            st.diags.push(
                Diagnostic::error(
                    DefectKind::InvalidAttributeValue,
                    key.clone(),
                    format!(
                        "'{}' is not an attribute of kind '{}'",
                        opt.key, record.kind
                    ),
                )
                .with_attribute(&opt.key),
            );
        }
    }

    /// Resolve one reference-list option against the index built so far.
    #[allow(clippy::too_many_arguments)]
    fn resolve_refs(
        &self,
        pos: usize,
        section: &PartKey,
        attr: &str,
        raw: &str,
        ref_kind: &str,
        min: usize,
        max: Option<usize>,
        refs: &mut Vec<RefEdge>,
        st: &mut LoadState,
    ) -> Vec<PartId> {
        let items = SectionRecord::split_list(raw);
        if items.len() < min {
            st.diags.push(
                Diagnostic::error(
                    DefectKind::InvalidAttributeValue,
                    section.clone(),
                    format!("expects at least {min} reference(s)"),
                )
                .with_attribute(attr),
            );
        }
        if let Some(max) = max {
            if items.len() > max {
                st.diags.push(
                    Diagnostic::error(
                        DefectKind::InvalidAttributeValue,
                        section.clone(),
                        format!(
                            "accepts at most {max} reference(s), {} given",
                            items.len()
                        ),
                    )
                    .with_attribute(attr),
                );
            }
        }

        let mut ids = Vec::new();
        for item in items {
            if item.is_empty() {
                st.diags.push(
                    Diagnostic::error(
                        DefectKind::InvalidAttributeValue,
                        section.clone(),
                        "empty reference in list".to_string(),
                    )
                    .with_attribute(attr),
                );
                continue;
            }
            let target = PartKey::new(ref_kind, item);
            match st.index.get(&target).copied() {
                Some(id) => {
                    ids.push(id);
                    refs.push(RefEdge {
                        attribute: attr.to_string(),
                        target: id,
                    });
                }
                None => {
                    let diag = self.dangling_ref(pos, section, attr, &target, &st.declared);
                    st.diags.push(diag);
                }
            }
        }
        ids
    }

    /// Classify an unresolvable reference: never declared, declared later
    /// (forward reference or self-reference), or declared but dead.
    fn dangling_ref(
        &self,
        pos: usize,
        section: &PartKey,
        attr: &str,
        target: &PartKey,
        declared: &HashMap<PartKey, usize>,
    ) -> Diagnostic {
        match declared.get(target) {
            None => Diagnostic::error(
                DefectKind::UndeclaredReference,
                section.clone(),
                format!("references undeclared part [{target}]"),
            )
            .with_attribute(attr),
            Some(&decl_pos) if decl_pos == pos => Diagnostic::error(
                DefectKind::ForwardReferenceNotAllowed,
                section.clone(),
                format!("[{section}] references itself"),
            )
            .with_attribute(attr),
            Some(&decl_pos) if decl_pos > pos => Diagnostic::error(
                DefectKind::ForwardReferenceNotAllowed,
                section.clone(),
                format!("[{target}] is declared after its point of use"),
            )
            .with_attribute(attr),
            Some(_) => Diagnostic::error(
                DefectKind::UndeclaredReference,
                section.clone(),
                format!("[{target}] failed to load"),
            )
            .with_attribute(attr),
        }
    }

    /// Record a part whose attributes could not be interpreted (inert
    /// placeholder, or a tool without a usable variant). Raw values are
    /// kept so the part stays addressable by later references.
    fn push_unresolved(
        &self,
        record: &SectionRecord,
        category: Category,
        binding: Binding,
        st: &mut LoadState,
    ) {
        let attrs = record
            .options
            .iter()
            .map(|o| (o.key.clone(), AttrValue::Str(o.value.clone())))
            .collect();
        let part = Part {
            id: st.next_id(),
            key: record.key(),
            category,
            binding,
            line: record.line,
            attrs,
            refs: Vec::new(),
        };
        st.push_part(part);
    }
}

fn pin_diag(err: PinError, section: &PartKey, attr: &str) -> Diagnostic {
    let kind = match &err {
        PinError::InvalidExpr { .. } | PinError::EmptyAggregator { .. } => {
            DefectKind::InvalidAttributeValue
        }
        PinError::UnknownController { .. } | PinError::UnknownAggregator { .. } => {
            DefectKind::UnknownController
        }
        PinError::PinConflict { .. } => DefectKind::PinConflict,
    };
    Diagnostic::error(kind, section.clone(), err.to_string()).with_attribute(attr)
}
