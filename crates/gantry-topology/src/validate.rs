//! Attribute value resolution and cross-attribute checks.
//!
//! Scalar resolution turns raw option text into typed [`AttrValue`]s per
//! the registry's declarations. Cross-attribute checks cover the rules a
//! single slot cannot express: bound ordering, algorithm-conditional
//! parameters, and kinematics role coverage. Every failure is returned as
//! a diagnostic; nothing here short-circuits.

use gantry_config::SectionRecord;
use gantry_core::{DefectKind, Diagnostic, PartKey};
use gantry_parts::{AttrType, Kinematics};

use crate::part::{AttrValue, Part};

/// Resolve one scalar option against its declared type.
pub(crate) fn resolve_scalar(
    section: &PartKey,
    attr: &str,
    raw: &str,
    ty: &AttrType,
) -> Result<AttrValue, Diagnostic> {
    let invalid = |reason: String| {
        Diagnostic::error(DefectKind::InvalidAttributeValue, section.clone(), reason)
            .with_attribute(attr)
    };

    match ty {
        AttrType::Str => Ok(AttrValue::Str(raw.to_string())),

        AttrType::Bool => match raw {
            "true" => Ok(AttrValue::Bool(true)),
            "false" => Ok(AttrValue::Bool(false)),
            _ => Err(invalid(format!("'{raw}' is not 'true' or 'false'"))),
        },

        AttrType::Int { min, max } => {
            let value: i64 = raw
                .parse()
                .map_err(|_| invalid(format!("'{raw}' is not an integer")))?;
            if let Some(min) = min {
                if value < *min {
                    return Err(invalid(format!("{value} is below the minimum of {min}")));
                }
            }
            if let Some(max) = max {
                if value > *max {
                    return Err(invalid(format!("{value} is above the maximum of {max}")));
                }
            }
            Ok(AttrValue::Int(value))
        }

        AttrType::Float { min, max, above } => {
            let value: f64 = raw
                .parse()
                .map_err(|_| invalid(format!("'{raw}' is not a number")))?;
            if !value.is_finite() {
                return Err(invalid(format!("'{raw}' is not finite")));
            }
            if let Some(min) = min {
                if value < *min {
                    return Err(invalid(format!("{value} is below the minimum of {min}")));
                }
            }
            if let Some(max) = max {
                if value > *max {
                    return Err(invalid(format!("{value} is above the maximum of {max}")));
                }
            }
            if let Some(above) = above {
                if value <= *above {
                    return Err(invalid(format!("{value} must be above {above}")));
                }
            }
            Ok(AttrValue::Float(value))
        }

        AttrType::Enum(values) => match values.iter().find(|v| **v == raw) {
            Some(v) => Ok(AttrValue::Enum(v)),
            None => Err(invalid(format!(
                "'{raw}' is not one of: {}",
                values.join(", ")
            ))),
        },

        // Pin, reference and aggregator slots are resolved by the loader,
        // which owns the claim table and the name index.
        AttrType::Pin(_) | AttrType::PinList | AttrType::Refs { .. } => {
            Err(invalid("slot cannot be resolved as a scalar".to_string()))
        }
    }
}

/// Rail position bounds: `position_min ≤ endstops ≤ position_max`.
pub(crate) fn check_rail(part: &Part) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let section = &part.key;
    let pmin = part.float("position_min");
    let pmax = part.float("position_max");

    if let (Some(lo), Some(hi)) = (pmin, pmax) {
        if lo > hi {
            out.push(
                Diagnostic::error(
                    DefectKind::BoundOrderingViolation,
                    section.clone(),
                    format!("position_min ({lo}) is above position_max ({hi})"),
                )
                .with_attribute("position_min"),
            );
        }
    }

    for attr in ["position_endstop_min", "position_endstop_max"] {
        if let Some(stop) = part.float(attr) {
            if let Some(lo) = pmin {
                if stop < lo {
                    out.push(
                        Diagnostic::error(
                            DefectKind::BoundOrderingViolation,
                            section.clone(),
                            format!("{attr} ({stop}) is below position_min ({lo})"),
                        )
                        .with_attribute(attr),
                    );
                }
            }
            if let Some(hi) = pmax {
                if stop > hi {
                    out.push(
                        Diagnostic::error(
                            DefectKind::BoundOrderingViolation,
                            section.clone(),
                            format!("{attr} ({stop}) is above position_max ({hi})"),
                        )
                        .with_attribute(attr),
                    );
                }
            }
        }
    }

    if let (Some(emin), Some(emax)) = (
        part.float("position_endstop_min"),
        part.float("position_endstop_max"),
    ) {
        if emin > emax {
            out.push(
                Diagnostic::error(
                    DefectKind::BoundOrderingViolation,
                    section.clone(),
                    format!("position_endstop_min ({emin}) is above position_endstop_max ({emax})"),
                )
                .with_attribute("position_endstop_min"),
            );
        }
    }

    out
}

/// A `lo < hi` pair check shared by sensors, heaters, and tcontrol tools.
pub(crate) fn check_range_pair(part: &Part, lo_attr: &str, hi_attr: &str) -> Option<Diagnostic> {
    let (lo, hi) = (part.float(lo_attr)?, part.float(hi_attr)?);
    if lo >= hi {
        Some(
            Diagnostic::error(
                DefectKind::BoundOrderingViolation,
                part.key.clone(),
                format!("{lo_attr} ({lo}) must be below {hi_attr} ({hi})"),
            )
            .with_attribute(lo_attr),
        )
    } else {
        None
    }
}

/// tcontrol rules: temperature window ordering and pid parameter
/// completeness. One diagnostic per missing pid parameter.
pub(crate) fn check_tcontrol(part: &Part, record: &SectionRecord) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    if let Some(d) = check_range_pair(part, "min_temp", "max_temp") {
        out.push(d);
    }
    if part.enum_value("control") == Some("pid") {
        for param in ["pid_kp", "pid_ki", "pid_kd"] {
            if !record.has(param) {
                out.push(
                    Diagnostic::error(
                        DefectKind::MissingRequiredAttribute,
                        part.key.clone(),
                        format!("control 'pid' requires attribute '{param}'"),
                    )
                    .with_attribute(param),
                );
            }
        }
    }
    out
}

/// Kinematics role coverage and arity for one toolhead.
///
/// Counts come from the declared option lists, not from the resolved
/// reference ids, so a rail that failed to resolve still counts toward
/// arity and does not double-report as a role gap.
pub(crate) fn check_toolhead(
    section: &PartKey,
    record: &SectionRecord,
    kin: Kinematics,
) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    for role in kin.roles() {
        let declared = record
            .get(role.name)
            .map(|raw| SectionRecord::split_list(raw).len())
            .unwrap_or(0);
        if role.mandatory && declared == 0 {
            out.push(
                Diagnostic::error(
                    DefectKind::KinematicsRoleUnsatisfied,
                    section.clone(),
                    format!(
                        "kinematics '{}' requires a rail on axis '{}'",
                        kin.as_str(),
                        role.name
                    ),
                )
                .with_attribute(role.name),
            );
        } else if declared > 1 && !role.multi {
            out.push(
                Diagnostic::error(
                    DefectKind::KinematicsRoleUnsatisfied,
                    section.clone(),
                    format!(
                        "axis '{}' accepts a single rail, {} were bound",
                        role.name, declared
                    ),
                )
                .with_attribute(role.name),
            );
        }
    }
    out
}
