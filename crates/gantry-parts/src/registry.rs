//! The built-in type registry.
//!
//! Attribute contracts follow the reference hardware set: controllers,
//! virtual pin aggregators, sensors, steppers, heaters, coolers and
//! nozzles as leaves; tools, carts, rails, toolheads and the printer root
//! as containers.

use std::collections::HashMap;

use crate::kinematics::Kinematics;
use crate::schema::{AttrSpec, AttrType, Category, PartSchema, PinCaps};
use crate::types::{ControlAlgorithm, CoolerKind, PinBoardMap, RestartMethod, SensorType, ToolType};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("schema for kind '{kind}' is already registered")]
    Duplicate { kind: &'static str },

    #[error("schema for kind '{kind}': attribute '{attr}' conflicts with its category")]
    CategoryViolation {
        kind: &'static str,
        attr: &'static str,
    },
}

/// Kind → schema mapping. Open for extension: plugins register additional
/// schemas through the provider registry without touching the built-ins.
#[derive(Debug, Default)]
pub struct Registry {
    schemas: HashMap<&'static str, PartSchema>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with every built-in kind.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        for schema in builtin_schemas() {
            // Built-in schemas are statically well-formed.
            if reg.register(schema).is_err() {
                unreachable!("built-in schema set is consistent");
            }
        }
        reg
    }

    /// Add a schema, rejecting duplicates and category/slot mismatches.
    pub fn register(&mut self, schema: PartSchema) -> Result<(), SchemaError> {
        if let Some(attr) = schema.category_violation() {
            return Err(SchemaError::CategoryViolation {
                kind: schema.kind,
                attr,
            });
        }
        if self.schemas.contains_key(schema.kind) {
            return Err(SchemaError::Duplicate { kind: schema.kind });
        }
        self.schemas.insert(schema.kind, schema);
        Ok(())
    }

    pub fn get(&self, kind: &str) -> Option<&PartSchema> {
        self.schemas.get(kind)
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.schemas.contains_key(kind)
    }
}

/// Contract for one `tool` variant. The base `tool` schema only pins down
/// `type`; once the variant is known the full contract replaces it.
pub fn tool_variant(tool_type: ToolType) -> PartSchema {
    match tool_type {
        ToolType::Tcontrol => PartSchema::new(
            "tool",
            Category::Composite,
            vec![
                AttrSpec::new("type", AttrType::Enum(ToolType::VALUES)),
                AttrSpec::new("control", AttrType::Enum(ControlAlgorithm::VALUES)),
                AttrSpec::new("min_temp", AttrType::float_any()),
                AttrSpec::new("max_temp", AttrType::float_any()),
                AttrSpec::new("sensor", AttrType::ref_many("sensor")),
            ],
            vec![
                AttrSpec::new("heater", AttrType::ref_one("heater")),
                AttrSpec::new("cooler", AttrType::ref_one("cooler")),
                // required iff control is pid; the validator owns that rule
                AttrSpec::new("pid_kp", AttrType::float_any()),
                AttrSpec::new("pid_ki", AttrType::float_any()),
                AttrSpec::new("pid_kd", AttrType::float_any()),
            ],
        ),
        ToolType::Extruder => PartSchema::new(
            "tool",
            Category::Composite,
            vec![
                AttrSpec::new("type", AttrType::Enum(ToolType::VALUES)),
                AttrSpec::new("filament_diameter", AttrType::float_above(0.0)),
                AttrSpec::new("min_extrude_temp", AttrType::float_any()),
                AttrSpec::new("stepper", AttrType::ref_many("stepper")),
            ],
            vec![
                AttrSpec::new("heater", AttrType::ref_one("heater")),
                AttrSpec::new("sensor", AttrType::ref_many("sensor")),
                AttrSpec::new("nozzle", AttrType::ref_one("nozzle")),
                AttrSpec::new("cooler", AttrType::ref_one("cooler")),
            ],
        ),
    }
}

fn builtin_schemas() -> Vec<PartSchema> {
    vec![
        PartSchema::new(
            "mcu",
            Category::Simple,
            vec![AttrSpec::new("serial", AttrType::Str)],
            vec![
                AttrSpec::new(
                    "baud",
                    AttrType::Int {
                        min: Some(1200),
                        max: None,
                    },
                ),
                AttrSpec::new("pin_map", AttrType::Enum(PinBoardMap::VALUES)),
                AttrSpec::new("restart_method", AttrType::Enum(RestartMethod::VALUES)),
            ],
        ),
        PartSchema::new(
            "virtual",
            Category::Simple,
            vec![AttrSpec::new("pin", AttrType::PinList)],
            vec![],
        ),
        PartSchema::new(
            "sensor",
            Category::Simple,
            vec![
                AttrSpec::new("type", AttrType::Enum(SensorType::VALUES)),
                AttrSpec::new("pin", AttrType::Pin(PinCaps::INVERT_PULLUP)),
            ],
            vec![
                AttrSpec::new("temp_min", AttrType::float_any()),
                AttrSpec::new("temp_max", AttrType::float_any()),
            ],
        ),
        PartSchema::new(
            "stepper",
            Category::Simple,
            vec![
                AttrSpec::new("pin_step", AttrType::Pin(PinCaps::INVERT)),
                AttrSpec::new("pin_dir", AttrType::Pin(PinCaps::INVERT)),
            ],
            vec![
                AttrSpec::new("pin_enable", AttrType::Pin(PinCaps::INVERT)),
                AttrSpec::new("step_dist", AttrType::float_above(0.0)),
            ],
        ),
        PartSchema::new(
            "heater",
            Category::Simple,
            vec![AttrSpec::new("pin", AttrType::Pin(PinCaps::INVERT))],
            vec![
                AttrSpec::new(
                    "power_max",
                    AttrType::Float {
                        min: None,
                        max: Some(1.0),
                        above: Some(0.0),
                    },
                ),
                AttrSpec::new("temp_min", AttrType::float_any()),
                AttrSpec::new("temp_max", AttrType::float_any()),
            ],
        ),
        PartSchema::new(
            "cooler",
            Category::Simple,
            vec![
                AttrSpec::new("type", AttrType::Enum(CoolerKind::VALUES)),
                AttrSpec::new("pin", AttrType::Pin(PinCaps::INVERT)),
            ],
            vec![
                AttrSpec::new(
                    "max_power",
                    AttrType::Float {
                        min: None,
                        max: Some(1.0),
                        above: Some(0.0),
                    },
                ),
                AttrSpec::new(
                    "off_below",
                    AttrType::Float {
                        min: Some(0.0),
                        max: Some(1.0),
                        above: None,
                    },
                ),
                AttrSpec::new("cycle_time", AttrType::float_above(0.0)),
                AttrSpec::new("hardware_pwm", AttrType::Bool),
            ],
        ),
        PartSchema::new(
            "nozzle",
            Category::Simple,
            vec![AttrSpec::new("diameter", AttrType::float_above(0.0))],
            vec![],
        ),
        PartSchema::new(
            "tool",
            Category::Composite,
            vec![AttrSpec::new("type", AttrType::Enum(ToolType::VALUES))],
            vec![],
        ),
        PartSchema::new(
            "cart",
            Category::Composite,
            vec![],
            vec![AttrSpec::new("tool", AttrType::ref_many("tool"))],
        ),
        PartSchema::new(
            "rail",
            Category::Composite,
            vec![
                AttrSpec::new("stepper", AttrType::ref_many("stepper")),
                AttrSpec::new("position_min", AttrType::float_any()),
                AttrSpec::new("position_max", AttrType::float_any()),
            ],
            vec![
                AttrSpec::new("sensor_min", AttrType::ref_one("sensor")),
                AttrSpec::new("sensor_max", AttrType::ref_one("sensor")),
                AttrSpec::new("sensor_level", AttrType::ref_one("sensor")),
                AttrSpec::new("cart", AttrType::ref_one("cart")),
                AttrSpec::new("position_endstop_min", AttrType::float_any()),
                AttrSpec::new("position_endstop_max", AttrType::float_any()),
            ],
        ),
        PartSchema::new(
            "toolhead",
            Category::Composite,
            vec![
                AttrSpec::new("kinematics", AttrType::Enum(Kinematics::VALUES)),
                AttrSpec::new("max_velocity", AttrType::float_above(0.0)),
                AttrSpec::new("max_accel", AttrType::float_above(0.0)),
            ],
            vec![
                AttrSpec::new("max_z_velocity", AttrType::float_above(0.0)),
                AttrSpec::new("max_z_accel", AttrType::float_above(0.0)),
                AttrSpec::new("x", AttrType::ref_many("rail")),
                AttrSpec::new("y", AttrType::ref_many("rail")),
                AttrSpec::new("z", AttrType::ref_many("rail")),
            ],
        ),
        PartSchema::new(
            "printer",
            Category::Composite,
            vec![AttrSpec::new("mcu", AttrType::ref_many("mcu"))],
            vec![
                AttrSpec::new("toolhead", AttrType::ref_many("toolhead")),
                AttrSpec::new("tool", AttrType::ref_many("tool")),
            ],
        ),
    ]
}
