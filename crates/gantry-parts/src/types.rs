//! Closed enumerations for every string-typed choice in the format.
//!
//! Keeping these as sum types (instead of free-form strings) turns config
//! typos into validation-time diagnostics instead of consumption-time
//! surprises.

use serde::Serialize;

/// Thermal control-loop algorithm of a tcontrol tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ControlAlgorithm {
    Pid,
    Watermark,
}

impl ControlAlgorithm {
    pub const VALUES: &'static [&'static str] = &["pid", "watermark"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pid" => Some(ControlAlgorithm::Pid),
            "watermark" => Some(ControlAlgorithm::Watermark),
            _ => None,
        }
    }
}

/// What a sensor measures (or detects).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SensorType {
    Endstop,
    Thermometer,
    Hygrometer,
    Barometer,
}

impl SensorType {
    pub const VALUES: &'static [&'static str] =
        &["endstop", "thermometer", "hygrometer", "barometer"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "endstop" => Some(SensorType::Endstop),
            "thermometer" => Some(SensorType::Thermometer),
            "hygrometer" => Some(SensorType::Hygrometer),
            "barometer" => Some(SensorType::Barometer),
            _ => None,
        }
    }
}

/// Cooler hardware family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CoolerKind {
    Fan,
}

impl CoolerKind {
    pub const VALUES: &'static [&'static str] = &["fan"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "fan" => Some(CoolerKind::Fan),
            _ => None,
        }
    }
}

/// How a controller can be restarted out of band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RestartMethod {
    Arduino,
    Command,
    RpiUsb,
}

impl RestartMethod {
    pub const VALUES: &'static [&'static str] = &["arduino", "command", "rpi_usb"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "arduino" => Some(RestartMethod::Arduino),
            "command" => Some(RestartMethod::Command),
            "rpi_usb" => Some(RestartMethod::RpiUsb),
            _ => None,
        }
    }
}

/// Named pin-number mapping applied to a controller's pin ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum PinBoardMap {
    Arduino,
    Beaglebone,
}

impl PinBoardMap {
    pub const VALUES: &'static [&'static str] = &["arduino", "beaglebone"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "arduino" => Some(PinBoardMap::Arduino),
            "beaglebone" => Some(PinBoardMap::Beaglebone),
            _ => None,
        }
    }
}

/// Variant of a `tool` composite, selecting its extra contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ToolType {
    Tcontrol,
    Extruder,
}

impl ToolType {
    pub const VALUES: &'static [&'static str] = &["tcontrol", "extruder"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tcontrol" => Some(ToolType::Tcontrol),
            "extruder" => Some(ToolType::Extruder),
            _ => None,
        }
    }
}
