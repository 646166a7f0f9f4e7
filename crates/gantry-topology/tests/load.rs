//! End-to-end loads of complete configurations.

use gantry_core::DefectKind;
use gantry_topology::{LoadError, load_str};

/// The reference dual-gantry machine: three controllers, two cartesian
/// toolheads (one with a dual-stepper z rail), four extruder tools mounted
/// through carts, and a free-standing enclosure tool.
const SAMPLE: &str = "\
# three controllers, gamma drives the extruder bank
[mcu alpha]
serial: /dev/serial/by-id/usb-alpha
restart_method: command

[mcu beta]
serial: /dev/serial/by-id/usb-beta

[mcu gamma]
serial: /dev/serial/by-id/usb-gamma
baud: 115200

[virtual fans]
pin: alpha:PF0,beta:PF1

[stepper lsx]
pin_step: alpha:PA0
pin_dir: alpha:!PA1

[stepper lsy]
pin_step: alpha:PA2
pin_dir: alpha:PA3

[stepper lsz]
pin_step: alpha:PA4
pin_dir: alpha:PA5

[stepper rsx]
pin_step: beta:PB0
pin_dir: beta:PB1

[stepper rsy]
pin_step: beta:PB2
pin_dir: beta:PB3

[stepper rsz0]
pin_step: beta:PB4
pin_dir: beta:PB5

[stepper rsz1]
pin_step: beta:PB6
pin_dir: beta:PB7

[stepper les0]
pin_step: gamma:PC0
pin_dir: gamma:PC1

[stepper les1]
pin_step: gamma:PC2
pin_dir: gamma:PC3

[stepper res0]
pin_step: gamma:PC4
pin_dir: gamma:PC5

[stepper res1]
pin_step: gamma:PC6
pin_dir: gamma:PC7

[sensor lxmin]
type: endstop
pin: alpha:^!PE0

[sensor rxmin]
type: endstop
pin: beta:^PE1

[sensor lt0]
type: thermometer
pin: gamma:PK0

[sensor lt1]
type: thermometer
pin: gamma:PK1

[sensor rt0]
type: thermometer
pin: gamma:PK2

[sensor rt1]
type: thermometer
pin: gamma:PK3

[sensor boxtemp]
type: thermometer
pin: gamma:PK4
temp_min: -10
temp_max: 120

[heater lh0]
pin: gamma:PH0

[heater lh1]
pin: gamma:PH1

[heater rh0]
pin: gamma:PH2

[heater rh1]
pin: gamma:PH3

[heater boxheat]
pin: gamma:PH4
power_max: 0.7

[cooler casefan]
type: fan
pin: virtual:fans

[nozzle ln0]
diameter: 0.4

[nozzle ln1]
diameter: 0.4

[nozzle rn0]
diameter: 0.6

[nozzle rn1]
diameter: 0.6

[tool le0]
type: extruder
filament_diameter: 1.75
min_extrude_temp: 170
stepper: les0
heater: lh0
sensor: lt0
nozzle: ln0

[tool le1]
type: extruder
filament_diameter: 1.75
min_extrude_temp: 170
stepper: les1
heater: lh1
sensor: lt1
nozzle: ln1

[tool re0]
type: extruder
filament_diameter: 1.75
min_extrude_temp: 170
stepper: res0
heater: rh0
sensor: rt0
nozzle: rn0

[tool re1]
type: extruder
filament_diameter: 1.75
min_extrude_temp: 170
stepper: res1
heater: rh1
sensor: rt1
nozzle: rn1

[tool box]
type: tcontrol
control: watermark
min_temp: 0
max_temp: 70
sensor: boxtemp
heater: boxheat

[cart lcart]
tool: le0,le1

[cart rcart]
tool: re0,re1

[rail lx]
stepper: lsx
position_min: 0
position_max: 300
position_endstop_min: 0
sensor_min: lxmin
cart: lcart

[rail ly]
stepper: lsy
position_min: 0
position_max: 300

[rail lz]
stepper: lsz
position_min: 0
position_max: 250

[rail rx]
stepper: rsx
position_min: 0
position_max: 300
sensor_min: rxmin
cart: rcart

[rail ry]
stepper: rsy
position_min: 0
position_max: 300

[rail rz]
stepper: rsz0,rsz1
position_min: 0
position_max: 250

[toolhead left]
kinematics: cartesian
max_velocity: 300
max_accel: 3000
max_z_velocity: 25
max_z_accel: 100
x: lx
y: ly
z: lz

[toolhead right]
kinematics: cartesian
max_velocity: 300
max_accel: 3000
x: rx
y: ry
z: rz

[printer]
mcu: alpha,beta,gamma
toolhead: left,right
tool: box
cooler: casefan
name: dual-gantry-test
";

/// Minimal valid scaffold for failure-path tests.
fn with_scaffold(body: &str) -> String {
    format!("[mcu m]\nserial: /dev/x\n{body}[printer]\nmcu: m\n")
}

fn diagnostics(source: &str) -> Vec<gantry_core::Diagnostic> {
    match load_str(source) {
        Err(LoadError::Invalid { diagnostics }) => diagnostics,
        Err(other) => panic!("expected validation failure, got parse error: {other}"),
        Ok(_) => panic!("expected the load to fail"),
    }
}

#[test]
fn sample_machine_loads_clean() {
    let loaded = load_str(SAMPLE).expect("sample must load");
    assert!(loaded.warnings.is_empty());

    let topo = &loaded.topology;
    assert_eq!(topo.controllers().count(), 3);
    assert_eq!(topo.primary_controller().unwrap().name(), "alpha");
    assert_eq!(topo.toolheads().count(), 2);

    let free: Vec<&str> = topo.free_tools().map(|t| t.name()).collect();
    assert_eq!(free, vec!["box"]);

    // nothing left unmounted
    assert_eq!(topo.spares().count(), 0);
}

#[test]
fn sample_exposes_dual_stepper_rail() {
    let loaded = load_str(SAMPLE).unwrap();
    let topo = &loaded.topology;

    let rz = topo.get("rail", "rz").unwrap();
    assert!(topo.is_dual_stepper_rail(rz));
    assert_eq!(rz.refs_in("stepper").len(), 2);

    let lz = topo.get("rail", "lz").unwrap();
    assert!(!topo.is_dual_stepper_rail(lz));
}

#[test]
fn sample_virtual_fan_out_claims_every_target() {
    let loaded = load_str(SAMPLE).unwrap();
    let topo = &loaded.topology;

    let casefan = topo.get("cooler", "casefan").unwrap();
    for (controller, pin) in [("alpha", "PF0"), ("beta", "PF1")] {
        let assignment = topo
            .pins()
            .iter()
            .find(|a| a.controller == controller && a.pin == pin)
            .unwrap_or_else(|| panic!("{controller}:{pin} should be claimed"));
        assert_eq!(assignment.owner, casefan.id);
    }
}

#[test]
fn sample_render_tree_shows_the_assembly() {
    let loaded = load_str(SAMPLE).unwrap();
    let tree = loaded.topology.render_tree();
    assert!(tree.contains("mcu alpha (primary)"));
    assert!(tree.contains("toolhead left"));
    assert!(tree.contains("rail rz"));
    assert!(tree.contains("tool box"));
    assert!(!tree.contains("spares"));
}

#[test]
fn reload_is_deterministic() {
    let a = load_str(SAMPLE).unwrap();
    let b = load_str(SAMPLE).unwrap();
    assert_eq!(a.topology, b.topology);

    let ja = serde_json::to_string(&a.topology).unwrap();
    let jb = serde_json::to_string(&b.topology).unwrap();
    assert_eq!(ja, jb);
}

#[test]
fn printer_scalar_attrs_are_kept() {
    let loaded = load_str(SAMPLE).unwrap();
    match loaded.topology.printer_attr("name") {
        Some(gantry_topology::AttrValue::Str(v)) => assert_eq!(v, "dual-gantry-test"),
        other => panic!("unexpected value: {other:?}"),
    }
}

#[test]
fn pid_tool_missing_one_parameter_fails_naming_it() {
    let src = with_scaffold(
        "[sensor t]\ntype: thermometer\npin: m:PK0\n\
         [tool x]\ntype: tcontrol\ncontrol: pid\nmin_temp: 0\nmax_temp: 250\n\
         sensor: t\npid_kp: 22.2\npid_ki: 1.08\n",
    );
    let diags = diagnostics(&src);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DefectKind::MissingRequiredAttribute);
    assert_eq!(diags[0].attribute.as_deref(), Some("pid_kd"));
}

#[test]
fn pid_tool_missing_all_parameters_reports_one_diagnostic_each() {
    let src = with_scaffold(
        "[sensor t]\ntype: thermometer\npin: m:PK0\n\
         [tool x]\ntype: tcontrol\ncontrol: pid\nmin_temp: 0\nmax_temp: 250\nsensor: t\n",
    );
    let diags = diagnostics(&src);
    let params: Vec<_> = diags
        .iter()
        .map(|d| d.attribute.as_deref().unwrap())
        .collect();
    assert_eq!(params, vec!["pid_kp", "pid_ki", "pid_kd"]);
    assert!(
        diags
            .iter()
            .all(|d| d.kind == DefectKind::MissingRequiredAttribute)
    );
}

#[test]
fn pid_tool_with_all_parameters_loads() {
    let src = with_scaffold(
        "[sensor t]\ntype: thermometer\npin: m:PK0\n\
         [heater h]\npin: m:PH0\n\
         [tool x]\ntype: tcontrol\ncontrol: pid\nmin_temp: 0\nmax_temp: 250\n\
         sensor: t\nheater: h\npid_kp: 22.2\npid_ki: 1.08\npid_kd: 114.0\n",
    );
    let loaded = load_str(&src).expect("complete pid tool must load");
    assert!(loaded.topology.get("tool", "x").is_some());
}

#[test]
fn sensing_only_tcontrol_is_valid() {
    // an enclosure group with neither heater nor cooler
    let src = with_scaffold(
        "[sensor t]\ntype: thermometer\npin: m:PK0\n\
         [tool watch]\ntype: tcontrol\ncontrol: watermark\nmin_temp: 0\nmax_temp: 60\nsensor: t\n",
    );
    assert!(load_str(&src).is_ok());
}

#[test]
fn inverted_temperature_window_is_rejected() {
    let src = with_scaffold(
        "[sensor t]\ntype: thermometer\npin: m:PK0\n\
         [tool x]\ntype: tcontrol\ncontrol: watermark\nmin_temp: 90\nmax_temp: 60\nsensor: t\n",
    );
    let diags = diagnostics(&src);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DefectKind::BoundOrderingViolation);
}

#[test]
fn double_pin_claim_names_both_claimants() {
    let src = with_scaffold("[heater h1]\npin: m:PH0\n[heater h2]\npin: m:PH0\n");
    let diags = diagnostics(&src);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DefectKind::PinConflict);
    assert!(diags[0].message.contains("heater h1"));
    assert!(diags[0].message.contains("heater h2"));
}

#[test]
fn unknown_controller_in_pin_is_rejected() {
    let src = with_scaffold("[heater h]\npin: ghost:PH0\n");
    let diags = diagnostics(&src);
    assert_eq!(diags[0].kind, DefectKind::UnknownController);
    assert!(diags[0].message.contains("ghost"));
}

#[test]
fn forward_reference_is_rejected() {
    let src = with_scaffold(
        "[rail r]\nstepper: s\nposition_min: 0\nposition_max: 10\n\
         [stepper s]\npin_step: m:P1\npin_dir: m:P2\n",
    );
    let diags = diagnostics(&src);
    assert_eq!(diags[0].kind, DefectKind::ForwardReferenceNotAllowed);
    assert!(diags[0].message.contains("stepper s"));
}

#[test]
fn undeclared_reference_is_rejected() {
    let src = with_scaffold("[rail r]\nstepper: ghost\nposition_min: 0\nposition_max: 10\n");
    let diags = diagnostics(&src);
    assert_eq!(diags[0].kind, DefectKind::UndeclaredReference);
    assert!(diags[0].message.contains("stepper ghost"));
}

#[test]
fn rail_bound_violations_accumulate() {
    // every defect in one report: inverted travel and a stray endstop
    let src = with_scaffold(
        "[stepper s]\npin_step: m:P1\npin_dir: m:P2\n\
         [rail r]\nstepper: s\nposition_min: 100\nposition_max: 0\nposition_endstop_min: 150\n",
    );
    let diags = diagnostics(&src);
    assert!(diags.len() >= 2);
    assert!(
        diags
            .iter()
            .all(|d| d.kind == DefectKind::BoundOrderingViolation)
    );
}

#[test]
fn dual_cart_axis_needs_a_multi_capable_role() {
    let rails = "\
[stepper s1]
pin_step: m:P1
pin_dir: m:P2

[stepper s2]
pin_step: m:P3
pin_dir: m:P4

[stepper s3]
pin_step: m:P5
pin_dir: m:P6

[stepper s4]
pin_step: m:P7
pin_dir: m:P8

[rail a]
stepper: s1
position_min: 0
position_max: 100

[rail b]
stepper: s2
position_min: 0
position_max: 100

[rail c]
stepper: s3
position_min: 0
position_max: 100

[rail d]
stepper: s4
position_min: 0
position_max: 100
";

    // x is multi-capable: two carts on x load fine
    let ok = with_scaffold(&format!(
        "{rails}[toolhead t]\nkinematics: cartesian\nmax_velocity: 100\nmax_accel: 1000\n\
         x: a,b\ny: c\nz: d\n"
    ));
    let loaded = load_str(&ok).expect("dual-cart x must be accepted");
    let th = loaded.topology.get("toolhead", "t").unwrap().clone();
    assert!(loaded.topology.is_dual_cart_axis(&th, "x"));
    assert!(!loaded.topology.is_dual_cart_axis(&th, "y"));

    // z is single: the same arity there is a role violation
    let bad = with_scaffold(&format!(
        "{rails}[toolhead t]\nkinematics: cartesian\nmax_velocity: 100\nmax_accel: 1000\n\
         x: a\ny: b\nz: c,d\n"
    ));
    let diags = diagnostics(&bad);
    assert_eq!(diags[0].kind, DefectKind::KinematicsRoleUnsatisfied);
    assert!(diags[0].message.contains("single rail"));
}

#[test]
fn missing_mandatory_axis_role_is_reported() {
    let src = with_scaffold(
        "[stepper s1]\npin_step: m:P1\npin_dir: m:P2\n\
         [stepper s2]\npin_step: m:P3\npin_dir: m:P4\n\
         [rail a]\nstepper: s1\nposition_min: 0\nposition_max: 100\n\
         [rail b]\nstepper: s2\nposition_min: 0\nposition_max: 100\n\
         [toolhead t]\nkinematics: cartesian\nmax_velocity: 100\nmax_accel: 1000\nx: a\nz: b\n",
    );
    let diags = diagnostics(&src);
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].kind, DefectKind::KinematicsRoleUnsatisfied);
    assert_eq!(diags[0].attribute.as_deref(), Some("y"));
}

#[test]
fn unknown_kind_is_an_error() {
    let src = with_scaffold("[frobnicator f]\nsetting: 1\n");
    let diags = diagnostics(&src);
    assert_eq!(diags[0].kind, DefectKind::UnknownKind);
}

#[test]
fn missing_printer_root_is_an_error() {
    let err = load_str("[mcu m]\nserial: /dev/x\n").unwrap_err();
    let diags = match err {
        LoadError::Invalid { diagnostics } => diagnostics,
        other => panic!("unexpected: {other}"),
    };
    assert_eq!(diags[0].kind, DefectKind::MalformedSection);
    assert!(diags[0].message.contains("printer"));
}

#[test]
fn unmounted_parts_become_spares_not_errors() {
    let src = with_scaffold("[heater idle]\npin: m:PH0\n");
    let loaded = load_str(&src).expect("an unmounted heater is not a defect");
    let spares: Vec<&str> = loaded.topology.spares().map(|p| p.name()).collect();
    assert_eq!(spares, vec!["idle"]);
}

#[test]
fn parse_errors_abort_before_validation() {
    let err = load_str("[mcu m]\nserial: /dev/x\n[mcu m]\n").unwrap_err();
    assert!(matches!(err, LoadError::Parse(_)));
}
