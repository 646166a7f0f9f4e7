//! Kinematics schemes and the axis roles they demand of a toolhead.

use serde::Serialize;

/// One axis slot a kinematics scheme declares.
///
/// A mandatory role must be covered by at least one rail. A multi-capable
/// role may be covered by several rails (a dual-cart axis); every other
/// role accepts exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRole {
    pub name: &'static str,
    pub mandatory: bool,
    pub multi: bool,
}

impl AxisRole {
    const fn new(name: &'static str, mandatory: bool, multi: bool) -> Self {
        Self {
            name,
            mandatory,
            multi,
        }
    }
}

const CARTESIAN_ROLES: &[AxisRole] = &[
    AxisRole::new("x", true, true),
    AxisRole::new("y", true, true),
    AxisRole::new("z", true, false),
];

// The inert scheme: accepts any single rail per axis, demands none.
const DUMMY_ROLES: &[AxisRole] = &[
    AxisRole::new("x", false, false),
    AxisRole::new("y", false, false),
    AxisRole::new("z", false, false),
];

/// Supported kinematics schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Kinematics {
    Cartesian,
    Dummy,
}

impl Kinematics {
    pub const VALUES: &'static [&'static str] = &["cartesian", "dummy"];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cartesian" => Some(Kinematics::Cartesian),
            "dummy" => Some(Kinematics::Dummy),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Kinematics::Cartesian => "cartesian",
            Kinematics::Dummy => "dummy",
        }
    }

    /// Axis roles this scheme declares, in reporting order.
    pub fn roles(self) -> &'static [AxisRole] {
        match self {
            Kinematics::Cartesian => CARTESIAN_ROLES,
            Kinematics::Dummy => DUMMY_ROLES,
        }
    }

    pub fn role(self, name: &str) -> Option<&'static AxisRole> {
        self.roles().iter().find(|r| r.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cartesian_declares_xyz() {
        let roles = Kinematics::Cartesian.roles();
        assert_eq!(roles.len(), 3);
        assert!(roles.iter().all(|r| r.mandatory));
        // dual-cart is allowed on x and y only
        assert!(Kinematics::Cartesian.role("x").unwrap().multi);
        assert!(Kinematics::Cartesian.role("y").unwrap().multi);
        assert!(!Kinematics::Cartesian.role("z").unwrap().multi);
    }

    #[test]
    fn dummy_demands_nothing() {
        assert!(Kinematics::Dummy.roles().iter().all(|r| !r.mandatory));
    }
}
