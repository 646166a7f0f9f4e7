//! Pin expression grammar.
//!
//! `<controller>:<modifiers><pin>` where modifiers are `^` (pull-up),
//! `~` (pull-down), `!` (invert); or `virtual:<aggregator>` to address a
//! fan-out node. Whether pull/invert are accepted depends on the attribute
//! slot (an endstop input may pull up, a serial pin may not).

use serde::Serialize;

use crate::{PinError, PinResult};

/// Which pin modifiers an attribute slot accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinCaps {
    pub can_invert: bool,
    pub can_pullup: bool,
}

impl PinCaps {
    pub const NONE: PinCaps = PinCaps {
        can_invert: false,
        can_pullup: false,
    };
    pub const INVERT: PinCaps = PinCaps {
        can_invert: true,
        can_pullup: false,
    };
    pub const INVERT_PULLUP: PinCaps = PinCaps {
        can_invert: true,
        can_pullup: true,
    };
}

/// Pull-resistor marker on an input pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub enum Pull {
    #[default]
    None,
    Up,
    Down,
}

/// A parsed pin expression, before claim resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum PinExpr {
    /// One physical pin on a named controller.
    Physical {
        controller: String,
        pin: String,
        pull: Pull,
        invert: bool,
    },
    /// A virtual aggregator identity; operations fan out to its targets.
    Virtual {
        aggregator: String,
        pull: Pull,
        invert: bool,
    },
}

impl PinExpr {
    /// Parse a pin expression, honoring the slot's modifier capabilities.
    pub fn parse(desc: &str, caps: PinCaps) -> PinResult<Self> {
        let mut rest = desc.trim();
        let mut pull = Pull::None;
        let mut invert = false;

        let Some((controller, mut pin_part)) = rest.split_once(':') else {
            return Err(PinError::InvalidExpr {
                desc: desc.to_string(),
                reason: format!("expected '<controller>:{}<pin>'", format_hint(caps)),
            });
        };
        let controller = controller.trim();
        pin_part = pin_part.trim();
        rest = pin_part;

        if caps.can_pullup {
            if let Some(stripped) = rest.strip_prefix('^') {
                pull = Pull::Up;
                rest = stripped.trim_start();
            } else if let Some(stripped) = rest.strip_prefix('~') {
                pull = Pull::Down;
                rest = stripped.trim_start();
            }
        }
        if caps.can_invert {
            if let Some(stripped) = rest.strip_prefix('!') {
                invert = true;
                rest = stripped.trim_start();
            }
        }

        if controller.is_empty() || rest.is_empty() {
            return Err(PinError::InvalidExpr {
                desc: desc.to_string(),
                reason: "controller and pin id must both be non-empty".to_string(),
            });
        }
        for part in [controller, rest] {
            if part.chars().any(|c| "^~!: ".contains(c)) {
                return Err(PinError::InvalidExpr {
                    desc: desc.to_string(),
                    reason: format!("expected '<controller>:{}<pin>'", format_hint(caps)),
                });
            }
        }

        if controller == "virtual" {
            Ok(PinExpr::Virtual {
                aggregator: rest.to_string(),
                pull,
                invert,
            })
        } else {
            Ok(PinExpr::Physical {
                controller: controller.to_string(),
                pin: rest.to_string(),
                pull,
                invert,
            })
        }
    }

    /// Parse a bare `controller:pin` target (no modifiers, no virtuals),
    /// as used in a virtual aggregator's target list.
    pub fn parse_target(desc: &str) -> PinResult<(String, String)> {
        match Self::parse(desc, PinCaps::NONE)? {
            PinExpr::Physical {
                controller, pin, ..
            } => Ok((controller, pin)),
            PinExpr::Virtual { .. } => Err(PinError::InvalidExpr {
                desc: desc.to_string(),
                reason: "aggregator targets must be physical pins".to_string(),
            }),
        }
    }

    pub fn pull(&self) -> Pull {
        match self {
            PinExpr::Physical { pull, .. } | PinExpr::Virtual { pull, .. } => *pull,
        }
    }

    pub fn invert(&self) -> bool {
        match self {
            PinExpr::Physical { invert, .. } | PinExpr::Virtual { invert, .. } => *invert,
        }
    }
}

fn format_hint(caps: PinCaps) -> String {
    let mut hint = String::new();
    if caps.can_pullup {
        hint.push_str("[^~]");
    }
    if caps.can_invert {
        hint.push_str("[!]");
    }
    hint
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_physical_pin() {
        let expr = PinExpr::parse("alpha:PA4", PinCaps::NONE).unwrap();
        assert_eq!(
            expr,
            PinExpr::Physical {
                controller: "alpha".into(),
                pin: "PA4".into(),
                pull: Pull::None,
                invert: false,
            }
        );
    }

    #[test]
    fn parses_modifiers_in_order() {
        let expr = PinExpr::parse("alpha:^!PA4", PinCaps::INVERT_PULLUP).unwrap();
        assert_eq!(expr.pull(), Pull::Up);
        assert!(expr.invert());

        let expr = PinExpr::parse("alpha:~PB0", PinCaps::INVERT_PULLUP).unwrap();
        assert_eq!(expr.pull(), Pull::Down);
        assert!(!expr.invert());
    }

    #[test]
    fn rejects_modifier_on_incapable_slot() {
        let err = PinExpr::parse("alpha:!PA4", PinCaps::NONE).unwrap_err();
        assert!(matches!(err, PinError::InvalidExpr { .. }));

        let err = PinExpr::parse("alpha:^PA4", PinCaps::INVERT).unwrap_err();
        assert!(matches!(err, PinError::InvalidExpr { .. }));
    }

    #[test]
    fn rejects_missing_controller() {
        assert!(PinExpr::parse("PA4", PinCaps::NONE).is_err());
        assert!(PinExpr::parse(":PA4", PinCaps::NONE).is_err());
        assert!(PinExpr::parse("alpha:", PinCaps::NONE).is_err());
    }

    #[test]
    fn virtual_prefix_selects_aggregator() {
        let expr = PinExpr::parse("virtual:fans", PinCaps::NONE).unwrap();
        assert_eq!(
            expr,
            PinExpr::Virtual {
                aggregator: "fans".into(),
                pull: Pull::None,
                invert: false,
            }
        );
    }

    #[test]
    fn target_rejects_virtual_and_modifiers() {
        assert_eq!(
            PinExpr::parse_target("beta:PC7").unwrap(),
            ("beta".into(), "PC7".into())
        );
        assert!(PinExpr::parse_target("virtual:fans").is_err());
        assert!(PinExpr::parse_target("beta:!PC7").is_err());
    }
}
