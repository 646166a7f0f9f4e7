//! Per-load pin claim table.

use std::collections::{BTreeMap, BTreeSet};

use gantry_core::PartKey;

use crate::expr::PinExpr;
use crate::{PinError, PinResult};

/// Who holds a physical pin, and through which attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Claimant {
    pub part: PartKey,
    pub attribute: String,
}

/// Tracks controllers, virtual aggregators, and physical pin ownership for
/// the duration of one load.
///
/// Lookups are deterministic (BTree ordering) so repeated loads of the
/// same source report identical diagnostics in identical order.
#[derive(Debug, Default)]
pub struct PinClaims {
    controllers: BTreeSet<String>,
    virtuals: BTreeMap<String, Vec<(String, String)>>,
    claimed: BTreeMap<(String, String), Claimant>,
}

impl PinClaims {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce a physical controller. Duplicate names cannot occur: the
    /// parser rejects duplicate `(kind, name)` sections before this point.
    pub fn register_controller(&mut self, name: impl Into<String>) {
        self.controllers.insert(name.into());
    }

    pub fn has_controller(&self, name: &str) -> bool {
        self.controllers.contains(name)
    }

    /// Announce a virtual aggregator with its ordered physical targets.
    ///
    /// The target list must be non-empty and every target controller must
    /// already be registered (declaration order guarantees controllers
    /// precede the aggregators that span them).
    pub fn register_virtual(
        &mut self,
        name: impl Into<String>,
        targets: Vec<(String, String)>,
    ) -> PinResult<()> {
        let name = name.into();
        if targets.is_empty() {
            return Err(PinError::EmptyAggregator { name });
        }
        for (controller, _) in &targets {
            if !self.has_controller(controller) {
                return Err(PinError::UnknownController {
                    name: controller.clone(),
                });
            }
        }
        self.virtuals.insert(name, targets);
        Ok(())
    }

    pub fn has_virtual(&self, name: &str) -> bool {
        self.virtuals.contains_key(name)
    }

    /// Physical `(controller, pin)` pairs an expression addresses: one for
    /// a physical pin, every target for a virtual identity.
    pub fn resolve(&self, expr: &PinExpr) -> PinResult<Vec<(String, String)>> {
        match expr {
            PinExpr::Physical {
                controller, pin, ..
            } => {
                if !self.has_controller(controller) {
                    return Err(PinError::UnknownController {
                        name: controller.clone(),
                    });
                }
                Ok(vec![(controller.clone(), pin.clone())])
            }
            PinExpr::Virtual { aggregator, .. } => match self.virtuals.get(aggregator) {
                Some(targets) => Ok(targets.clone()),
                None => Err(PinError::UnknownAggregator {
                    name: aggregator.clone(),
                }),
            },
        }
    }

    /// Claim every physical pin an expression addresses for one part.
    ///
    /// The claim is all-or-nothing: a broadcast through a virtual identity
    /// either takes every target or none, so a conflict never leaves a
    /// half-claimed aggregator behind.
    pub fn claim(
        &mut self,
        expr: &PinExpr,
        part: &PartKey,
        attribute: &str,
    ) -> PinResult<Vec<(String, String)>> {
        let targets = self.resolve(expr)?;
        for key in &targets {
            if let Some(first) = self.claimed.get(key) {
                return Err(PinError::PinConflict {
                    controller: key.0.clone(),
                    pin: key.1.clone(),
                    first: first.part.clone(),
                    second: part.clone(),
                });
            }
        }
        for key in &targets {
            self.claimed.insert(
                key.clone(),
                Claimant {
                    part: part.clone(),
                    attribute: attribute.to_string(),
                },
            );
        }
        Ok(targets)
    }

    /// All claims so far, in `(controller, pin)` order.
    pub fn claimed(&self) -> impl Iterator<Item = (&(String, String), &Claimant)> {
        self.claimed.iter()
    }
}
