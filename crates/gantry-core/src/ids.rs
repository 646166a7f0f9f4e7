use core::fmt;
use core::num::NonZeroU32;

use serde::{Serialize, Serializer};

/// Compact, stable identifier for a part instance in a loaded topology.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<PartId>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(NonZeroU32);

impl PartId {
    /// Create a PartId from a 0-based arena index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        // index+1 must be nonzero
        Self(NonZeroU32::new(index + 1).expect("index+1 is nonzero"))
    }

    /// Recover the 0-based arena index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl Serialize for PartId {
    // Dumps carry the 0-based arena index, not the NonZero representation.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.index())
    }
}

impl fmt::Debug for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartId({})", self.index())
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let id = PartId::from_index(i);
            assert_eq!(id.index(), i);
        }
    }

    #[test]
    fn option_id_is_small() {
        // This is a classic reason for NonZero: Option<PartId> can be same size as PartId.
        assert_eq!(
            core::mem::size_of::<PartId>(),
            core::mem::size_of::<Option<PartId>>()
        );
    }
}
