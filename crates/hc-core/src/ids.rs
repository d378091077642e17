use core::fmt;
use core::num::NonZeroU32;

use crate::error::CoreError;

/// Compact, stable handle into one of the compiler's entity arenas.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based index by storing index+1.
    ///
    /// Fails only for `u32::MAX`, which no arena reaches in practice.
    pub fn try_from_index(index: usize) -> Result<Self, CoreError> {
        u32::try_from(index)
            .ok()
            .and_then(|i| i.checked_add(1))
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(CoreError::IndexOverflow { index })
    }

    /// Create an Id from a 0-based index; panics past `u32::MAX - 1` entries.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::new(index + 1).expect("index+1 is nonzero"))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Id {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(self.index() as u64)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Id {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let index = <u64 as serde::Deserialize>::deserialize(deserializer)?;
        let index = usize::try_from(index).map_err(serde::de::Error::custom)?;
        Id::try_from_index(index).map_err(serde::de::Error::custom)
    }
}

/// Domain-specific ID aliases for clarity (no runtime cost).
pub type ComponentId = Id;
pub type SystemId = Id;
pub type LoopId = Id;
pub type ScheduleId = Id;
pub type ConstructionSetId = Id;
pub type SpaceTypeId = Id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_round_trip_index() {
        for i in [0_u32, 1, 2, 42, 10_000] {
            let id = Id::from_index(i);
            assert_eq!(id.index(), i as usize);
        }
    }

    #[test]
    fn try_from_index_rejects_overflow() {
        assert!(Id::try_from_index(u32::MAX as usize).is_err());
        assert_eq!(Id::try_from_index(7).unwrap().index(), 7);
    }

    #[test]
    fn option_id_is_small() {
        assert_eq!(
            core::mem::size_of::<Id>(),
            core::mem::size_of::<Option<Id>>()
        );
    }
}
