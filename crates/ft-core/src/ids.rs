//! Typed indices for AGVs and base stations.
//!
//! The inner integer is the record's position in the world's `Vec`, valid
//! for one world generation only.  Human-facing labels such as `AGV-1001`
//! or `gNodeB-1` live on the records themselves; absence is `Option<Id>`,
//! never a sentinel value.

use std::fmt;

macro_rules! typed_index {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty), $tag:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($tag, "#{}"), self.0)
            }
        }
    };
}

typed_index! {
    /// Index of an AGV in the world's vehicle list.
    pub struct AgvId(u32), "agv";
}

typed_index! {
    /// Index of a base station (gNodeB) in the world's station list.
    pub struct StationId(u32), "station";
}
