//! Opaque 64-bit handles

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque reference to a resource living in the [`HandleTable`](crate::HandleTable).
///
/// Zero is reserved and means "no handle".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(u64);

impl Handle {
    /// The reserved "no handle" value
    pub const NONE: Handle = Handle(0);

    /// Wrap a raw value received from the host
    pub const fn from_raw(raw: u64) -> Self {
        Handle(raw)
    }

    /// Raw value to hand back to the host
    pub const fn into_raw(self) -> u64 {
        self.0
    }

    /// Whether this is the reserved zero handle
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Handle {
    fn default() -> Self {
        Handle::NONE
    }
}

impl From<Handle> for u64 {
    fn from(handle: Handle) -> Self {
        handle.into_raw()
    }
}
