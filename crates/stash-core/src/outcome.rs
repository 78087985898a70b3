//! Rust-side shape of a call result
//!
//! A native operation returns [`Outcome`]: either a [`Reply`] carrying an
//! owned payload and an optional handle, or an [`Error`]. Because these are
//! the two arms of a `Result`, a payload and an error can never both be
//! meaningful for the same call.

use serde::Serialize;

use crate::buffer::OwnedBuffer;
use crate::error::{Error, Result};
use crate::handle::Handle;

/// What a native operation produces on success
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Payload whose ownership passes to the caller
    pub payload: OwnedBuffer,
    /// Handle to a newly registered resource, or [`Handle::NONE`]
    pub handle: Handle,
}

/// Result of one native operation
pub type Outcome = std::result::Result<Reply, Error>;

impl Reply {
    /// No payload, no handle
    pub fn empty() -> Self {
        Self {
            payload: OwnedBuffer::empty(),
            handle: Handle::NONE,
        }
    }

    /// Raw bytes payload
    pub fn bytes(payload: impl Into<OwnedBuffer>) -> Self {
        Self {
            payload: payload.into(),
            handle: Handle::NONE,
        }
    }

    /// JSON-encoded payload
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Self::bytes(OwnedBuffer::json(value)?))
    }

    /// A freshly registered handle with no payload
    pub fn handle(handle: Handle) -> Self {
        Self {
            payload: OwnedBuffer::empty(),
            handle,
        }
    }

    /// Attach a handle to this reply
    pub fn with_handle(mut self, handle: Handle) -> Self {
        self.handle = handle;
        self
    }
}
