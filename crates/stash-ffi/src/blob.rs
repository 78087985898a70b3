//! In-memory byte blob, the resource behind `stash_blob_*`

use stash_core::{BufferView, OwnedBuffer, Resource};

/// Immutable copy of bytes supplied by the host
#[derive(Debug)]
pub struct Blob {
    bytes: Box<[u8]>,
}

impl Blob {
    /// Copy the viewed bytes so the blob outlives the call
    pub fn copy_from(view: BufferView<'_>) -> Self {
        Self {
            bytes: view.as_bytes().into(),
        }
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the blob holds no bytes
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Fresh owned copy for the caller
    pub fn to_owned_buffer(&self) -> OwnedBuffer {
        OwnedBuffer::from(self.bytes.to_vec())
    }
}

impl Resource for Blob {
    fn kind(&self) -> &'static str {
        "blob"
    }
}
