//! Borrowed and owned byte buffers
//!
//! [`BufferView`] is what the caller lends for the duration of one call; its
//! lifetime parameter keeps it from escaping the call. [`OwnedBuffer`] is
//! what a native operation hands back; the FFI layer converts it into a raw
//! pointer/length pair whose only legal release path is the library's own
//! free function.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// Non-owning, call-scoped view of caller memory
#[derive(Clone, Copy)]
pub struct BufferView<'a> {
    bytes: &'a [u8],
    name: &'static str,
}

impl<'a> BufferView<'a> {
    /// View over a Rust slice
    pub fn new(name: &'static str, bytes: &'a [u8]) -> Self {
        Self { bytes, name }
    }

    /// Build a view from a raw pointer/length pair received from the host.
    ///
    /// A null pointer is accepted only together with a zero length and
    /// yields an empty view. A non-null pointer with zero length is also
    /// empty and is never dereferenced.
    ///
    /// # Safety
    /// If `ptr` is non-null it must point to `len` readable bytes that stay
    /// valid and unmodified for `'a`. This cannot be verified here.
    pub unsafe fn from_raw_parts(name: &'static str, ptr: *const u8, len: usize) -> Result<Self> {
        if len == 0 {
            return Ok(Self::new(name, &[]));
        }
        if ptr.is_null() {
            return Err(Error::invalid_input(
                name,
                format!("null pointer with length {}", len),
            ));
        }
        if len > isize::MAX as usize {
            return Err(Error::invalid_input(name, format!("length {} is too large", len)));
        }
        // SAFETY: non-null, caller guarantees `len` readable bytes for 'a
        let bytes = unsafe { std::slice::from_raw_parts(ptr, len) };
        Ok(Self::new(name, bytes))
    }

    /// Argument name used in error messages
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The borrowed bytes
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the view is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Fail with `InvalidInput` if the view is empty
    pub fn require_non_empty(&self) -> Result<&'a [u8]> {
        if self.is_empty() {
            return Err(Error::invalid_input(self.name, "must not be empty"));
        }
        Ok(self.bytes)
    }

    /// Fail with `InvalidInput` if the view is longer than `max`
    pub fn require_at_most(&self, max: usize) -> Result<&'a [u8]> {
        if self.len() > max {
            return Err(Error::invalid_input(
                self.name,
                format!("{} bytes exceeds the limit of {}", self.len(), max),
            ));
        }
        Ok(self.bytes)
    }

    /// Interpret the bytes as UTF-8
    pub fn to_str(&self) -> Result<&'a str> {
        std::str::from_utf8(self.bytes)
            .map_err(|e| Error::invalid_input(self.name, format!("invalid UTF-8: {}", e)))
    }

    /// Parse the bytes as a JSON document
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(self.bytes)
            .map_err(|e| Error::invalid_input(self.name, format!("invalid JSON: {}", e)))
    }

    /// Copy the viewed bytes into a buffer the native side owns
    pub fn to_owned_buffer(&self) -> OwnedBuffer {
        OwnedBuffer::from(self.bytes.to_vec())
    }
}

impl fmt::Debug for BufferView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BufferView")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Bytes allocated by the native side, to be handed to the caller
#[derive(Clone, Default, PartialEq, Eq)]
pub struct OwnedBuffer {
    bytes: Box<[u8]>,
}

impl OwnedBuffer {
    /// Empty buffer; crosses the boundary as a null pointer with length 0
    pub fn empty() -> Self {
        Self::default()
    }

    /// Serialise `value` as JSON
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_vec(value)
            .map(Self::from)
            .map_err(|e| Error::internal(format!("failed to serialize result: {}", e)))
    }

    /// Length in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The owned bytes
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Give up the allocation; its length equals its capacity
    pub fn into_boxed_slice(self) -> Box<[u8]> {
        self.bytes
    }
}

impl From<Vec<u8>> for OwnedBuffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self {
            bytes: bytes.into_boxed_slice(),
        }
    }
}

impl From<String> for OwnedBuffer {
    fn from(s: String) -> Self {
        Self::from(s.into_bytes())
    }
}

impl From<&str> for OwnedBuffer {
    fn from(s: &str) -> Self {
        Self::from(s.as_bytes().to_vec())
    }
}

impl fmt::Debug for OwnedBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OwnedBuffer")
            .field("len", &self.bytes.len())
            .finish()
    }
}
