//! FFI-safe type definitions
//!
//! All types in this module are designed to be safely passed across
//! the FFI boundary with C ABI compatibility. In the generated header
//! `StashData` is named `Data` and `StashResult` is named `Result`.

use std::ffi::CStr;
use std::os::raw::c_char;
use std::ptr;

use stash_core::{BufferView, Handle, Outcome};

use crate::memory::{allocate_error, into_raw_buffer};

/// Borrowed input buffer supplied by the caller for one call.
///
/// The library never frees or retains it.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct StashData {
    /// Start of the caller's bytes; may be null only when `len` is 0
    pub ptr: *const u8,
    /// Length in bytes
    pub len: usize,
}

/// Outcome of one native call.
///
/// If `err` is non-null the call failed and `ptr`, `len` and `handle` must
/// not be interpreted. Release `ptr` and `err` with `stash_free_result`.
#[repr(C)]
#[derive(Debug)]
pub struct StashResult {
    /// Payload owned by the caller once returned; null when empty
    pub ptr: *mut u8,
    /// Payload length in bytes
    pub len: usize,
    /// Handle to a newly registered resource, 0 for none
    pub handle: u64,
    /// NUL-terminated error message, null on success
    pub err: *mut c_char,
}

impl StashData {
    /// Zero-length input
    pub const fn empty() -> Self {
        Self {
            ptr: ptr::null(),
            len: 0,
        }
    }

    /// Borrow a Rust slice as call input
    pub fn from_slice(bytes: &[u8]) -> Self {
        Self {
            ptr: bytes.as_ptr(),
            len: bytes.len(),
        }
    }

    /// Validate the pointer/length pair and view it as a slice
    ///
    /// # Safety
    /// `ptr` must be null or point to `len` readable bytes that stay valid
    /// for `'a`, which must not outlive the current call.
    pub unsafe fn view<'a>(self, name: &'static str) -> stash_core::Result<BufferView<'a>> {
        BufferView::from_raw_parts(name, self.ptr, self.len)
    }
}

impl StashResult {
    /// Package an operation outcome for the caller.
    ///
    /// An error never carries a payload or a handle.
    pub fn from_outcome(outcome: Outcome) -> Self {
        match outcome {
            Ok(reply) => {
                let (ptr, len) = into_raw_buffer(reply.payload);
                Self {
                    ptr,
                    len,
                    handle: reply.handle.into_raw(),
                    err: ptr::null_mut(),
                }
            }
            Err(err) => Self {
                ptr: ptr::null_mut(),
                len: 0,
                handle: 0,
                err: allocate_error(&err.to_string()),
            },
        }
    }

    /// Whether the call failed
    pub fn is_error(&self) -> bool {
        !self.err.is_null()
    }

    /// Error text, if the call failed
    ///
    /// # Safety
    /// The result must not have been freed.
    pub unsafe fn error_message(&self) -> Option<String> {
        if self.err.is_null() {
            return None;
        }
        Some(CStr::from_ptr(self.err).to_string_lossy().into_owned())
    }

    /// Payload bytes, only when the call succeeded
    ///
    /// # Safety
    /// The result must not have been freed.
    pub unsafe fn payload(&self) -> Option<&[u8]> {
        if self.is_error() {
            return None;
        }
        if self.ptr.is_null() {
            return Some(&[]);
        }
        Some(std::slice::from_raw_parts(self.ptr, self.len))
    }

    /// Returned handle, only when the call succeeded and produced one
    pub fn handle(&self) -> Option<Handle> {
        if self.is_error() || self.handle == 0 {
            return None;
        }
        Some(Handle::from_raw(self.handle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::stash_free_result;
    use stash_core::{Error, Reply};

    #[test]
    fn test_error_clears_payload_and_handle() {
        let result = StashResult::from_outcome(Err(Error::NotFound {
            handle: Handle::from_raw(12),
        }));

        assert!(result.is_error());
        assert!(result.ptr.is_null());
        assert_eq!(result.len, 0);
        assert_eq!(result.handle, 0);
        assert!(result.handle().is_none());
        unsafe {
            assert_eq!(result.error_message().unwrap(), "not found: handle 12");
            assert!(result.payload().is_none());
            stash_free_result(result);
        }
    }

    #[test]
    fn test_success_fields() {
        let reply = Reply::bytes("payload").with_handle(Handle::from_raw(4));
        let result = StashResult::from_outcome(Ok(reply));

        assert!(!result.is_error());
        assert_eq!(result.len, 7);
        assert_eq!(result.handle(), Some(Handle::from_raw(4)));
        unsafe {
            assert_eq!(result.payload().unwrap(), b"payload");
            assert!(result.error_message().is_none());
            stash_free_result(result);
        }
    }

    #[test]
    fn test_empty_payload_is_null() {
        let result = StashResult::from_outcome(Ok(Reply::empty()));
        assert!(result.ptr.is_null());
        assert_eq!(result.len, 0);
        unsafe {
            assert_eq!(result.payload().unwrap(), b"");
            stash_free_result(result);
        }
    }

    #[test]
    fn test_data_views() {
        let bytes = b"abc";
        let view = unsafe { StashData::from_slice(bytes).view("input") }.unwrap();
        assert_eq!(view.as_bytes(), b"abc");

        let empty = unsafe { StashData::empty().view("input") }.unwrap();
        assert!(empty.is_empty());

        let dangling = StashData {
            ptr: ptr::null(),
            len: 3,
        };
        assert!(unsafe { dangling.view("input") }.is_err());
    }
}
