//! Memory management utilities for FFI
//!
//! Payloads and error strings handed to the caller are allocated here with
//! the Rust global allocator. The free functions in this module are the only
//! legal way to release them; passing them to the host's `free` is undefined
//! behaviour.

use std::ffi::CString;
use std::os::raw::c_char;
use std::ptr;

use stash_core::OwnedBuffer;

use crate::types::StashResult;

/// Turn an owned buffer into a pointer/length pair for the caller.
///
/// Empty buffers become a null pointer. The allocation's capacity equals
/// its length, so `stash_free_buffer` can rebuild it from `(ptr, len)`.
pub fn into_raw_buffer(buffer: OwnedBuffer) -> (*mut u8, usize) {
    if buffer.is_empty() {
        return (ptr::null_mut(), 0);
    }
    let bytes = buffer.into_boxed_slice();
    let len = bytes.len();
    (Box::into_raw(bytes) as *mut u8, len)
}

/// Allocate a NUL-terminated error message for the caller.
///
/// Interior NUL bytes are replaced so the message is never lost.
pub fn allocate_error(message: &str) -> *mut c_char {
    let message = if message.contains('\0') {
        message.replace('\0', "\u{FFFD}")
    } else {
        message.to_string()
    };
    CString::new(message).unwrap_or_default().into_raw()
}

/// Free a payload buffer returned in a `Result`
///
/// # Safety
/// `ptr` and `len` must be exactly the `ptr` and `len` fields of a `Result`
/// returned by this library, and must not have been freed before.
#[no_mangle]
pub unsafe extern "C" fn stash_free_buffer(ptr: *mut u8, len: usize) {
    if ptr.is_null() {
        return;
    }

    // Rebuild the boxed slice and let it drop
    let _ = Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len));
}

/// Free an error string returned in a `Result`
///
/// # Safety
/// The pointer must be the `err` field of a `Result` returned by this
/// library, and must not have been freed before.
#[no_mangle]
pub unsafe extern "C" fn stash_free_string(s: *mut c_char) {
    if s.is_null() {
        return;
    }

    // Reconstruct the CString and let it drop
    let _ = CString::from_raw(s);
}

/// Free everything a `Result` owns: its payload and its error text.
///
/// Handles are not affected; release them with `stash_release`.
///
/// # Safety
/// The result must have been returned by this library and not freed before.
#[no_mangle]
pub unsafe extern "C" fn stash_free_result(result: StashResult) {
    stash_free_buffer(result.ptr, result.len);
    stash_free_string(result.err);
}
