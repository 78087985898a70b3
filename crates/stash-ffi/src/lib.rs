//! Stash FFI - C ABI gateway for the stash native library
//!
//! This crate exposes the stash boundary to managed hosts (Python via
//! ctypes, Java via JNA, Go via cgo, ...). Every exported operation takes
//! borrowed `Data` records and returns one `Result` record.
//!
//! # Safety
//!
//! The boundary relies on a few caller obligations that cannot be checked
//! at runtime:
//! - A `Data` pointer is either null with length 0, or points to `len`
//!   readable bytes that stay valid until the call returns
//! - A `Result` is released exactly once, with `stash_free_result` (or
//!   `stash_free_buffer` / `stash_free_string`), never with the host's `free`
//! - When `Result.err` is non-null, `ptr`, `len` and `handle` are ignored
//! - Every non-zero handle is passed to `stash_release` exactly once
//!
//! Double release of a handle is detected and reported as `not found`.
//!
//! # Asynchronous operations
//!
//! The boundary is synchronous. An operation whose native logic is async
//! drives it with [`gateway::block_on`] inside its dispatch closure, so the
//! host still gets exactly one `Result` and runtime failures come back as
//! errors rather than panics:
//!
//! ```
//! use stash::gateway;
//! use stash_core::Reply;
//!
//! let result = gateway::dispatch("fetch", || {
//!     let bytes = gateway::block_on(async { b"fetched".to_vec() })?;
//!     Ok(Reply::bytes(bytes))
//! });
//!
//! unsafe {
//!     assert_eq!(result.payload().unwrap(), b"fetched");
//!     stash::stash_free_result(result);
//! }
//! ```

#![warn(missing_docs)]

#[macro_use]
mod error;
mod api;
mod blob;
pub mod gateway;
mod logging;
mod memory;
mod types;

// Re-export public API
pub use api::*;
pub use memory::{stash_free_buffer, stash_free_result, stash_free_string};
pub use types::{StashData, StashResult};
