//! Error handling for FFI boundary
//!
//! This module provides utilities for safely propagating errors
//! across the FFI boundary without panics or undefined behavior.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use stash_core::{Error, Outcome};

/// Safely execute an operation that might panic
///
/// A panic is converted into an `Internal` error carrying the panic
/// message. Shared state touched by operations (the handle table) tolerates
/// lock poisoning, so resuming after a caught panic is sound.
pub fn catch_panic<F>(operation: &str, f: F) -> Outcome
where
    F: FnOnce() -> Outcome,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(outcome) => outcome,
        Err(panic_info) => {
            let msg = get_panic_message(&panic_info);
            tracing::error!(operation, "panic caught at boundary: {}", msg);
            Err(Error::internal(format!("panic in {}: {}", operation, msg)))
        }
    }
}

/// Extract a message from panic info
fn get_panic_message(panic_info: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "Unknown panic".to_string()
    }
}

/// Macro for running an exported function body through the gateway
#[macro_export]
macro_rules! ffi_boundary {
    ($operation:expr, $body:expr) => {{
        $crate::gateway::dispatch($operation, || $body)
    }};
}
