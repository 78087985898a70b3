//! Gateway dispatch
//!
//! Every exported operation runs inside [`dispatch`], which catches panics,
//! logs the outcome and packages it into a [`StashResult`]. Input buffers go
//! through [`view`] or [`payload_view`]; both apply the null-pointer rule,
//! and payload inputs are also held to the configured size limit.
//!
//! Operations that register a resource must do so as their last fallible
//! step, so a failing call never leaves a half-registered handle behind.

use std::future::Future;
use std::sync::{OnceLock, PoisonError, RwLock};

use stash_core::{BufferView, Config, Error, ErrorCode, Outcome, Result};
use tracing::{debug, trace, warn};

use crate::error::catch_panic;
use crate::logging;
use crate::types::{StashData, StashResult};

static CONFIG: OnceLock<RwLock<Config>> = OnceLock::new();

fn config_cell() -> &'static RwLock<Config> {
    CONFIG.get_or_init(|| RwLock::new(Config::from_env()))
}

/// Snapshot of the active configuration
pub fn current_config() -> Config {
    config_cell()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .clone()
}

/// Replace the active configuration
pub fn apply_config(config: Config) {
    *config_cell().write().unwrap_or_else(PoisonError::into_inner) = config;
}

/// Run one native operation and convert its outcome for the caller
pub fn dispatch<F>(operation: &'static str, f: F) -> StashResult
where
    F: FnOnce() -> Outcome,
{
    logging::init(&current_config());
    let span = tracing::debug_span!("call", operation);
    let _enter = span.enter();

    let outcome = catch_panic(operation, f);
    match &outcome {
        Ok(reply) => trace!(
            payload_len = reply.payload.len(),
            handle = %reply.handle,
            "call succeeded"
        ),
        Err(err) => match err.code() {
            ErrorCode::Internal => warn!("call failed: {}", err),
            _ => debug!("call failed: {}", err),
        },
    }

    StashResult::from_outcome(outcome)
}

/// Borrow a control input (log level, configuration) for the rest of the call.
///
/// Control inputs are not subject to `max_buffer_len`, so a host can always
/// reconfigure the limit it set.
///
/// # Safety
/// Same contract as [`StashData::view`]: the bytes must stay valid and
/// unmodified until the current call returns.
pub unsafe fn view<'a>(name: &'static str, data: StashData) -> Result<BufferView<'a>> {
    data.view(name)
}

/// Borrow a payload input, enforcing the configured `max_buffer_len`
///
/// # Safety
/// Same contract as [`view`].
pub unsafe fn payload_view<'a>(name: &'static str, data: StashData) -> Result<BufferView<'a>> {
    let view = data.view(name)?;
    view.require_at_most(current_config().max_buffer_len)?;
    Ok(view)
}

/// Drive asynchronous native logic to completion.
///
/// The boundary is synchronous; an operation that needs to await something
/// still produces exactly one result for the caller.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| Error::internal(format!("failed to create async runtime: {}", e)))?;

    Ok(runtime.block_on(future))
}
