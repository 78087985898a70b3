//! FFI API function definitions
//!
//! This module contains the extern "C" functions that form
//! the public API of the stash native library. Every function returns a
//! `Result` record; none of them unwind or abort on bad input.

use serde::Serialize;
use stash_core::table::{self, TableStats};
use stash_core::{Config, Handle, LogLevel, Reply};

use crate::blob::Blob;
use crate::gateway::{self, payload_view, view};
use crate::logging;
use crate::types::{StashData, StashResult};

/// Get version information
///
/// # Returns
/// A `Result` whose payload is the UTF-8 string `"stash-ffi <version>"`.
/// Free it with `stash_free_result`.
#[no_mangle]
pub extern "C" fn stash_version() -> StashResult {
    ffi_boundary!("version", {
        Ok(Reply::bytes(concat!(
            env!("CARGO_PKG_NAME"),
            " ",
            env!("CARGO_PKG_VERSION")
        )))
    })
}

/// Set the log level
///
/// # Parameters
/// - `level`: one of `trace`, `debug`, `info`, `warn`, `error`, `off`
///
/// # Safety
/// `level` must satisfy the `Data` contract for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn stash_set_log_level(level: StashData) -> StashResult {
    ffi_boundary!("set_log_level", {
        let level = view("level", level)?;
        level.require_non_empty()?;
        let level: LogLevel = level.to_str()?.parse()?;

        logging::set_level(level)?;
        let mut config = gateway::current_config();
        config.log_level = level;
        gateway::apply_config(config);

        Ok(Reply::empty())
    })
}

/// Apply a JSON configuration document
///
/// Accepted fields are `log_level`, `log_format` and `max_buffer_len`;
/// missing fields fall back to their defaults. The log format only takes
/// effect if logging has not been initialised yet.
///
/// # Safety
/// `config_json` must satisfy the `Data` contract for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn stash_configure(config_json: StashData) -> StashResult {
    ffi_boundary!("configure", {
        let config_json = view("config", config_json)?;
        let config = Config::from_json(config_json.require_non_empty()?)?;
        if config.max_buffer_len == 0 {
            return Err(stash_core::Error::invalid_input(
                "max_buffer_len",
                "must be greater than zero",
            ));
        }

        logging::set_level(config.log_level)?;
        gateway::apply_config(config);
        Ok(Reply::empty())
    })
}

#[derive(Serialize)]
struct Stats {
    version: &'static str,
    log_level: Option<String>,
    handles: TableStats,
}

/// Report handle table statistics as JSON
///
/// The payload looks like
/// `{"version":"0.1.0","log_level":"warn","handles":{"live":2,"registered":5,"released":3}}`.
#[no_mangle]
pub extern "C" fn stash_stats() -> StashResult {
    ffi_boundary!("stats", {
        Reply::json(&Stats {
            version: stash_core::VERSION,
            log_level: logging::current_level(),
            handles: table::global().stats(),
        })
    })
}

/// Return a copy of the input bytes
///
/// # Safety
/// `input` must satisfy the `Data` contract for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn stash_echo(input: StashData) -> StashResult {
    ffi_boundary!("echo", {
        let input = payload_view("input", input)?;
        Ok(Reply::bytes(input.to_owned_buffer()))
    })
}

/// Copy bytes into a new blob resource
///
/// # Returns
/// A `Result` whose `handle` refers to the blob. Release it with
/// `stash_release`.
///
/// # Safety
/// `bytes` must satisfy the `Data` contract for the duration of the call.
#[no_mangle]
pub unsafe extern "C" fn stash_blob_open(bytes: StashData) -> StashResult {
    ffi_boundary!("blob_open", {
        let bytes = payload_view("bytes", bytes)?;
        let blob = Blob::copy_from(bytes);
        Ok(Reply::handle(table::global().register(blob)))
    })
}

/// Read the full contents of a blob
#[no_mangle]
pub extern "C" fn stash_blob_read(handle: u64) -> StashResult {
    ffi_boundary!("blob_read", {
        let blob = table::global().lookup::<Blob>(Handle::from_raw(handle))?;
        Ok(Reply::bytes(blob.to_owned_buffer()))
    })
}

/// Length of a blob, as a JSON number
#[no_mangle]
pub extern "C" fn stash_blob_len(handle: u64) -> StashResult {
    ffi_boundary!("blob_len", {
        let blob = table::global().lookup::<Blob>(Handle::from_raw(handle))?;
        Reply::json(&blob.len())
    })
}

/// Release a handle and destroy its resource
///
/// # Returns
/// An empty `Result` on success; a `not found` error if the handle is
/// unknown or was already released.
#[no_mangle]
pub extern "C" fn stash_release(handle: u64) -> StashResult {
    ffi_boundary!("release", {
        table::global().release(Handle::from_raw(handle))?;
        Ok(Reply::empty())
    })
}
