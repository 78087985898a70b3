//! Stash Core - ownership, handle and error conventions for a native boundary
//!
//! This crate holds the language-independent half of the stash native
//! library: everything a native operation needs to talk to its caller
//! without touching raw pointers.
//!
//! # Main Components
//!
//! - **Buffers**: [`BufferView`] borrows caller memory for one call,
//!   [`OwnedBuffer`] is handed to the caller on return
//! - **Handles**: [`HandleTable`] maps opaque 64-bit [`Handle`]s to resources
//!   that outlive a single call
//! - **Outcomes**: [`Reply`] and [`Error`] are the two arms of a call result
//! - **Configuration**: [`Config`] resolved from defaults, environment and JSON
//!
//! # Example
//!
//! ```
//! use stash_core::{HandleTable, Resource, Reply, Outcome};
//!
//! struct Session(String);
//! impl Resource for Session {}
//!
//! fn open(table: &HandleTable, name: &str) -> Outcome {
//!     let handle = table.register(Session(name.to_string()));
//!     Ok(Reply::handle(handle))
//! }
//!
//! let table = HandleTable::new();
//! let reply = open(&table, "main").unwrap();
//! assert_eq!(table.lookup::<Session>(reply.handle).unwrap().0, "main");
//! table.release(reply.handle).unwrap();
//! ```

pub mod buffer;
pub mod config;
pub mod error;
pub mod handle;
pub mod outcome;
pub mod table;


pub use buffer::{BufferView, OwnedBuffer};
pub use config::{Config, LogFormat, LogLevel};
pub use error::{Error, ErrorCode, Result};
pub use handle::Handle;
pub use outcome::{Outcome, Reply};
pub use table::{HandleTable, Resource, TableStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
