//! Data-access translation core: compiled row-to-object projection plans,
//! dialect-aware SQL fragment translation, and typed parameter binding, all
//! decoupled from any particular database driver.
//!
//! The library consumes two caller-supplied contracts, [`cursor::Cursor`]
//! (forward-only result rows) and [`command::Command`] (outgoing named
//! parameters), and provides three cooperating services around them:
//!
//! - [`projection`] compiles, per (cursor kind, entity shape) pair, a reusable
//!   plan that materializes rows into [`value::Record`]s, including nested
//!   entities and multi-row collection reads.
//! - [`dialect`] translates expression IR nodes into ordered SQL fragment
//!   lists per dialect, with ANSI defaults behind every dialect table.
//! - [`binder`] attaches runtime values to commands as typed parameters with
//!   per-dialect overrides.
//!
//! All registries are append-only and internally synchronized; a
//! [`registry::MapperRegistry`] is meant to be built once and shared.

pub mod binder;
pub mod command;
pub mod cursor;
pub mod dialect;
pub mod error;
pub mod prelude;
pub mod projection;
pub mod readers;
pub mod registry;
pub mod resolver;
pub mod shape;
pub mod tx;
pub mod types;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::SqlMapperError;
pub use registry::MapperRegistry;
