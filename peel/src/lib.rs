//! # peel
//!
//! Decomposes a layered image document into per-layer assets and vector
//! contours: nested groups are dissolved into one ordered stack, every layer
//! gets a closed boundary path traced around its non-transparent pixels, and
//! the result is saved as a layered document plus (optionally) one image per
//! layer.
//!
//! Everything pixel-related - rasterization, selection refinement, boundary
//! tracing, file encoding - is delegated to a host application behind the
//! [`host::Host`] trait. This crate owns the orchestration: ordering,
//! naming, skip/continue policy, and cleanup.

pub mod exporter;
pub mod host;
pub mod session;
pub mod writer;

pub use exporter::{run, run_interactive, RunError};
pub use host::{Host, HostError};
