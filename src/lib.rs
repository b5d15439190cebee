//! Incremental wall-mesh reconstruction for a rotating rangefinder scan.
//!
//! Samples stream in on a background thread, the render thread turns the
//! latest complete sample log into a triangle list and hands it to a
//! [`scan::MeshSink`].

pub mod config;
pub mod error;
pub mod scan;

pub use config::ScanConfig;
pub use error::{Result, ScanError};
