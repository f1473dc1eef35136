//! safefile command-line tool.
//!
//! Thin operator surface over the `safefile` library: inspect the artifact
//! layout of a logical file, run recovery by hand, and read or write
//! through the protected pipelines.

pub mod cli;
pub mod commands;
