// src/dag/mod.rs

//! Dependency graph representation.
//!
//! - [`graph`] holds the id-keyed graph with both adjacency directions plus
//!   the cycle and ordering queries the engine and config validation use.

pub mod graph;

pub use graph::DependencyGraph;
