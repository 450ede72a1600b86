//! Arena graph container used by `strata`.
//!
//! Nodes and edges live in slot vectors and are addressed by copyable integer handles
//! ([`NodeId`], [`EdgeId`]). Adjacency is stored as ordered handle lists on every node, so the
//! cyclic structures a layered layout needs (predecessor/successor lists, dummy chains,
//! back-references) are plain data.

#![forbid(unsafe_code)]

pub mod error;
mod graph;

pub use error::{GraphError, Result};
pub use graph::{EdgeId, Graph, NodeId, alg};
