use crate::graph::GraphError;
use std::collections::TryReserveError;

pub type Result<T> = std::result::Result<T, LayoutError>;

#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("edge `{edge}` references missing node `{node}`")]
    MissingNode { edge: String, node: String },

    #[error("node id `{id}` is declared more than once")]
    DuplicateNode { id: String },

    #[error("inconsistent connection slots on node `{node}`: {reason}")]
    ConnectionSlot { node: String, reason: String },

    #[error("failed to reserve layout scratch buffers")]
    Allocation(#[from] TryReserveError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("this session has already been laid out")]
    AlreadyComputed,
}
