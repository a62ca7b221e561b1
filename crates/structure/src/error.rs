use indextree::NodeId;
use thiserror::Error;

pub type Result<T, E = EditError> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error("node {node:?} is not inside the editing root {root:?}")]
    NodeOutsideRoot { node: NodeId, root: NodeId },
    #[error("offset {offset} is out of bounds for a node of length {length}")]
    OffsetOutOfBounds { offset: usize, length: usize },
    #[error("node {0:?} has been removed from the document")]
    RemovedNode(NodeId),
    #[error("expected a text node, found {0:?}")]
    NotAText(NodeId),
    #[error("expected an element, found {0:?}")]
    NotAnElement(NodeId),
    #[error("node {0:?} has no parent")]
    Detached(NodeId),
    #[error("range start is after its end")]
    InvertedRange,
    #[error("invalid split: {0}")]
    InvalidSplit(&'static str),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
