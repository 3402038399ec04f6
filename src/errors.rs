use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaralignError {
    /// A node line in a graph description file is malformed
    #[error("line {line}: invalid node: {content}")]
    InvalidNode { line: usize, content: String },

    /// An edge line in a graph description file is malformed
    #[error("line {line}: invalid edge: {content}")]
    InvalidEdge { line: usize, content: String },

    /// A line starting with '/' that is not a `//` comment
    #[error("line {line}: invalid comment: {content}")]
    InvalidComment { line: usize, content: String },

    /// A line that is neither a node, an edge nor a comment
    #[error("line {line}: invalid line: {content}")]
    InvalidLine { line: usize, content: String },

    /// Two node lines share the same identifier
    #[error("line {line}: duplicated node: {id}")]
    DuplicateNode { line: usize, id: String },

    /// Node labels have to be exactly one (single byte) character
    #[error("line {line}: label must have exactly 1 character, got: {label:?}")]
    InvalidLabel { line: usize, label: String },

    /// An edge refers to a node identifier that was never declared
    #[error("line {line}: edge refers to unknown node: {id}")]
    UnknownNode { line: usize, id: String },

    /// Graph labels are single ASCII characters
    #[error("label {symbol:#04x} of node {node} is not an ASCII character")]
    NonAsciiLabel { node: usize, symbol: u8 },

    /// Query sequences consist of ASCII characters
    #[error("query symbol {symbol:#04x} at position {pos} is not an ASCII character")]
    NonAsciiQuery { pos: usize, symbol: u8 },

    /// Edge endpoints have to lie within `[0, node_count)`
    #[error("edge ({from}, {to}) is out of range for a graph with {node_count} nodes")]
    EdgeOutOfRange { from: usize, to: usize, node_count: usize },

    /// Alignment against a graph without nodes
    #[error("can't align to an empty graph")]
    EmptyGraph,

    /// Alignment of an empty query sequence
    #[error("can't align an empty query sequence")]
    EmptyQuery,

    /// Hamming distance of two slices with a different length
    #[error("can't compare sequences of different length ({left} vs {right})")]
    LengthMismatch { left: usize, right: usize },

    /// De Bruijn filter threshold is negative or not a number
    #[error("invalid filter threshold: {0}")]
    InvalidThreshold(f64),

    /// The stride of a stride-k lattice must divide the number of graph nodes
    #[error("stride {stride} does not divide the number of graph nodes ({node_count})")]
    StrideMismatch { stride: usize, node_count: usize },

    /// The scoring function returned a cost the configured queue can't handle
    #[error("cost {cost} for ({query:?}, {label:?}) exceeds the maximum supported edge cost {max}")]
    CostOutOfRange { query: char, label: char, cost: u8, max: u8 },

    /// The search exhausted the lattice without reaching the destination
    #[error("the end of the alignment lattice is unreachable")]
    Unreachable,

    /// A lattice path that doesn't describe a valid alignment
    #[error("invalid lattice path: {0}")]
    InvalidPath(&'static str),

    /// Other IO errors
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, VaralignError>;
