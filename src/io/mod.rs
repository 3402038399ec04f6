pub mod dot;
pub mod fasta;
pub mod text;

pub use dot::{format_debruijn_as_dot, format_label_graph_as_dot};
pub use text::{load_graph_text, parse_graph, parse_graph_str};
