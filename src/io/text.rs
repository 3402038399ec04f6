//! Reader for the line based graph description format
//!
//! ```text
//! // comment
//! (n1, A)
//! (n2, C)
//! {n1, n2}
//! ```
//!
//! Node lines declare an identifier and a single character label, edge lines
//! connect two identifiers. Node ids are assigned in order of declaration and
//! edges may refer to nodes declared further down.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::errors::{Result, VaralignError};
use crate::graphs::RawGraph;

struct PendingEdge {
    line: usize,
    from: String,
    to: String,
}

pub fn load_graph_text(path: impl AsRef<Path>) -> Result<RawGraph> {
    let file = File::open(path)?;

    parse_graph(BufReader::new(file))
}

pub fn parse_graph_str(input: &str) -> Result<RawGraph> {
    parse_graph(input.as_bytes())
}

pub fn parse_graph(reader: impl BufRead) -> Result<RawGraph> {
    let mut node_ix: FxHashMap<String, usize> = FxHashMap::default();
    let mut labels = Vec::new();
    let mut pending = Vec::new();

    for (i, line) in reader.lines().enumerate() {
        let line_no = i + 1;
        let line = line?;
        let line = line.trim();

        match line.as_bytes().first() {
            None => continue,
            Some(b'(') => {
                let (id, label) = parse_node(line_no, line)?;

                if label.len() != 1 {
                    return Err(VaralignError::InvalidLabel { line: line_no, label: label.to_string() });
                }

                if node_ix.contains_key(id) {
                    return Err(VaralignError::DuplicateNode { line: line_no, id: id.to_string() });
                }

                node_ix.insert(id.to_string(), labels.len());
                labels.push(label.as_bytes()[0]);
            },
            Some(b'{') => {
                let (from, to) = parse_edge(line_no, line)?;
                pending.push(PendingEdge { line: line_no, from: from.to_string(), to: to.to_string() });
            },
            Some(b'/') => {
                if line.as_bytes().get(1) != Some(&b'/') {
                    return Err(VaralignError::InvalidComment { line: line_no, content: line.to_string() });
                }
            },
            Some(_) => return Err(VaralignError::InvalidLine { line: line_no, content: line.to_string() }),
        }
    }

    let resolve = |line: usize, id: &str| {
        node_ix.get(id)
            .copied()
            .ok_or_else(|| VaralignError::UnknownNode { line, id: id.to_string() })
    };

    let edges = pending.iter()
        .map(|edge| Ok((resolve(edge.line, &edge.from)?, resolve(edge.line, &edge.to)?)))
        .collect::<Result<Vec<_>>>()?;

    Ok(RawGraph::new(labels, edges))
}

/// Text between the opening and the closing character of a line, or `None` if
/// the line is too short or not terminated with `close`
fn enclosed(line: &str, close: char) -> Option<&str> {
    if line.len() < 4 || !line.ends_with(close) {
        return None;
    }

    Some(&line[1..line.len() - 1])
}

fn parse_node(line_no: usize, line: &str) -> Result<(&str, &str)> {
    let invalid = || VaralignError::InvalidNode { line: line_no, content: line.to_string() };

    let (id, label) = enclosed(line, ')')
        .and_then(|body| body.split_once(','))
        .ok_or_else(invalid)?;

    Ok((id.trim(), label.trim()))
}

fn parse_edge(line_no: usize, line: &str) -> Result<(&str, &str)> {
    let invalid = || VaralignError::InvalidEdge { line: line_no, content: line.to_string() };

    let body = enclosed(line, '}').ok_or_else(invalid)?;
    let mut parts = body.split(',');

    match (parts.next(), parts.next(), parts.next()) {
        (Some(from), Some(to), None) => Ok((from.trim(), to.trim())),
        _ => Err(invalid()),
    }
}
