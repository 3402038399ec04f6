//! A module containing small hand-built label graphs useful in unit tests

use crate::graphs::LabelGraph;

/// Linear graph `A -> C -> G -> T`
pub(crate) fn create_linear_graph() -> LabelGraph {
    LabelGraph::new(b"ACGT".to_vec(), &[(0, 1), (1, 2), (2, 3)]).unwrap()
}

/// Graph with a SNP bubble and a deletion:
///
/// ```text
///        +-> C -+
///  A -> G       +-> T -> A
///   \    +-> T -+       ^
///    +------------------+
/// ```
pub(crate) fn create_variant_graph() -> LabelGraph {
    let labels = b"AGCTTA".to_vec();
    let edges = [
        (0, 1),
        (1, 2),
        (1, 3),
        (2, 4),
        (3, 4),
        (4, 5),
        (0, 5),
    ];

    LabelGraph::new(labels, &edges).unwrap()
}

/// Graph with a self-loop on the middle node: `A -> C (loop) -> G`
pub(crate) fn create_loop_graph() -> LabelGraph {
    LabelGraph::new(b"ACG".to_vec(), &[(0, 1), (1, 1), (1, 2)]).unwrap()
}
