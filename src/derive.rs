use crate::matrix::Matrix;

/// Need = Max − Alloc, elementwise.
///
/// The result is not clamped: a negative entry means the process holds more than its
/// declared maximum, which the graph must still show. Cells missing from either input
/// read as 0, so the result has the larger of the two shapes.
pub fn compute_need(alloc: &Matrix, max: &Matrix) -> Matrix {
    let rows = alloc.rows().max(max.rows());
    let cols = alloc.cols().max(max.cols());
    let mut need = Matrix::new(rows, cols);
    for i in 0..rows {
        for j in 0..cols {
            let m = max.get(i, j).unwrap_or(0);
            let a = alloc.get(i, j).unwrap_or(0);
            need[(i, j)] = m.saturating_sub(a);
        }
    }
    need
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum EdgeKind {
    /// The resource is held by the process. Drawn resource → process.
    Allocation,
    /// The process may still request the resource. Drawn process → resource.
    Request,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct RagEdge {
    pub kind: EdgeKind,
    pub process: usize,
    pub resource: usize,
}

/// The edges of a resource-allocation graph, in (process, resource) order with the
/// allocation edge of a pair before its request edge.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct RagEdgeSet {
    edges: Vec<RagEdge>,
}

impl RagEdgeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RagEdge> + '_ {
        self.edges.iter()
    }

    pub fn contains(&self, kind: EdgeKind, process: usize, resource: usize) -> bool {
        self.edges.contains(&RagEdge {
            kind,
            process,
            resource,
        })
    }

    pub fn count(&self, kind: EdgeKind) -> usize {
        self.edges.iter().filter(|e| e.kind == kind).count()
    }
}

/// Emits an allocation edge for every positive `alloc` cell and a request edge for every
/// positive `need` cell. The two matrices are read independently; a pair may have both.
pub fn compute_edges(alloc: &Matrix, need: &Matrix) -> RagEdgeSet {
    let rows = alloc.rows().max(need.rows());
    let cols = alloc.cols().max(need.cols());
    let mut edges = Vec::new();
    for process in 0..rows {
        for resource in 0..cols {
            if alloc.get(process, resource).unwrap_or(0) > 0 {
                edges.push(RagEdge {
                    kind: EdgeKind::Allocation,
                    process,
                    resource,
                });
            }
            if need.get(process, resource).unwrap_or(0) > 0 {
                edges.push(RagEdge {
                    kind: EdgeKind::Request,
                    process,
                    resource,
                });
            }
        }
    }
    RagEdgeSet { edges }
}

/// The two matrices a graph is drawn from. Built either locally from the store, or from
/// the `graph` field of a backend verdict.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct GraphData {
    pub alloc: Matrix,
    pub need: Matrix,
}

impl GraphData {
    pub fn from_model(alloc: &Matrix, max: &Matrix) -> Self {
        Self {
            alloc: alloc.clone(),
            need: compute_need(alloc, max),
        }
    }

    pub fn edges(&self) -> RagEdgeSet {
        compute_edges(&self.alloc, &self.need)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::example_scenario;
    use crate::Quantity;
    use proptest::prelude::*;

    fn m(rows: &[&[Quantity]]) -> Matrix {
        let cols = rows.first().map(|r| r.len()).unwrap_or(0);
        let rows: Vec<Vec<Quantity>> = rows.iter().map(|r| r.to_vec()).collect();
        Matrix::from_rows(cols, &rows).unwrap()
    }

    #[test]
    fn need_of_example() {
        let ex = example_scenario();
        let need = compute_need(&ex.alloc, &ex.max);
        assert_eq!(
            need.to_rows(),
            vec![vec![7, 4, 3], vec![1, 2, 2], vec![6, 0, 0]]
        );
    }

    #[test]
    fn need_can_be_negative() {
        let alloc = m(&[&[5, 0]]);
        let max = m(&[&[2, 0]]);
        let need = compute_need(&alloc, &max);
        assert_eq!(need.to_rows(), vec![vec![-3, 0]]);
        let edges = compute_edges(&alloc, &need);
        assert!(edges.contains(EdgeKind::Allocation, 0, 0));
        assert!(!edges.contains(EdgeKind::Request, 0, 0));
    }

    #[test]
    fn edges_of_example() {
        let ex = example_scenario();
        let data = GraphData::from_model(&ex.alloc, &ex.max);
        let edges = data.edges();

        let allocs: Vec<(usize, usize)> = edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Allocation)
            .map(|e| (e.process, e.resource))
            .collect();
        assert_eq!(allocs, vec![(0, 1), (1, 0), (2, 0), (2, 2)]);

        let requests: Vec<(usize, usize)> = edges
            .iter()
            .filter(|e| e.kind == EdgeKind::Request)
            .map(|e| (e.process, e.resource))
            .collect();
        assert_eq!(
            requests,
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2), (2, 0)]
        );
        assert_eq!(edges.len(), 11);
    }

    #[test]
    fn empty_inputs_give_empty_set() {
        let edges = compute_edges(&Matrix::new(0, 0), &Matrix::new(0, 0));
        assert!(edges.is_empty());
        let edges = compute_edges(&Matrix::new(3, 0), &Matrix::new(3, 0));
        assert!(edges.is_empty());
    }

    #[test]
    fn edge_order_is_row_major() {
        let alloc = m(&[&[1, 1], &[0, 1]]);
        let need = m(&[&[1, 0], &[1, 0]]);
        let edges: Vec<RagEdge> = compute_edges(&alloc, &need).iter().copied().collect();
        let mut sorted = edges.clone();
        sorted.sort_by_key(|e| (e.process, e.resource, e.kind));
        assert_eq!(edges, sorted);
    }

    fn matrix_strategy(rows: usize, cols: usize) -> impl Strategy<Value = Matrix> {
        proptest::collection::vec(-5i64..10, rows * cols).prop_map(move |cells| {
            let rows: Vec<Vec<Quantity>> = cells.chunks(cols).map(|c| c.to_vec()).collect();
            Matrix::from_rows(cols, &rows).unwrap()
        })
    }

    fn model_strategy() -> impl Strategy<Value = (Matrix, Matrix)> {
        (1usize..6, 1usize..6)
            .prop_flat_map(|(p, r)| (matrix_strategy(p, r), matrix_strategy(p, r)))
    }

    proptest! {
        #[test]
        fn need_is_max_minus_alloc((alloc, max) in model_strategy()) {
            let need = compute_need(&alloc, &max);
            for (i, j, n) in need.iter_cells() {
                prop_assert_eq!(n, max[(i, j)] - alloc[(i, j)]);
            }
        }

        #[test]
        fn edges_follow_positive_cells((alloc, max) in model_strategy()) {
            let need = compute_need(&alloc, &max);
            let edges = compute_edges(&alloc, &need);
            prop_assert!(edges.len() <= 2 * alloc.num_cells());
            for (i, j, a) in alloc.iter_cells() {
                prop_assert_eq!(edges.contains(EdgeKind::Allocation, i, j), a > 0);
                prop_assert_eq!(edges.contains(EdgeKind::Request, i, j), need[(i, j)] > 0);
            }
        }
    }
}
