use rustc_hash::FxHashMap;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A query referenced a vertex index outside `0..size`.
    #[error("vertex {vertex} is not part of the graph (graph has {size} vertices)")]
    InvalidVertex { vertex: usize, size: usize },
    #[error("vertex {0} was given more than once")]
    DuplicateVertex(usize),
    #[error("vertex label {0} is used by more than one vertex")]
    DuplicateLabel(usize),
    #[error("self-loop at vertex {0}")]
    SelfLoop(usize),
}

/// An immutable, simple, undirected graph.
///
/// Vertices are addressed by dense indices `0..node_count()`. Every vertex additionally carries a
/// label, which is the identifier the vertex had in the input graph. Deriving an induced subgraph
/// renumbers the vertices densely again but keeps their labels, so labels can always be used to
/// talk about the original input, no matter how deep into the search a subgraph was created.
#[derive(Clone, Debug)]
pub struct Graph {
    /// The adjacency is stored as a linearized triangular matrix.
    /// An example matrix for a graph with four vertices might look like this:
    /// ```txt
    ///     u v w x
    ///   +--------
    /// u | - - - -
    /// v | a - - -
    /// w | b c - -
    /// x | d e f -
    /// ```
    /// This would be stored as `[a, b, c, d, e, f]` in the `matrix` field.
    matrix: Vec<bool>,
    size: usize,
    /// Stores a mapping from row index to the starting index of that row in the `matrix` list.
    row_offsets: Vec<usize>,
    degrees: Vec<usize>,
    edge_count: usize,
    labels: IndexMap,
}

impl Graph {
    /// Creates a new graph with `size` vertices and no edges. Vertex `i` is labelled `i`.
    pub fn new(size: usize) -> Self {
        Self::empty_with_labels(IndexMap::identity(size))
    }

    fn empty_with_labels(labels: IndexMap) -> Self {
        let size = labels.len();
        let mat_size = size * size.saturating_sub(1) / 2;

        let row_offsets =
            // Row 0 does not exist, so use a marker value that will definitely panic if any code
            // tries to index using it.
            std::iter::once(usize::MAX)
            // For all other rows, calculate the correct offset.
            .chain((1..size).map(|i| i * (i - 1) / 2))
            .take(size)
            .collect();

        Graph {
            matrix: vec![false; mat_size],
            size,
            row_offsets,
            degrees: vec![0; size],
            edge_count: 0,
            labels,
        }
    }

    /// Creates a graph with one vertex per entry of `labels` and the given edges, which are given
    /// as pairs of vertex indices (not labels). Duplicate edges are merged.
    pub fn from_edges<I>(labels: Vec<usize>, edges: I) -> Result<Self, GraphError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let mut seen = FxHashMap::default();
        for (i, &l) in labels.iter().enumerate() {
            if seen.insert(l, i).is_some() {
                return Err(GraphError::DuplicateLabel(l));
            }
        }

        let mut g = Self::empty_with_labels(IndexMap::from_vec(labels));
        for (u, v) in edges {
            g.check(u)?;
            g.check(v)?;
            if u == v {
                return Err(GraphError::SelfLoop(g.labels[u]));
            }
            g.add_edge(u, v);
        }

        Ok(g)
    }

    /// Creates a graph from a list of edges between labels. The vertex set is exactly the set of
    /// edge endpoints, ordered by label. Self-loops are skipped.
    pub fn from_edge_list(edges: &[(usize, usize)]) -> Self {
        let mut labels: Vec<usize> = edges.iter().flat_map(|&(u, v)| vec![u, v]).collect();
        labels.sort_unstable();
        labels.dedup();

        let index: FxHashMap<usize, usize> =
            labels.iter().enumerate().map(|(i, &l)| (l, i)).collect();

        let mut g = Self::empty_with_labels(IndexMap::from_vec(labels));
        for &(u, v) in edges {
            if u != v {
                g.add_edge(index[&u], index[&v]);
            }
        }
        g
    }

    /// Creates a new graph from an existing petgraph graph. The node weights of the petgraph are
    /// used as vertex labels and must be unique. Self-loops and parallel edges are dropped.
    pub fn new_from_petgraph(pg: &crate::PetGraph) -> Result<Self, GraphError> {
        let labels = pg.node_indices().map(|v| pg[v]).collect();
        let edges = pg
            .edge_indices()
            .filter_map(|e| pg.edge_endpoints(e))
            .map(|(u, v)| (u.index(), v.index()))
            .filter(|(u, v)| u != v);

        Self::from_edges(labels, edges)
    }

    /// Creates a petgraph graph from this graph, with the vertex labels as node weights.
    pub fn into_petgraph(&self) -> crate::PetGraph {
        use petgraph::prelude::NodeIndex;

        let mut pg = crate::PetGraph::with_capacity(self.size, self.edge_count);

        for u in self.nodes() {
            pg.add_node(self.labels[u]);
        }

        for v in self.nodes() {
            for u in 0..v {
                if self.get_direct(u, v) {
                    pg.add_edge(NodeIndex::new(u), NodeIndex::new(v), 0);
                }
            }
        }

        pg
    }

    fn add_edge(&mut self, u: usize, v: usize) {
        let (u, v) = if u < v { (u, v) } else { (v, u) };
        let idx = self.row_offsets[v] + u;
        if !self.matrix[idx] {
            self.matrix[idx] = true;
            self.degrees[u] += 1;
            self.degrees[v] += 1;
            self.edge_count += 1;
        }
    }

    fn check(&self, v: usize) -> Result<(), GraphError> {
        if v < self.size {
            Ok(())
        } else {
            Err(GraphError::InvalidVertex {
                vertex: v,
                size: self.size,
            })
        }
    }

    /// Assumes `u < v < size` instead of checking it.
    fn get_direct(&self, u: usize, v: usize) -> bool {
        self.matrix[self.row_offsets[v] + u]
    }

    /// Assumes both vertices are valid.
    fn adjacent(&self, u: usize, v: usize) -> bool {
        match u.cmp(&v) {
            std::cmp::Ordering::Less => self.get_direct(u, v),
            std::cmp::Ordering::Greater => self.get_direct(v, u),
            std::cmp::Ordering::Equal => false,
        }
    }

    /// Whether `u` and `v` are joined by an edge. A vertex is never adjacent to itself.
    pub fn has_edge(&self, u: usize, v: usize) -> Result<bool, GraphError> {
        self.check(u)?;
        self.check(v)?;
        Ok(self.adjacent(u, v))
    }

    pub fn degree(&self, v: usize) -> Result<usize, GraphError> {
        self.check(v)?;
        Ok(self.degrees[v])
    }

    /// Returns an iterator over the open neighborhood of `v` (i.e., not including `v` itself). The
    /// neighbors are guaranteed to be in ascending order.
    pub fn neighbors(&self, v: usize) -> Result<impl Iterator<Item = usize> + '_, GraphError> {
        self.check(v)?;
        Ok((0..v)
            .filter(move |&u| self.get_direct(u, v))
            .chain(((v + 1)..self.size).filter(move |&u| self.get_direct(v, u))))
    }

    /// Returns the subgraph induced by `subset`. Vertex `subset[i]` becomes vertex `i` of the new
    /// graph and keeps its label.
    pub fn induce(&self, subset: &[usize]) -> Result<Graph, GraphError> {
        let mut seen = vec![false; self.size];
        for &v in subset {
            self.check(v)?;
            if std::mem::replace(&mut seen[v], true) {
                return Err(GraphError::DuplicateVertex(v));
            }
        }

        let labels = IndexMap::from_vec(subset.iter().map(|&v| self.labels[v]).collect());
        let mut g = Self::empty_with_labels(labels);

        for (j, &v) in subset.iter().enumerate() {
            for (i, &u) in subset[..j].iter().enumerate() {
                if self.adjacent(u, v) {
                    g.add_edge(i, j);
                }
            }
        }

        Ok(g)
    }

    /// Returns the number of nodes in this graph.
    pub fn node_count(&self) -> usize {
        self.size
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Returns an iterator over all the nodes present in the graph.
    pub fn nodes(&self) -> impl Iterator<Item = usize> {
        0..self.size
    }

    pub fn label(&self, v: usize) -> Result<usize, GraphError> {
        self.check(v)?;
        Ok(self.labels[v])
    }

    pub fn labels(&self) -> &IndexMap {
        &self.labels
    }

    /// Checks that every pair of the given labels is joined by an edge. Unknown labels make the
    /// check fail.
    pub fn is_clique(&self, labels: &[usize]) -> bool {
        let index: FxHashMap<usize, usize> =
            self.labels.iter().enumerate().map(|(i, &l)| (l, i)).collect();

        let mut vertices = Vec::with_capacity(labels.len());
        for l in labels {
            match index.get(l) {
                Some(&v) => vertices.push(v),
                None => return false,
            }
        }

        vertices.iter().enumerate().all(|(j, &v)| {
            vertices[..j]
                .iter()
                .all(|&u| u != v && self.adjacent(u, v))
        })
    }
}

/// Companion to the `Graph` struct for remapping to different indices.
///
/// The `Graph` struct uses indices `0..size` for the vertices stored within.
/// This is fine (and even advantageous) for operating on a single `Graph` instance,
/// but vertices found inside an induced subgraph have to be reported in terms of the
/// original input graph. An `IndexMap` stores that mapping.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexMap {
    map: Vec<usize>,
}

impl IndexMap {
    pub fn identity(size: usize) -> Self {
        Self {
            map: (0..size).collect(),
        }
    }

    pub fn from_vec(map: Vec<usize>) -> Self {
        Self { map }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, usize> {
        self.map.iter()
    }
}

impl std::ops::Index<usize> for IndexMap {
    type Output = usize;
    fn index(&self, index: usize) -> &Self::Output {
        &self.map[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_graph() -> Graph {
        // 0 -- 1
        // |    |
        // 2    3

        Graph::from_edges(vec![0, 1, 2, 3], vec![(0, 1), (0, 2), (1, 3)]).unwrap()
    }

    #[test]
    fn neighbors() {
        let g = example_graph();

        assert_eq!(g.neighbors(0).unwrap().collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(g.neighbors(1).unwrap().collect::<Vec<_>>(), vec![0, 3]);
        assert_eq!(g.neighbors(2).unwrap().collect::<Vec<_>>(), vec![0]);
        assert_eq!(g.neighbors(3).unwrap().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn degrees_and_edges() {
        let g = example_graph();

        assert_eq!(g.edge_count(), 3);
        assert_eq!(
            g.nodes().map(|v| g.degree(v).unwrap()).collect::<Vec<_>>(),
            vec![2, 2, 1, 1]
        );
        assert!(g.has_edge(3, 1).unwrap());
        assert!(!g.has_edge(2, 3).unwrap());
        assert!(!g.has_edge(2, 2).unwrap());
    }

    #[test]
    fn duplicate_edges_are_merged() {
        let g = Graph::from_edges(vec![5, 6], vec![(0, 1), (1, 0), (0, 1)]).unwrap();
        assert_eq!(g.edge_count(), 1);
        assert_eq!(g.degree(0).unwrap(), 1);
    }

    #[test]
    fn invalid_vertices_are_rejected() {
        let g = example_graph();

        let err = GraphError::InvalidVertex { vertex: 4, size: 4 };
        assert_eq!(g.degree(4).unwrap_err(), err);
        assert_eq!(g.neighbors(4).err(), Some(err));
        assert_eq!(g.has_edge(0, 4).unwrap_err(), err);
        assert_eq!(g.label(4).unwrap_err(), err);
        assert_eq!(g.induce(&[0, 4]).unwrap_err(), err);

        assert_eq!(
            Graph::from_edges(vec![1, 1], vec![]).unwrap_err(),
            GraphError::DuplicateLabel(1)
        );
        assert_eq!(
            Graph::from_edges(vec![7, 8], vec![(1, 1)]).unwrap_err(),
            GraphError::SelfLoop(8)
        );
        assert_eq!(
            g.induce(&[1, 1]).unwrap_err(),
            GraphError::DuplicateVertex(1)
        );
    }

    #[test]
    fn induce_keeps_labels_and_edges() {
        let g = Graph::from_edge_list(&[(10, 20), (10, 30), (20, 30), (30, 40)]);
        assert_eq!(g.labels().iter().copied().collect::<Vec<_>>(), vec![10, 20, 30, 40]);

        let sub = g.induce(&[3, 2, 0]).unwrap();
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.labels().iter().copied().collect::<Vec<_>>(), vec![40, 30, 10]);
        assert!(sub.has_edge(0, 1).unwrap());
        assert!(sub.has_edge(1, 2).unwrap());
        assert!(!sub.has_edge(0, 2).unwrap());
        assert_eq!(sub.edge_count(), 2);

        // The parent is untouched.
        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 4);

        let nested = sub.induce(&[2, 1]).unwrap();
        assert_eq!(nested.label(0).unwrap(), 10);
        assert_eq!(nested.label(1).unwrap(), 30);
        assert!(nested.has_edge(0, 1).unwrap());
    }

    #[test]
    fn empty_graph() {
        let g = Graph::new(0);
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.is_clique(&[]));
        assert_eq!(g.induce(&[]).unwrap().node_count(), 0);
    }

    #[test]
    fn clique_check() {
        let g = Graph::from_edge_list(&[(1, 2), (1, 3), (2, 3), (3, 4)]);
        assert!(g.is_clique(&[1, 2, 3]));
        assert!(g.is_clique(&[4]));
        assert!(!g.is_clique(&[1, 2, 3, 4]));
        assert!(!g.is_clique(&[1, 9]));
        assert!(!g.is_clique(&[3, 3]));
    }

    #[test]
    fn petgraph_conversion() {
        let g = Graph::from_edge_list(&[(1, 2), (2, 3)]);
        let pg = g.into_petgraph();
        assert_eq!(pg.node_count(), 3);
        assert_eq!(pg.edge_count(), 2);

        let back = Graph::new_from_petgraph(&pg).unwrap();
        assert_eq!(back.labels(), g.labels());
        assert!(back.has_edge(0, 1).unwrap());
        assert!(!back.has_edge(0, 2).unwrap());
    }
}
