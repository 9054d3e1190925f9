//! Upper bounds on the size of a clique that can still be reached from a search state. A branch
//! is pruned when its bound is strictly smaller than the size of the best clique known so far;
//! branches that could only tie the best clique are still explored.

use crate::graph::{Graph, GraphError};

/// Bound for taking `v` next: `v` can at most be joined by all of its neighbors in `g`.
pub fn degree_bound(g: &Graph, v: usize, clique_size: usize) -> Result<usize, GraphError> {
    Ok(g.degree(v)? + clique_size)
}

/// Bound after provisionally adding a vertex, given the candidates that remain adjacent to it.
pub fn candidate_bound(new_candidates: usize, clique_size: usize) -> usize {
    new_candidates + clique_size + 1
}

/// Whether a branch with the given bound cannot beat a best clique of size `best`.
pub fn is_pruned(bound: usize, best: usize) -> bool {
    bound < best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds() {
        // 0 -- 1 -- 2, plus isolated 3
        let g = Graph::from_edges(vec![0, 1, 2, 3], vec![(0, 1), (1, 2)]).unwrap();

        assert_eq!(degree_bound(&g, 1, 0).unwrap(), 2);
        assert_eq!(degree_bound(&g, 0, 2).unwrap(), 3);
        assert_eq!(degree_bound(&g, 3, 1).unwrap(), 1);
        assert!(degree_bound(&g, 4, 0).is_err());

        assert_eq!(candidate_bound(0, 0), 1);
        assert_eq!(candidate_bound(2, 3), 6);
    }

    #[test]
    fn ties_are_not_pruned() {
        assert!(is_pruned(2, 3));
        assert!(!is_pruned(3, 3));
        assert!(!is_pruned(4, 3));
        assert!(!is_pruned(0, 0));
    }
}
