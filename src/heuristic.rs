use crate::{
    best::Clique,
    graph::{Graph, GraphError},
};

use log::info;

/// Greedily builds a large clique to seed the exact search with.
///
/// Starting from every vertex in turn, the clique is grown by repeatedly adding the remaining
/// candidate with the highest degree (ties broken by the smaller label), where candidates are the
/// vertices adjacent to everything chosen so far. The largest clique over all start vertices is
/// returned; it is empty only for the empty graph.
pub fn greedy_clique(g: &Graph) -> Result<Clique, GraphError> {
    let mut best: Vec<usize> = Vec::new();

    // Every start vertex costs O(n^2), which is fine compared to the exact search.
    for start in g.nodes() {
        let mut clique = vec![start];
        let mut candidates: Vec<usize> = g.neighbors(start)?.collect();

        while !candidates.is_empty() {
            let mut pick = candidates[0];
            let mut pick_key = (g.degree(pick)?, std::cmp::Reverse(g.label(pick)?));
            for &c in &candidates[1..] {
                let key = (g.degree(c)?, std::cmp::Reverse(g.label(c)?));
                if key > pick_key {
                    pick = c;
                    pick_key = key;
                }
            }

            clique.push(pick);
            let mut remaining = Vec::with_capacity(candidates.len());
            for &c in &candidates {
                if c != pick && g.has_edge(c, pick)? {
                    remaining.push(c);
                }
            }
            candidates = remaining;
        }

        if clique.len() > best.len() {
            best = clique;
        }
    }

    let labels = best
        .into_iter()
        .map(|v| g.label(v))
        .collect::<Result<Vec<_>, _>>()?;

    info!("Greedy heuristic found a clique of size {}.", labels.len());

    Ok(Clique::new(labels))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_triangle() {
        let g = Graph::from_edge_list(&[(1, 2), (1, 3), (2, 3), (3, 4)]);
        let c = greedy_clique(&g).unwrap();
        assert_eq!(c.sorted(), vec![1, 2, 3]);
        assert!(g.is_clique(&c.vertices));
    }

    #[test]
    fn trivial_graphs() {
        assert!(greedy_clique(&Graph::new(0)).unwrap().is_empty());
        assert_eq!(greedy_clique(&Graph::new(3)).unwrap().vertices, vec![0]);
    }

    #[test]
    fn always_a_clique() {
        // A 5-cycle with one chord: largest clique is the triangle 0-1-2.
        let g = Graph::from_edge_list(&[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (0, 2)]);
        let c = greedy_clique(&g).unwrap();
        assert!(g.is_clique(&c.vertices));
        assert_eq!(c.len(), 3);
    }
}
