use log::{debug, info, warn};
use petgraph::data::{Build, Create};
use rustc_hash::{FxHashMap, FxHashSet};
use std::{
    fs::File,
    io::{self, prelude::*, BufReader},
};

fn make_error(text: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, text)
}

// Both parse_file and parse produce a graph by parsing their input according to the DIMACS edge
// format:
//   c <comment>
//   p <format> <vertex count> <edge count>
//   e <u> <v>
// The node weights are set to the vertex identifiers used in the file. The vertex set is the set of
// edge endpoints, in order of first appearance; the `p` line is only checked against the result.
// Self-loops and repeated edges are dropped, unknown line types are skipped.

pub fn parse_file<G, P: AsRef<std::path::Path>>(path: P) -> io::Result<G>
where
    G: Create + Build<NodeWeight = usize>,
    G::EdgeWeight: Default,
{
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    parse(reader)
}

pub fn parse<G, R: BufRead>(reader: R) -> io::Result<G>
where
    G: Create + Build<NodeWeight = usize>,
    G::EdgeWeight: Default,
{
    let mut declared: Option<(usize, usize)> = None;
    let mut labels: Vec<usize> = Vec::new();
    let mut index: FxHashMap<usize, usize> = FxHashMap::default();
    let mut edges: Vec<(usize, usize)> = Vec::new();
    let mut seen_edges: FxHashSet<(usize, usize)> = FxHashSet::default();

    let mut vertex = |label: usize, labels: &mut Vec<usize>| -> usize {
        *index.entry(label).or_insert_with(|| {
            labels.push(label);
            labels.len() - 1
        })
    };

    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let mut split = line.split_whitespace();

        match split.next() {
            None | Some("c") => continue,
            Some("p") => {
                let n = split.nth(1).and_then(|s| s.parse().ok());
                let m = split.next().and_then(|s| s.parse().ok());
                match (n, m) {
                    (Some(n), Some(m)) => declared = Some((n, m)),
                    _ => warn!("Ignoring malformed problem line {}: {}", line_no, line),
                }
            }
            Some("e") => {
                let mut endpoint = || {
                    split
                        .next()
                        .and_then(|s| s.parse::<usize>().ok())
                        .ok_or_else(|| {
                            make_error(format!("invalid edge format in line {}: {}", line_no, line))
                        })
                };
                let u = endpoint()?;
                let v = endpoint()?;

                if u == v {
                    debug!("Dropping self-loop at {} in line {}", u, line_no);
                    continue;
                }

                let key = (u.min(v), u.max(v));
                if !seen_edges.insert(key) {
                    debug!("Dropping repeated edge {}-{} in line {}", u, v, line_no);
                    continue;
                }

                let u = vertex(u, &mut labels);
                let v = vertex(v, &mut labels);
                edges.push((u, v));
            }
            Some(other) => {
                debug!("Skipping line {} of unknown type '{}'", line_no, other);
            }
        }
    }

    match declared {
        Some((n, m)) if n != labels.len() || m != edges.len() => warn!(
            "Problem line declares {} vertices and {} edges, but the edge list has {} vertices and {} edges",
            n,
            m,
            labels.len(),
            edges.len()
        ),
        Some(_) => {}
        None => debug!("Input has no problem line"),
    }

    info!(
        "Parsed graph with {} vertices and {} edges",
        labels.len(),
        edges.len()
    );

    let mut graph = G::with_capacity(labels.len(), edges.len());

    let node_ids: Vec<_> = labels.iter().map(|&l| graph.add_node(l)).collect();

    for (u, v) in edges {
        graph.add_edge(node_ids[u], node_ids[v], Default::default());
    }

    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::PetGraph;

    fn parse_str(s: &str) -> io::Result<PetGraph> {
        parse(s.as_bytes())
    }

    #[test]
    fn parses_dimacs() {
        let input = "c example\np edge 4 4\ne 1 2\ne 1 3\ne 2 3\ne 3 4\n";
        let g = parse_str(input).unwrap();

        assert_eq!(g.node_count(), 4);
        assert_eq!(g.edge_count(), 4);
        let weights: Vec<usize> = g.node_indices().map(|v| g[v]).collect();
        assert_eq!(weights, vec![1, 2, 3, 4]);
    }

    #[test]
    fn vertex_set_comes_from_edges() {
        // The problem line claims 10 vertices, but only the edge endpoints count.
        let input = "p edge 10 2\ne 7 3\n\ne 3 9\n";
        let g = parse_str(input).unwrap();

        let weights: Vec<usize> = g.node_indices().map(|v| g[v]).collect();
        assert_eq!(weights, vec![7, 3, 9]);
        assert_eq!(g.edge_count(), 2);
    }

    #[test]
    fn drops_loops_and_repeated_edges() {
        let input = "e 1 2\ne 2 1\ne 1 1\ne 1 2\n";
        let g = parse_str(input).unwrap();

        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn skips_unknown_lines() {
        let input = "n 1 5\ne 1 2\nx whatever\n";
        let g = parse_str(input).unwrap();
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn rejects_malformed_edges() {
        for input in &["e 1\n", "e 1 x\n", "e -1 2\n"] {
            let err = parse_str(input).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::InvalidData);
            assert!(err.to_string().contains("line 1"));
        }
    }

    #[test]
    fn empty_input() {
        let g = parse_str("c nothing here\n").unwrap();
        assert_eq!(g.node_count(), 0);
    }
}
