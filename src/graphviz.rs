use crate::PetGraph;

use log::info;
use petgraph::dot::{Config, Dot};
use petgraph::graph::{EdgeReference, NodeIndex};
use rustc_hash::FxHashSet;

use std::io::{self, Write};
use std::process::{Command, Stdio};

/// Renders `graph` as DOT, with the vertices labelled by their node weights. Vertices in `clique`
/// (given by node weight) and the edges between them are highlighted.
pub fn clique_dot(graph: &PetGraph, clique: &[usize]) -> String {
    let highlight: FxHashSet<usize> = clique.iter().copied().collect();

    let edge_attrs = |g: &PetGraph, e: EdgeReference<'_, u8>| {
        use petgraph::visit::EdgeRef;
        if highlight.contains(&g[e.source()]) && highlight.contains(&g[e.target()]) {
            "color=red, penwidth=2".to_string()
        } else {
            String::new()
        }
    };
    let node_attrs = |_: &PetGraph, (_, label): (NodeIndex, &usize)| {
        if highlight.contains(label) {
            "style=filled, fillcolor=salmon".to_string()
        } else {
            String::new()
        }
    };

    let dot = Dot::with_attr_getters(graph, &[Config::EdgeNoLabel], &edge_attrs, &node_attrs);
    dot.to_string()
}

/// Writes a PNG of `graph` with `clique` highlighted to `path`, using the graphviz executable
/// `command` (usually `dot`).
pub fn print_graph<P: AsRef<std::path::Path>>(
    command: &str,
    path: P,
    graph: &PetGraph,
    clique: &[usize],
) -> io::Result<()> {
    info!(
        "Writing graph image to {}, graph has {} nodes",
        path.as_ref().display(),
        graph.node_count()
    );

    print(command, path, &clique_dot(graph, clique))
}

fn print<P: AsRef<std::path::Path>>(command: &str, path: P, dot_str: &str) -> io::Result<()> {
    let mut graphviz = Command::new(command)
        .arg("-Tpng")
        .arg(format!("-o{}", path.as_ref().display()))
        .stdin(Stdio::piped())
        .spawn()?;

    {
        let stdin = graphviz
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::BrokenPipe, "no graphviz stdin pipe"))?;
        stdin.write_all(dot_str.as_bytes())?;
    }

    let status = graphviz.wait()?;
    if !status.success() {
        return Err(io::Error::new(
            io::ErrorKind::Other,
            format!("graphviz exited with {}", status),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Graph;

    #[test]
    fn highlights_clique() {
        let g = Graph::from_edge_list(&[(1, 2), (1, 3), (2, 3), (3, 4)]).into_petgraph();
        let dot = clique_dot(&g, &[1, 2, 3]);

        assert_eq!(dot.matches("fillcolor=salmon").count(), 3);
        assert_eq!(dot.matches("color=red").count(), 3);
    }
}
