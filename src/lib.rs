#[macro_use]
pub mod util;

pub mod algo;
pub mod best;
pub mod bound;
pub mod deadline;
pub mod graph;
pub mod graphviz;
pub mod heuristic;
pub mod parser;

pub type PetGraph = petgraph::Graph<usize, u8, petgraph::Undirected, u32>;
pub use best::{BestCliqueTracker, Clique};
pub use deadline::Deadline;
pub use graph::Graph;
