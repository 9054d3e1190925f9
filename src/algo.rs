use crate::{
    best::{BestCliqueTracker, Clique},
    bound,
    deadline::{Deadline, StopReason},
    graph::{Graph, GraphError},
};

use std::time::Duration;

use log::{info, warn};
use rayon::prelude::*;

#[derive(Clone, Debug)]
pub struct Parameters {
    /// Apply the degree and candidate bounds. Turning this off never changes the size of the
    /// reported clique, only the running time.
    pub bounds: bool,
    /// Once the subtree of a candidate has been explored, drop that candidate from the candidate
    /// set of its later siblings. Every clique containing it was already examined in its subtree,
    /// so the size of the result is the same, but later siblings see smaller subgraphs and may
    /// branch in a different order. The reported clique can then differ from the one found by the
    /// plain rule, which is why this is off by default.
    pub exclude_explored: bool,
    /// Number of worker threads. With more than one, the top-level branches are explored in
    /// parallel and the result is *a* maximum clique rather than the first one in branching order.
    pub threads: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            bounds: true,
            exclude_explored: false,
            threads: 1,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SearchStatus {
    /// The search space was exhausted, the clique is a maximum clique.
    Exact,
    TimedOut,
    NodeLimit,
    Cancelled,
}

impl SearchStatus {
    pub fn is_exact(self) -> bool {
        self == SearchStatus::Exact
    }

    fn from_reason(reason: Option<StopReason>) -> Self {
        match reason {
            Some(StopReason::TimedOut) => Self::TimedOut,
            Some(StopReason::NodeLimit) => Self::NodeLimit,
            Some(StopReason::Cancelled) | None => Self::Cancelled,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Recursive calls that passed the deadline check.
    pub nodes: u64,
    pub leaves: u64,
    pub pruned_by_degree: u64,
    pub pruned_by_candidates: u64,
    /// Sizes of the cliques that replaced the best clique, in the order it happened.
    pub improvements: Vec<usize>,
}

impl SearchStats {
    fn merge(&mut self, other: SearchStats) {
        self.nodes += other.nodes;
        self.leaves += other.leaves;
        self.pruned_by_degree += other.pruned_by_degree;
        self.pruned_by_candidates += other.pruned_by_candidates;
        self.improvements.extend(other.improvements);
    }
}

#[derive(Clone, Debug)]
pub struct SearchOutcome {
    pub clique: Clique,
    pub status: SearchStatus,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

/// How a call of `Search::search` ended.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Exit {
    Exhausted,
    Cancelled,
}

enum Entry {
    Cancelled,
    Leaf,
    Branch(Vec<usize>),
}

/// Finds a maximum clique of `g` with default parameters and no time limit.
pub fn max_clique(g: &Graph) -> Result<Clique, GraphError> {
    let best = BestCliqueTracker::new();
    let outcome = find_max_clique(g, &Parameters::default(), &best, &Deadline::never())?;
    Ok(outcome.clique)
}

/// Runs the branch-and-bound search on `g`, improving on whatever `best` already holds.
///
/// The search stops early once `deadline` expires; the outcome then carries the best clique found
/// up to that point together with the reason for stopping.
pub fn find_max_clique(
    g: &Graph,
    params: &Parameters,
    best: &BestCliqueTracker,
    deadline: &Deadline,
) -> Result<SearchOutcome, GraphError> {
    info!(
        "Starting search on graph with {} nodes and {} edges, initial best size {}, time limit {:?}.",
        g.node_count(),
        g.edge_count(),
        best.size(),
        deadline.time_limit()
    );

    let mut search = Search::new(params, best, deadline);
    let candidates: Vec<usize> = g.nodes().collect();

    let exit = if params.threads > 1 {
        search.search_parallel(&candidates, g)?
    } else {
        search.search(&Clique::default(), &candidates, g)?
    };

    let status = match exit {
        Exit::Exhausted => SearchStatus::Exact,
        Exit::Cancelled => SearchStatus::from_reason(deadline.reason()),
    };

    let outcome = SearchOutcome {
        clique: (*best.current_best()).clone(),
        status,
        stats: search.stats,
        elapsed: deadline.elapsed(),
    };

    info!(
        "Search finished ({:?}) after {:?} and {} deadline polls: clique of size {}, {} nodes, {} leaves, pruned {} by degree and {} by candidates.",
        outcome.status,
        outcome.elapsed,
        deadline.polls(),
        outcome.clique.len(),
        outcome.stats.nodes,
        outcome.stats.leaves,
        outcome.stats.pruned_by_degree,
        outcome.stats.pruned_by_candidates,
    );

    Ok(outcome)
}

struct Search<'a> {
    params: &'a Parameters,
    best: &'a BestCliqueTracker,
    deadline: &'a Deadline,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    fn new(params: &'a Parameters, best: &'a BestCliqueTracker, deadline: &'a Deadline) -> Self {
        Search {
            params,
            best,
            deadline,
            stats: SearchStats::default(),
        }
    }

    /// Extends `clique` by the vertices in `candidates`, which index into `g`.
    fn search(
        &mut self,
        clique: &Clique,
        candidates: &[usize],
        g: &Graph,
    ) -> Result<Exit, GraphError> {
        let order = match self.enter(clique, candidates, g)? {
            Entry::Branch(order) => order,
            Entry::Leaf => return Ok(Exit::Exhausted),
            Entry::Cancelled => return Ok(Exit::Cancelled),
        };

        self.explore(clique, &order, candidates, g)
    }

    /// Branches on the vertices of `order` one after another.
    fn explore(
        &mut self,
        clique: &Clique,
        order: &[usize],
        candidates: &[usize],
        g: &Graph,
    ) -> Result<Exit, GraphError> {
        let mut eligible = vec![false; g.node_count()];
        for &v in candidates {
            eligible[v] = true;
        }

        for &v in order {
            if self.branch(clique, v, &eligible, g)? == Exit::Cancelled {
                return Ok(Exit::Cancelled);
            }

            if self.params.exclude_explored {
                eligible[v] = false;
            }
        }

        Ok(Exit::Exhausted)
    }

    /// Common entry of every search node: checks the deadline, handles leaves and otherwise
    /// determines the branching order.
    fn enter(
        &mut self,
        clique: &Clique,
        candidates: &[usize],
        g: &Graph,
    ) -> Result<Entry, GraphError> {
        if self.deadline.expired() {
            dbg_trace_indent!(clique.len(), "Deadline expired, unwinding");
            return Ok(Entry::Cancelled);
        }
        self.stats.nodes += 1;

        if candidates.is_empty() {
            self.stats.leaves += 1;
            if clique.len() > self.best.size() && self.best.try_update(clique.clone()) {
                dbg_trace_indent!(clique.len(), "New best clique {:?}", clique.vertices);
                self.stats.improvements.push(clique.len());
            }
            return Ok(Entry::Leaf);
        }

        Ok(Entry::Branch(branching_order(g, candidates)?))
    }

    /// Tries to extend `clique` by `v` and searches the resulting subtree, unless one of the bounds
    /// shows that it cannot contain a clique larger than the best one.
    fn branch(
        &mut self,
        clique: &Clique,
        v: usize,
        eligible: &[bool],
        g: &Graph,
    ) -> Result<Exit, GraphError> {
        if self.params.bounds
            && bound::is_pruned(bound::degree_bound(g, v, clique.len())?, self.best.size())
        {
            self.stats.pruned_by_degree += 1;
            return Ok(Exit::Exhausted);
        }

        let new_candidates: Vec<usize> = g.neighbors(v)?.filter(|&u| eligible[u]).collect();

        if self.params.bounds
            && bound::is_pruned(
                bound::candidate_bound(new_candidates.len(), clique.len()),
                self.best.size(),
            )
        {
            self.stats.pruned_by_candidates += 1;
            return Ok(Exit::Exhausted);
        }

        let label = g.label(v)?;
        dbg_trace_indent!(
            clique.len(),
            "Branch: add {}, {} candidates left",
            label,
            new_candidates.len()
        );

        let new_clique = clique.with(label);
        let new_g = g.induce(&new_candidates)?;
        // The induced graph is renumbered, `new_candidates[i]` is now vertex `i`.
        let child_candidates: Vec<usize> = new_g.nodes().collect();

        self.search(&new_clique, &child_candidates, &new_g)
    }

    /// Same as `search` on the whole graph, but explores the top-level branches in parallel. Every
    /// branch gets its own `Search` and only shares the tracker and the deadline.
    fn search_parallel(&mut self, candidates: &[usize], g: &Graph) -> Result<Exit, GraphError> {
        let root = Clique::default();
        let order = match self.enter(&root, candidates, g)? {
            Entry::Branch(order) => order,
            Entry::Leaf => return Ok(Exit::Exhausted),
            Entry::Cancelled => return Ok(Exit::Cancelled),
        };

        let pool = match rayon::ThreadPoolBuilder::new()
            .num_threads(self.params.threads)
            .build()
        {
            Ok(pool) => pool,
            Err(e) => {
                warn!("Could not start thread pool ({}), searching sequentially.", e);
                return self.explore(&root, &order, candidates, g);
            }
        };

        let params = self.params;
        let best = self.best;
        let deadline = self.deadline;
        let exclude = params.exclude_explored;

        let results = pool.install(|| {
            order
                .par_iter()
                .enumerate()
                .map(|(i, &v)| {
                    let mut eligible = vec![false; g.node_count()];
                    for &u in candidates {
                        eligible[u] = true;
                    }
                    if exclude {
                        for &u in &order[..i] {
                            eligible[u] = false;
                        }
                    }

                    let mut search = Search::new(params, best, deadline);
                    let exit = search.branch(&root, v, &eligible, g)?;
                    Ok::<_, GraphError>((exit, search.stats))
                })
                .collect::<Result<Vec<_>, GraphError>>()
        })?;

        let mut exit = Exit::Exhausted;
        for (e, stats) in results {
            if e == Exit::Cancelled {
                exit = Exit::Cancelled;
            }
            self.stats.merge(stats);
        }

        Ok(exit)
    }
}

/// Candidates sorted by ascending degree in `g`, ties broken by ascending label.
fn branching_order(g: &Graph, candidates: &[usize]) -> Result<Vec<usize>, GraphError> {
    let mut keyed = candidates
        .iter()
        .map(|&v| Ok::<_, GraphError>((g.degree(v)?, g.label(v)?, v)))
        .collect::<Result<Vec<_>, GraphError>>()?;
    keyed.sort_unstable();
    Ok(keyed.into_iter().map(|(_, _, v)| v).collect())
}
