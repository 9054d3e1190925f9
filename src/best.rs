use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use log::info;

/// A set of vertices, identified by their labels, in the order they were added.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Clique {
    pub vertices: Vec<usize>,
}

impl Clique {
    pub fn new(vertices: Vec<usize>) -> Self {
        Clique { vertices }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns a new clique extended by `v`, leaving `self` untouched.
    pub fn with(&self, v: usize) -> Clique {
        let mut vertices = Vec::with_capacity(self.vertices.len() + 1);
        vertices.extend_from_slice(&self.vertices);
        vertices.push(v);
        Clique { vertices }
    }

    pub fn sorted(&self) -> Vec<usize> {
        let mut v = self.vertices.clone();
        v.sort_unstable();
        v
    }
}

/// Holds the largest clique found so far.
///
/// The held clique is only ever replaced by a strictly larger one, so its size never decreases.
/// Replacement swaps in a new `Arc`, so a reader always sees either the old or the new clique, both
/// fully constructed. The tracker can be shared between threads.
#[derive(Debug, Default)]
pub struct BestCliqueTracker {
    best: Mutex<Arc<Clique>>,
    size: AtomicUsize,
}

impl BestCliqueTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracker that already holds `seed`, e.g. a heuristic solution.
    pub fn with_seed(seed: Clique) -> Self {
        BestCliqueTracker {
            size: AtomicUsize::new(seed.len()),
            best: Mutex::new(Arc::new(seed)),
        }
    }

    /// Size of the currently held clique. Cheaper than `current_best`.
    pub fn size(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    pub fn current_best(&self) -> Arc<Clique> {
        self.best
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the held clique with `candidate` iff `candidate` is strictly larger. Returns whether
    /// the replacement happened.
    pub fn try_update(&self, candidate: Clique) -> bool {
        if candidate.len() <= self.size() {
            return false;
        }

        let mut best = self.best.lock().unwrap_or_else(PoisonError::into_inner);
        if candidate.len() <= best.len() {
            return false;
        }

        let new_size = candidate.len();
        *best = Arc::new(candidate);
        self.size.store(new_size, Ordering::Release);

        info!("Improved best clique to size {}", new_size);
        true
    }

    pub fn into_inner(self) -> Arc<Clique> {
        self.best
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_strictly_larger_replaces() {
        let t = BestCliqueTracker::new();
        assert_eq!(t.size(), 0);
        assert!(t.current_best().is_empty());

        assert!(t.try_update(Clique::new(vec![1, 2])));
        assert_eq!(t.size(), 2);

        // Ties and smaller cliques are rejected.
        assert!(!t.try_update(Clique::new(vec![3, 4])));
        assert!(!t.try_update(Clique::new(vec![5])));
        assert_eq!(t.current_best().vertices, vec![1, 2]);

        assert!(t.try_update(Clique::new(vec![3, 4, 5])));
        assert_eq!(t.into_inner().vertices, vec![3, 4, 5]);
    }

    #[test]
    fn snapshots_are_not_affected_by_updates() {
        let t = BestCliqueTracker::with_seed(Clique::new(vec![7]));
        let snapshot = t.current_best();
        assert!(t.try_update(Clique::new(vec![1, 2])));
        assert_eq!(snapshot.vertices, vec![7]);
        assert_eq!(t.current_best().vertices, vec![1, 2]);
    }

    #[test]
    fn concurrent_updates_keep_the_largest() {
        let t = BestCliqueTracker::new();
        std::thread::scope(|s| {
            for n in 1..=8 {
                let t = &t;
                s.spawn(move || {
                    t.try_update(Clique::new((0..n).collect()));
                });
            }
        });
        assert_eq!(t.size(), 8);
        assert_eq!(t.current_best().len(), 8);
    }

    #[test]
    fn extending_copies() {
        let c = Clique::new(vec![3, 1]);
        let d = c.with(2);
        assert_eq!(c.vertices, vec![3, 1]);
        assert_eq!(d.vertices, vec![3, 1, 2]);
        assert_eq!(d.sorted(), vec![1, 2, 3]);
    }
}
