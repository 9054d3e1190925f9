use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Why a `Deadline` stopped the search.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StopReason {
    TimedOut,
    NodeLimit,
    Cancelled,
}

impl StopReason {
    fn to_u8(self) -> u8 {
        match self {
            Self::TimedOut => 1,
            Self::NodeLimit => 2,
            Self::Cancelled => 3,
        }
    }

    fn from_u8(v: u8) -> Option<Self> {
        match v {
            1 => Some(Self::TimedOut),
            2 => Some(Self::NodeLimit),
            3 => Some(Self::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Inner {
    start: Instant,
    time_limit: Option<Duration>,
    node_limit: Option<u64>,
    polls: AtomicU64,
    cancelled: AtomicBool,
    /// Latched stop reason, 0 while the search may continue.
    reason: AtomicU8,
}

/// Cooperative cancellation token with an optional time budget and an optional budget on the
/// number of search nodes.
///
/// The search polls `expired()` once at the top of every recursive call. Clones share their state,
/// so any clone can be handed to another thread to `cancel()` the search. Once expired, a deadline
/// stays expired.
#[derive(Clone, Debug)]
pub struct Deadline {
    inner: Arc<Inner>,
}

impl Deadline {
    /// A deadline that never expires on its own. It can still be cancelled.
    pub fn never() -> Self {
        Self::new(None)
    }

    pub fn after(limit: Duration) -> Self {
        Self::new(Some(limit))
    }

    pub fn new(time_limit: Option<Duration>) -> Self {
        Deadline {
            inner: Arc::new(Inner {
                start: Instant::now(),
                time_limit,
                node_limit: None,
                polls: AtomicU64::new(0),
                cancelled: AtomicBool::new(false),
                reason: AtomicU8::new(0),
            }),
        }
    }

    /// Limits the search to `nodes` polls: the poll numbered `nodes + 1` (and every later one)
    /// reports expiry. Must be called before the deadline is shared.
    pub fn with_node_limit(self, nodes: u64) -> Self {
        let inner = match Arc::try_unwrap(self.inner) {
            Ok(inner) => inner,
            Err(shared) => Inner {
                start: shared.start,
                time_limit: shared.time_limit,
                node_limit: None,
                polls: AtomicU64::new(shared.polls.load(Ordering::Relaxed)),
                cancelled: AtomicBool::new(shared.cancelled.load(Ordering::Relaxed)),
                reason: AtomicU8::new(shared.reason.load(Ordering::Relaxed)),
            },
        };

        Deadline {
            inner: Arc::new(Inner {
                node_limit: Some(nodes),
                ..inner
            }),
        }
    }

    /// Requests the search to stop at its next poll.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Relaxed);
    }

    /// Counts one poll and reports whether the search has to unwind.
    pub fn expired(&self) -> bool {
        let inner = &*self.inner;
        if inner.reason.load(Ordering::Relaxed) != 0 {
            return true;
        }

        let polls = inner.polls.fetch_add(1, Ordering::Relaxed) + 1;

        let reason = if inner.cancelled.load(Ordering::Relaxed) {
            Some(StopReason::Cancelled)
        } else if inner.node_limit.map(|n| polls > n).unwrap_or(false) {
            Some(StopReason::NodeLimit)
        } else if inner
            .time_limit
            .map(|t| inner.start.elapsed() >= t)
            .unwrap_or(false)
        {
            Some(StopReason::TimedOut)
        } else {
            None
        };

        match reason {
            Some(r) => {
                // Keep whichever reason was latched first.
                let _ = inner.reason.compare_exchange(
                    0,
                    r.to_u8(),
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                );
                true
            }
            None => false,
        }
    }

    /// The reason the deadline expired, or `None` if it has not (yet) been observed to expire.
    pub fn reason(&self) -> Option<StopReason> {
        StopReason::from_u8(self.inner.reason.load(Ordering::Relaxed))
    }

    pub fn polls(&self) -> u64 {
        self.inner.polls.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.inner.start.elapsed()
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.inner.time_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn never_expires_unless_cancelled() {
        let d = Deadline::never();
        for _ in 0..1000 {
            assert!(!d.expired());
        }
        assert_eq!(d.reason(), None);
        assert_eq!(d.polls(), 1000);

        let other = d.clone();
        other.cancel();
        assert!(d.expired());
        assert_eq!(d.reason(), Some(StopReason::Cancelled));
    }

    #[test]
    fn zero_time_limit_expires_immediately() {
        let d = Deadline::after(Duration::from_secs(0));
        assert_eq!(d.time_limit(), Some(Duration::from_secs(0)));
        assert!(d.expired());
        assert_eq!(d.reason(), Some(StopReason::TimedOut));
    }

    #[test]
    fn cancel_from_another_thread() {
        let d = Deadline::new(Some(Duration::from_secs(3600)));
        assert!(!d.expired());

        let interrupt = d.clone();
        std::thread::spawn(move || interrupt.cancel())
            .join()
            .unwrap();

        assert!(d.expired());
        assert_eq!(d.reason(), Some(StopReason::Cancelled));
        assert_eq!(d.polls(), 2);
    }

    #[test]
    fn node_limit_latches() {
        let d = Deadline::never().with_node_limit(3);
        assert!(!d.expired());
        assert!(!d.expired());
        assert!(!d.expired());
        assert!(d.expired());
        assert_eq!(d.reason(), Some(StopReason::NodeLimit));

        // Cancelling afterwards does not change the latched reason.
        d.cancel();
        assert!(d.expired());
        assert_eq!(d.reason(), Some(StopReason::NodeLimit));
    }

    #[test]
    fn node_limit_on_shared_deadline() {
        let d = Deadline::never();
        let _clone = d.clone();
        let limited = d.with_node_limit(0);
        assert!(limited.expired());
        assert_eq!(limited.reason(), Some(StopReason::NodeLimit));
    }
}
