//! Timer-based event coalescing.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::Instant;

/// Delay applied to search input.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Which edges of a burst fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceEdges {
    /// Fire the first event of a burst immediately.
    pub leading: bool,
    /// Fire the last event of a burst once the delay elapses uninterrupted.
    pub trailing: bool,
}

impl DebounceEdges {
    pub const LEADING: Self = Self {
        leading: true,
        trailing: false,
    };
    pub const TRAILING: Self = Self {
        leading: false,
        trailing: true,
    };
    pub const BOTH: Self = Self {
        leading: true,
        trailing: true,
    };
}

impl Default for DebounceEdges {
    fn default() -> Self {
        Self::BOTH
    }
}

/// Debounce state machine, free of any timer.
///
/// Every [`push`](Self::push) (re)opens a window of `delay`. The caller
/// sleeps until [`deadline`](Self::deadline) and then calls
/// [`expire`](Self::expire) to collect the trailing event.
#[derive(Debug)]
pub struct Debounce<T> {
    delay: Duration,
    edges: DebounceEdges,
    deadline: Option<Instant>,
    pending: Option<T>,
}

impl<T> Debounce<T> {
    #[must_use]
    pub const fn new(delay: Duration, edges: DebounceEdges) -> Self {
        Self {
            delay,
            edges,
            deadline: None,
            pending: None,
        }
    }

    /// Record an event at `now`.
    ///
    /// Returns the event itself when it opens a new burst and the leading
    /// edge is enabled; otherwise it becomes the pending trailing event,
    /// replacing any earlier one.
    pub fn push(&mut self, value: T, now: Instant) -> Option<T> {
        let window_open = self.deadline.is_some_and(|deadline| now < deadline);
        self.deadline = Some(now + self.delay);

        if !window_open && self.edges.leading {
            self.pending = None;
            return Some(value);
        }
        if self.edges.trailing {
            self.pending = Some(value);
        }
        None
    }

    /// When the current window closes, if one is open.
    #[must_use]
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether an event is waiting for the trailing edge.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Close the window if its deadline has passed, returning the trailing
    /// event.
    pub fn expire(&mut self, now: Instant) -> Option<T> {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                self.pending.take()
            }
            _ => None,
        }
    }

    /// Close the window immediately, returning the trailing event.
    pub fn flush(&mut self) -> Option<T> {
        self.deadline = None;
        self.pending.take()
    }
}

/// Debounce a channel of events.
///
/// Spawns a task forwarding fired events to the returned receiver. When the
/// input closes, a pending trailing event is flushed and the output closes.
#[must_use]
pub fn debounced<T: Send + 'static>(
    mut input: mpsc::Receiver<T>,
    delay: Duration,
    edges: DebounceEdges,
) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(16);

    tokio::spawn(async move {
        let mut state = Debounce::new(delay, edges);
        loop {
            let fired = tokio::select! {
                received = input.recv() => match received {
                    Some(value) => state.push(value, Instant::now()),
                    None => {
                        if let Some(value) = state.flush() {
                            let _ = tx.send(value).await;
                        }
                        return;
                    }
                },
                () = sleep_until(state.deadline()) => state.expire(Instant::now()),
            };

            if let Some(value) = fired
                && tx.send(value).await.is_err()
            {
                return;
            }
        }
    });

    rx
}

/// Sleep until `deadline`, or forever when there is none.
pub(super) async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
