//! Single-flight coordination of credential refreshes
//!
//! Every request that observes a 401 asks the coordinator for a
//! [`RefreshTicket`]. Exactly one caller at a time is handed the
//! [`RefreshLeader`] role and performs the network refresh; everyone else
//! queues behind it as a [`RefreshWaiter`] and is released with the leader's
//! outcome, in enqueue order.
//!
//! State transitions:
//!
//! ```text
//!   Idle ──ticket()──▶ Refreshing ──complete(Refreshed)──▶ Idle (generation + 1)
//!                          │
//!                          ├──complete(Failed)──▶ Idle
//!                          └──leader dropped──▶ Idle (waiters see Abandoned)
//! ```
//!
//! The phase flip and the 401 check happen inside one critical section, so
//! two callers can never both become leader. The lock is never held across
//! an `.await`.
//!
//! Tearing the session down advances a separate epoch. A refresh that was
//! started under an older epoch can no longer install credentials, so a
//! logout racing an in-flight refresh always wins.

use std::collections::VecDeque;
use std::fmt;

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Result of a refresh attempt, broadcast to every waiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// New credentials are in place; retry the original call once
    Refreshed,
    /// The session is dead; surface "session expired"
    Failed,
    /// The leader went away without finishing; claim a fresh ticket
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Refreshing,
}

/// Credential generation a request was sent under.
///
/// Bumped every time credentials are replaced (successful refresh or a new
/// login), which lets a late 401 from a request that used the previous
/// credential retry without starting another refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

struct RefreshState {
    phase: RefreshPhase,
    waiters: VecDeque<oneshot::Sender<RefreshOutcome>>,
    generation: u64,
    epoch: u64,
}

/// Per-client refresh state. Independent clients never share one.
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

/// What a caller that observed a 401 should do next
pub enum RefreshTicket<'a> {
    /// Credentials were replaced after the request was sent; retry directly
    AlreadyRefreshed,
    /// Perform the refresh and report the outcome through the leader
    Leader(RefreshLeader<'a>),
    /// Another caller is refreshing; await its outcome
    Follower(RefreshWaiter),
}

impl fmt::Debug for RefreshTicket<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRefreshed => f.write_str("AlreadyRefreshed"),
            Self::Leader(_) => f.write_str("Leader"),
            Self::Follower(_) => f.write_str("Follower"),
        }
    }
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(RefreshState {
                phase: RefreshPhase::Idle,
                waiters: VecDeque::new(),
                generation: 0,
                epoch: 0,
            }),
        }
    }

    /// Generation to record before sending a request
    pub fn generation(&self) -> Generation {
        Generation(self.state.lock().generation)
    }

    pub fn phase(&self) -> RefreshPhase {
        self.state.lock().phase
    }

    /// Number of callers currently queued behind the leader
    pub fn waiting(&self) -> usize {
        self.state.lock().waiters.len()
    }

    /// Claim a ticket after a request sent under `observed` got a 401.
    pub fn ticket(&self, observed: Generation) -> RefreshTicket<'_> {
        let mut state = self.state.lock();

        if state.generation > observed.0 {
            debug!(
                observed = observed.0,
                current = state.generation,
                "credentials replaced since request was sent"
            );
            return RefreshTicket::AlreadyRefreshed;
        }

        self.claim(&mut state)
    }

    /// Claim a ticket for an explicit refresh (no request to compare against).
    ///
    /// Never returns [`RefreshTicket::AlreadyRefreshed`].
    pub fn begin(&self) -> RefreshTicket<'_> {
        let mut state = self.state.lock();
        self.claim(&mut state)
    }

    /// Record that credentials were replaced outside a refresh (login).
    pub fn credentials_replaced(&self) {
        let mut state = self.state.lock();
        state.generation += 1;
    }

    /// Tear the session down, invalidating any refresh in flight.
    ///
    /// `clear` runs under the coordinator lock, so it can not interleave with
    /// a leader installing refreshed credentials. It must not call back into
    /// the coordinator.
    pub fn end_session<F: FnOnce()>(&self, clear: F) {
        let mut state = self.state.lock();
        state.epoch += 1;
        clear();
        debug!(epoch = state.epoch, "session ended");
    }

    fn claim(&self, state: &mut RefreshState) -> RefreshTicket<'_> {
        match state.phase {
            RefreshPhase::Idle => {
                state.phase = RefreshPhase::Refreshing;
                debug!(generation = state.generation, "refresh started");
                RefreshTicket::Leader(RefreshLeader {
                    coordinator: self,
                    epoch: state.epoch,
                    resolved: false,
                })
            }
            RefreshPhase::Refreshing => {
                let (tx, rx) = oneshot::channel();
                state.waiters.push_back(tx);
                debug!(waiting = state.waiters.len(), "joined in-flight refresh");
                RefreshTicket::Follower(RefreshWaiter { rx })
            }
        }
    }

    fn resolve(&self, outcome: RefreshOutcome) -> usize {
        let waiters = {
            let mut state = self.state.lock();
            state.phase = RefreshPhase::Idle;
            if outcome == RefreshOutcome::Refreshed {
                state.generation += 1;
            }
            std::mem::take(&mut state.waiters)
        };

        let released = waiters.len();
        for waiter in waiters {
            // A waiter whose caller went away is not an error
            let _ = waiter.send(outcome);
        }

        debug!(?outcome, released, "refresh resolved");
        released
    }
}

impl Default for RefreshCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

/// Exclusive right to perform the in-flight refresh.
///
/// Dropping the leader without calling [`RefreshLeader::complete`] releases
/// every waiter with [`RefreshOutcome::Abandoned`], so no caller is left
/// pending and one of them can take over the refresh.
pub struct RefreshLeader<'a> {
    coordinator: &'a RefreshCoordinator,
    epoch: u64,
    resolved: bool,
}

impl RefreshLeader<'_> {
    /// Whether the session this refresh started under is still alive
    pub fn is_current(&self) -> bool {
        self.coordinator.state.lock().epoch == self.epoch
    }

    /// Install refreshed credentials via `apply` unless the session was torn
    /// down since this refresh started.
    ///
    /// `apply` runs under the coordinator lock and must not call back into
    /// the coordinator. Returns `None` when the refresh is stale.
    pub fn commit<R>(&self, apply: impl FnOnce() -> R) -> Option<R> {
        let state = self.coordinator.state.lock();
        if state.epoch != self.epoch {
            debug!(started = self.epoch, current = state.epoch, "discarding stale refresh");
            return None;
        }
        Some(apply())
    }

    /// Tear the session down after this refresh failed, unless it already
    /// ended some other way. Returns whether `clear` ran.
    pub fn end_session<F: FnOnce()>(&self, clear: F) -> bool {
        let mut state = self.coordinator.state.lock();
        if state.epoch != self.epoch {
            return false;
        }
        state.epoch += 1;
        clear();
        true
    }

    /// Return to `Idle` and release all waiters with `outcome`.
    ///
    /// Returns the number of waiters released.
    pub fn complete(mut self, outcome: RefreshOutcome) -> usize {
        self.resolved = true;
        self.coordinator.resolve(outcome)
    }
}

impl Drop for RefreshLeader<'_> {
    fn drop(&mut self) {
        if !self.resolved {
            warn!("refresh abandoned before completion; releasing queued callers");
            self.coordinator.resolve(RefreshOutcome::Abandoned);
        }
    }
}

/// Suspended caller queued behind the leader
pub struct RefreshWaiter {
    rx: oneshot::Receiver<RefreshOutcome>,
}

impl RefreshWaiter {
    /// Wait for the leader.
    ///
    /// [`RefreshOutcome::Abandoned`] means nobody finished the refresh; the
    /// caller should ask for a new ticket rather than report an expiry.
    pub async fn outcome(self) -> RefreshOutcome {
        self.rx.await.unwrap_or(RefreshOutcome::Abandoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_leader(ticket: RefreshTicket<'_>) -> RefreshLeader<'_> {
        match ticket {
            RefreshTicket::Leader(leader) => leader,
            other => panic!("expected leader, got {other:?}"),
        }
    }

    fn expect_follower(ticket: RefreshTicket<'_>) -> RefreshWaiter {
        match ticket {
            RefreshTicket::Follower(waiter) => waiter,
            other => panic!("expected follower, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn first_caller_leads_and_later_callers_follow() {
        let coordinator = RefreshCoordinator::new();
        let observed = coordinator.generation();

        let leader = expect_leader(coordinator.ticket(observed));
        assert_eq!(coordinator.phase(), RefreshPhase::Refreshing);

        let first = expect_follower(coordinator.ticket(observed));
        let second = expect_follower(coordinator.ticket(observed));
        assert_eq!(coordinator.waiting(), 2);

        assert_eq!(leader.complete(RefreshOutcome::Refreshed), 2);
        assert_eq!(first.outcome().await, RefreshOutcome::Refreshed);
        assert_eq!(second.outcome().await, RefreshOutcome::Refreshed);
        assert_eq!(coordinator.phase(), RefreshPhase::Idle);
        assert_eq!(coordinator.waiting(), 0);
    }

    #[tokio::test]
    async fn failed_refresh_fails_every_waiter() {
        let coordinator = RefreshCoordinator::new();
        let observed = coordinator.generation();

        let leader = expect_leader(coordinator.ticket(observed));
        let waiters: Vec<_> =
            (0..5).map(|_| expect_follower(coordinator.ticket(observed))).collect();

        leader.complete(RefreshOutcome::Failed);

        let outcomes = futures::future::join_all(waiters.into_iter().map(|w| w.outcome())).await;
        assert!(outcomes.iter().all(|o| *o == RefreshOutcome::Failed));
        // Failure does not advance the generation
        assert_eq!(coordinator.generation(), observed);
    }

    #[tokio::test]
    async fn dropped_leader_lets_a_waiter_take_over() {
        let coordinator = RefreshCoordinator::new();
        let observed = coordinator.generation();

        let leader = expect_leader(coordinator.ticket(observed));
        let waiter = expect_follower(coordinator.ticket(observed));

        drop(leader);

        assert_eq!(waiter.outcome().await, RefreshOutcome::Abandoned);
        assert_eq!(coordinator.phase(), RefreshPhase::Idle);
        // Nothing was refreshed, so the same generation claims leadership again
        assert_eq!(coordinator.generation(), observed);
        let next = expect_leader(coordinator.ticket(observed));
        next.complete(RefreshOutcome::Refreshed);
    }

    #[test]
    fn teardown_invalidates_in_flight_refresh() {
        let coordinator = RefreshCoordinator::new();
        let leader = expect_leader(coordinator.begin());
        assert!(leader.is_current());

        let mut cleared = false;
        coordinator.end_session(|| cleared = true);
        assert!(cleared);

        assert!(!leader.is_current());
        assert_eq!(leader.commit(|| "installed"), None);
        assert!(!leader.end_session(|| panic!("already torn down")));
        leader.complete(RefreshOutcome::Failed);
    }

    #[test]
    fn current_leader_commits_and_tears_down() {
        let coordinator = RefreshCoordinator::new();

        let leader = expect_leader(coordinator.begin());
        assert_eq!(leader.commit(|| 7), Some(7));
        leader.complete(RefreshOutcome::Refreshed);

        let leader = expect_leader(coordinator.begin());
        assert!(leader.end_session(|| ()));
        // Only one teardown per session
        assert!(!leader.end_session(|| ()));
        leader.complete(RefreshOutcome::Failed);
    }

    #[test]
    fn stale_generation_skips_refresh() {
        let coordinator = RefreshCoordinator::new();
        let sent_under = coordinator.generation();

        let leader = expect_leader(coordinator.ticket(sent_under));
        leader.complete(RefreshOutcome::Refreshed);

        assert!(coordinator.generation() > sent_under);
        assert!(matches!(coordinator.ticket(sent_under), RefreshTicket::AlreadyRefreshed));
        assert_eq!(coordinator.phase(), RefreshPhase::Idle);
    }

    #[test]
    fn login_bumps_generation() {
        let coordinator = RefreshCoordinator::new();
        let before = coordinator.generation();

        coordinator.credentials_replaced();

        assert!(matches!(coordinator.ticket(before), RefreshTicket::AlreadyRefreshed));
    }

    #[test]
    fn begin_ignores_generation() {
        let coordinator = RefreshCoordinator::new();
        coordinator.credentials_replaced();

        let leader = expect_leader(coordinator.begin());
        assert!(matches!(coordinator.begin(), RefreshTicket::Follower(_)));
        leader.complete(RefreshOutcome::Refreshed);
    }

    #[tokio::test]
    async fn waiters_are_released_in_enqueue_order() {
        let coordinator = RefreshCoordinator::new();
        let observed = coordinator.generation();
        let leader = expect_leader(coordinator.ticket(observed));

        let order = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
        let mut handles = Vec::new();
        for id in 0..3 {
            let waiter = expect_follower(coordinator.ticket(observed));
            let order = order.clone();
            handles.push(async move {
                waiter.outcome().await;
                order.lock().push(id);
            });
        }

        leader.complete(RefreshOutcome::Refreshed);
        futures::future::join_all(handles).await;

        assert_eq!(*order.lock(), vec![0, 1, 2]);
    }
}
