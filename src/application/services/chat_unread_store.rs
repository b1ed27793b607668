//! Shared, self-refreshing cache of chat unread state.
//!
//! One store serves every view that shows unread counts. It keeps the last
//! committed [`UnreadSnapshot`], polls the chat API while anyone is
//! subscribed, folds concurrent refreshes into one request, and uses request
//! sequence numbers so a slow response never overwrites a newer one.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use chrono::Utc;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::{Mutex, ReentrantMutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, error, trace, warn};

use super::refresh_trigger::RefreshTrigger;
use crate::domain::entities::{ChatSummary, UnreadSnapshot};
use crate::domain::errors::ChatError;
use crate::domain::ports::ChatPort;

/// Default polling cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Shared handle to a refresh. Clones resolve to the same snapshot.
pub type RefreshFuture = Shared<BoxFuture<'static, Arc<UnreadSnapshot>>>;

/// Options for [`ChatUnreadStore::refresh`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshOptions {
    /// Start a new request even if one is in flight, and show loading.
    pub force: bool,
}

impl RefreshOptions {
    /// Options for a forced refresh.
    #[must_use]
    pub const fn forced() -> Self {
        Self { force: true }
    }
}

type Listener = dyn Fn(&Arc<UnreadSnapshot>) + Send + Sync;

struct ListenerEntry {
    id: u64,
    active: AtomicBool,
    callback: Box<Listener>,
}

struct InFlight {
    seq: u64,
    future: RefreshFuture,
}

struct State {
    snapshot: Arc<UnreadSnapshot>,
    listeners: Vec<Arc<ListenerEntry>>,
    next_listener_id: u64,
    poll_interval: Duration,
    activity: Option<JoinHandle<()>>,
    in_flight: Option<InFlight>,
    pending: usize,
    last_issued: u64,
    last_committed: u64,
}

struct StoreInner {
    source: Arc<dyn ChatPort>,
    state: Mutex<State>,
    // Serializes commits with their delivery so listeners see them in order.
    delivery: ReentrantMutex<()>,
    trigger: RefreshTrigger,
    server_snapshot: Arc<UnreadSnapshot>,
}

/// Observable cache of unread chats, refreshed on a timer.
///
/// Cloning is cheap; clones share one cache. Refreshes run as Tokio tasks,
/// so [`subscribe`](Self::subscribe) and [`refresh`](Self::refresh) must be
/// called from within a Tokio runtime.
#[derive(Clone)]
pub struct ChatUnreadStore {
    inner: Arc<StoreInner>,
}

impl ChatUnreadStore {
    /// Creates an idle store with an empty snapshot and the default interval.
    #[must_use]
    pub fn new(source: Arc<dyn ChatPort>) -> Self {
        Self::with_poll_interval(source, DEFAULT_POLL_INTERVAL)
    }

    /// Creates an idle store polling every `poll_interval` once active.
    /// A zero interval disables timed polling.
    #[must_use]
    pub fn with_poll_interval(source: Arc<dyn ChatPort>, poll_interval: Duration) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                source,
                state: Mutex::new(State {
                    snapshot: Arc::new(UnreadSnapshot::empty()),
                    listeners: Vec::new(),
                    next_listener_id: 0,
                    poll_interval,
                    activity: None,
                    in_flight: None,
                    pending: 0,
                    last_issued: 0,
                    last_committed: 0,
                }),
                delivery: ReentrantMutex::new(()),
                trigger: RefreshTrigger::new(),
                server_snapshot: Arc::new(UnreadSnapshot::empty()),
            }),
        }
    }

    /// Current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<UnreadSnapshot> {
        Arc::clone(&self.inner.state.lock().snapshot)
    }

    /// Placeholder for renders that happen before any client-side refresh.
    ///
    /// Always the same allocation, never mutated.
    #[must_use]
    pub fn server_snapshot(&self) -> Arc<UnreadSnapshot> {
        Arc::clone(&self.inner.server_snapshot)
    }

    /// Registers `listener` for committed snapshots.
    ///
    /// The first subscriber activates the store: polling starts and a
    /// loading refresh is issued. Dropping the returned [`Subscription`]
    /// unsubscribes.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Arc<UnreadSnapshot>) + Send + Sync + 'static,
    {
        let (id, first) = {
            let mut state = self.inner.state.lock();
            state.next_listener_id += 1;
            let id = state.next_listener_id;
            state.listeners.push(Arc::new(ListenerEntry {
                id,
                active: AtomicBool::new(true),
                callback: Box::new(listener),
            }));
            (id, state.listeners.len() == 1)
        };

        debug!(listener = id, "Unread store subscriber added");

        if first {
            self.inner.activate();
        }

        Subscription {
            store: Arc::downgrade(&self.inner),
            id,
            unsubscribed: AtomicBool::new(false),
        }
    }

    /// Changes the polling cadence. Zero disables timed polling.
    ///
    /// While active, the pending timer is replaced by one using the new
    /// interval.
    pub fn set_poll_interval(&self, poll_interval: Duration) {
        let mut state = self.inner.state.lock();
        if state.poll_interval == poll_interval {
            return;
        }

        debug!(
            from_ms = state.poll_interval.as_millis(),
            to_ms = poll_interval.as_millis(),
            "Unread poll interval changed"
        );
        state.poll_interval = poll_interval;

        if let Some(handle) = state.activity.take() {
            handle.abort();
            state.activity = Some(spawn_activity(&self.inner, poll_interval));
        }
    }

    /// Current polling cadence.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        self.inner.state.lock().poll_interval
    }

    /// Requests a refresh.
    ///
    /// Without `force`, a refresh already in flight is returned instead of
    /// starting another. With `force`, a new request always starts. The
    /// request runs whether or not the future is awaited. The future never
    /// fails: it resolves to the snapshot current after the attempt, with
    /// any failure recorded in [`UnreadSnapshot::error`].
    pub fn refresh(&self, options: RefreshOptions) -> RefreshFuture {
        self.inner.start_refresh(options.force, options.force)
    }

    /// Handle other components use to request a refresh.
    #[must_use]
    pub fn trigger(&self) -> RefreshTrigger {
        self.inner.trigger.clone()
    }

    /// Whether the store has subscribers.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.state.lock().activity.is_some()
    }

    /// Whether a poll timer is running.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        let state = self.inner.state.lock();
        state.activity.is_some() && !state.poll_interval.is_zero()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.state.lock().listeners.len()
    }
}

impl std::fmt::Debug for ChatUnreadStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("ChatUnreadStore")
            .field("count", &state.snapshot.count)
            .field("subscribers", &state.listeners.len())
            .field("poll_interval", &state.poll_interval)
            .field("last_committed", &state.last_committed)
            .finish_non_exhaustive()
    }
}

impl StoreInner {
    fn activate(self: &Arc<Self>) {
        {
            let mut state = self.state.lock();
            if state.activity.is_none() {
                debug!(
                    interval_ms = state.poll_interval.as_millis(),
                    "Unread store active"
                );
                state.activity = Some(spawn_activity(self, state.poll_interval));
            }
        }

        let _initial = self.start_refresh(false, true);
    }

    /// Removes listener `id`. Idles the store when it was the last one.
    ///
    /// Waits for a delivery running on another thread, so the listener is
    /// never called after this returns. The listener check and the task
    /// teardown share one lock scope so a concurrent `subscribe` cannot
    /// lose its activity task.
    fn unsubscribe(&self, id: u64) {
        let _delivery = self.delivery.lock();
        let mut state = self.state.lock();

        state.listeners.retain(|entry| {
            if entry.id == id {
                entry.active.store(false, Ordering::SeqCst);
                false
            } else {
                true
            }
        });

        debug!(listener = id, "Unread store subscriber removed");

        if state.listeners.is_empty()
            && let Some(handle) = state.activity.take()
        {
            handle.abort();
            debug!("Unread store idle");
        }
    }

    fn start_refresh(self: &Arc<Self>, force: bool, show_loading: bool) -> RefreshFuture {
        let _delivery = self.delivery.lock();

        let (future, loading) = {
            let mut state = self.state.lock();

            if !force {
                if let Some(in_flight) = &state.in_flight {
                    trace!(seq = in_flight.seq, "Joining in-flight unread refresh");
                    return in_flight.future.clone();
                }
            }

            state.last_issued += 1;
            let seq = state.last_issued;
            state.pending += 1;

            let loading = if show_loading && !state.snapshot.is_loading {
                state.snapshot = Arc::new(state.snapshot.loading());
                Some(Arc::clone(&state.snapshot))
            } else {
                None
            };

            let inner = Arc::clone(self);
            let future = async move {
                let result = inner.source.list_my_chats().await;
                inner.complete(seq, result)
            }
            .boxed()
            .shared();

            state.in_flight = Some(InFlight {
                seq,
                future: future.clone(),
            });

            debug!(seq, force, "Unread refresh started");
            (future, loading)
        };

        if let Some(snapshot) = loading {
            self.notify(&snapshot);
        }

        tokio::spawn(future.clone());
        future
    }

    fn complete(
        &self,
        seq: u64,
        result: Result<Vec<ChatSummary>, ChatError>,
    ) -> Arc<UnreadSnapshot> {
        let _delivery = self.delivery.lock();

        let (snapshot, changed) = {
            let mut state = self.state.lock();
            state.pending = state.pending.saturating_sub(1);
            if state.in_flight.as_ref().is_some_and(|f| f.seq == seq) {
                state.in_flight = None;
            }
            let still_loading = state.snapshot.is_loading && state.pending > 0;

            if seq > state.last_committed {
                state.last_committed = seq;
                let next = match result {
                    Ok(chats) => {
                        let next = UnreadSnapshot::loaded(chats, Utc::now());
                        debug!(seq, count = next.count, "Unread refresh committed");
                        next.with_loading(still_loading)
                    }
                    Err(e) => {
                        warn!(seq, error = %e, "Unread refresh failed");
                        state
                            .snapshot
                            .failed(format!("failed to refresh unread chats: {e}"))
                            .with_loading(still_loading)
                    }
                };
                state.snapshot = Arc::new(next);
                (Arc::clone(&state.snapshot), true)
            } else {
                debug!(
                    seq,
                    last_committed = state.last_committed,
                    "Discarding stale unread refresh"
                );
                let changed = state.snapshot.is_loading && !still_loading;
                if changed {
                    state.snapshot = Arc::new(state.snapshot.with_loading(false));
                }
                (Arc::clone(&state.snapshot), changed)
            }
        };

        if changed {
            self.notify(&snapshot);
        }

        snapshot
    }

    fn notify(&self, snapshot: &Arc<UnreadSnapshot>) {
        let listeners = self.state.lock().listeners.clone();

        for entry in listeners {
            if !entry.active.load(Ordering::SeqCst) {
                continue;
            }

            let outcome = catch_unwind(AssertUnwindSafe(|| (entry.callback)(snapshot)));
            if outcome.is_err() {
                error!(listener = entry.id, "Unread store listener panicked");
            }
        }
    }
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        if let Some(handle) = self.state.get_mut().activity.take() {
            handle.abort();
        }
    }
}

fn spawn_activity(inner: &Arc<StoreInner>, poll_interval: Duration) -> JoinHandle<()> {
    let store = Arc::downgrade(inner);
    let trigger = inner.trigger.clone();

    tokio::spawn(async move {
        let mut ticker = (!poll_interval.is_zero()).then(|| {
            let mut ticker = interval_at(Instant::now() + poll_interval, poll_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            let tick = async {
                match ticker.as_mut() {
                    Some(ticker) => {
                        ticker.tick().await;
                    }
                    None => std::future::pending::<()>().await,
                }
            };

            tokio::select! {
                () = tick => trace!("Unread poll tick"),
                () = trigger.fired() => debug!("Unread refresh requested"),
            }

            let Some(inner) = store.upgrade() else {
                break;
            };
            let _refresh = inner.start_refresh(false, false);
        }

        trace!("Unread activity loop stopped");
    })
}

/// Registration returned by [`ChatUnreadStore::subscribe`].
///
/// Unsubscribes on drop.
#[must_use = "dropping a subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<StoreInner>,
    id: u64,
    unsubscribed: AtomicBool,
}

impl Subscription {
    /// Stops notifications. Calling it again does nothing.
    pub fn unsubscribe(&self) {
        if self.unsubscribed.swap(true, Ordering::SeqCst) {
            return;
        }
        if let Some(store) = self.store.upgrade() {
            store.unsubscribe(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("unsubscribed", &self.unsubscribed.load(Ordering::SeqCst))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::fixtures::unread_chats;
    use crate::domain::ports::mocks::{MockChatPort, ScriptedFetch};

    type Seen = Arc<Mutex<Vec<Arc<UnreadSnapshot>>>>;

    fn store_with(script: Vec<ScriptedFetch>) -> (ChatUnreadStore, Arc<MockChatPort>) {
        let port = Arc::new(MockChatPort::with_script(script));
        let store = ChatUnreadStore::new(port.clone());
        (store, port)
    }

    fn recorder() -> (Seen, impl Fn(&Arc<UnreadSnapshot>) + Send + Sync + 'static) {
        let seen: Seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |snapshot: &Arc<UnreadSnapshot>| {
            sink.lock().push(Arc::clone(snapshot));
        })
    }

    async fn settle() {
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_empty_and_idle() {
        let (store, port) = store_with(vec![]);

        let snapshot = store.snapshot();
        assert_eq!(*snapshot, UnreadSnapshot::empty());
        assert!(!snapshot.is_loading);
        assert!(!store.is_active());
        assert!(!store.is_polling());
        assert_eq!(store.poll_interval(), DEFAULT_POLL_INTERVAL);

        settle().await;
        assert_eq!(port.fetch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_refresh_notifies_once_with_count() {
        let (store, port) = store_with(vec![ScriptedFetch::ok(unread_chats(3))]);
        let (seen, listener) = recorder();

        let _subscription = store.subscribe(listener);
        let snapshot = store.refresh(RefreshOptions::default()).await;

        assert_eq!(snapshot.count, 3);
        assert_eq!(port.fetch_count(), 1);

        let seen = seen.lock();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].is_loading);
        assert_eq!(seen[0].count, 0);
        assert!(!seen[1].is_loading);
        assert_eq!(seen[1].count, 3);
        assert_eq!(seen[1].chats.len(), 3);
        assert_eq!(seen.iter().filter(|s| s.count == 3).count(), 1);
        assert!(seen[1].last_updated.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_coalesces_concurrent_refreshes() {
        let (store, port) = store_with(vec![ScriptedFetch::ok(unread_chats(2)).after(ms(50))]);

        let first = store.refresh(RefreshOptions::default());
        let second = store.refresh(RefreshOptions::default());

        assert!(first.ptr_eq(&second));

        let (a, b) = tokio::join!(first, second);
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.count, 2);
        assert_eq!(port.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_runs_without_being_awaited() {
        let (store, port) = store_with(vec![ScriptedFetch::ok(unread_chats(4))]);

        drop(store.refresh(RefreshOptions::default()));
        settle().await;

        assert_eq!(port.fetch_count(), 1);
        assert_eq!(store.snapshot().count, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_forced_refresh_starts_new_request() {
        let (store, port) = store_with(vec![
            ScriptedFetch::ok(unread_chats(1)).after(ms(50)),
            ScriptedFetch::ok(unread_chats(2)).after(ms(50)),
        ]);

        let first = store.refresh(RefreshOptions::default());
        let second = store.refresh(RefreshOptions::forced());

        assert!(!first.ptr_eq(&second));
        let _ = tokio::join!(first, second);
        assert_eq!(port.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_older_response_does_not_regress() {
        let (store, _port) = store_with(vec![
            ScriptedFetch::ok(unread_chats(5)).after(ms(100)),
            ScriptedFetch::ok(unread_chats(7)).after(ms(49)),
        ]);

        let first = store.refresh(RefreshOptions::forced());
        tokio::time::sleep(ms(1)).await;
        let second = store.refresh(RefreshOptions::forced());

        let (older, newer) = tokio::join!(first, second);

        assert_eq!(newer.count, 7);
        assert_eq!(older.count, 7);
        assert_eq!(store.snapshot().count, 7);
        assert!(!store.snapshot().is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_order_responses_both_commit() {
        let (store, _port) = store_with(vec![
            ScriptedFetch::ok(Vec::new()),
            ScriptedFetch::ok(unread_chats(5)).after(ms(10)),
            ScriptedFetch::ok(unread_chats(7)).after(ms(50)),
        ]);
        let (seen, listener) = recorder();
        let _subscription = store.subscribe(listener);
        settle().await;

        let first = store.refresh(RefreshOptions::forced());
        let second = store.refresh(RefreshOptions::forced());
        let (_, last) = tokio::join!(first, second);

        assert_eq!(last.count, 7);
        let counts: Vec<usize> = seen.lock().iter().map(|s| s.count).collect();
        assert_eq!(counts.last(), Some(&7));
        assert!(counts.contains(&5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_stays_until_last_request_settles() {
        let (store, _port) = store_with(vec![
            ScriptedFetch::ok(unread_chats(1)).after(ms(10)),
            ScriptedFetch::ok(unread_chats(2)).after(ms(50)),
        ]);

        let first = store.refresh(RefreshOptions::forced());
        let second = store.refresh(RefreshOptions::forced());

        let after_first = first.await;
        assert_eq!(after_first.count, 1);
        assert!(after_first.is_loading);

        let after_second = second.await;
        assert_eq!(after_second.count, 2);
        assert!(!after_second.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_success_cannot_override_newer_failure() {
        let (store, _port) = store_with(vec![
            ScriptedFetch::ok(unread_chats(2)),
            ScriptedFetch::ok(unread_chats(9)).after(ms(100)),
            ScriptedFetch::err("backend down").after(ms(10)),
        ]);
        store.refresh(RefreshOptions::default()).await;

        let slow = store.refresh(RefreshOptions::forced());
        let fast = store.refresh(RefreshOptions::forced());
        let _ = tokio::join!(slow, fast);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.count, 2);
        assert!(snapshot.error.is_some());
        assert!(!snapshot.is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_keeps_last_good_data() {
        let (store, _port) = store_with(vec![
            ScriptedFetch::ok(unread_chats(3)),
            ScriptedFetch::err("connection reset"),
            ScriptedFetch::ok(unread_chats(1)),
        ]);

        let good = store.refresh(RefreshOptions::default()).await;
        let failed = store.refresh(RefreshOptions::forced()).await;

        assert_eq!(failed.count, 3);
        assert_eq!(failed.chats, good.chats);
        assert_eq!(failed.last_updated, good.last_updated);
        assert!(!failed.is_loading);
        let error = failed.error.as_deref().unwrap_or_default();
        assert!(error.contains("connection reset"));

        let recovered = store.refresh(RefreshOptions::default()).await;
        assert_eq!(recovered.count, 1);
        assert!(recovered.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_background_refresh_does_not_flag_loading() {
        let (store, _port) = store_with(vec![
            ScriptedFetch::ok(unread_chats(1)),
            ScriptedFetch::ok(unread_chats(2)),
        ]);
        let (seen, listener) = recorder();
        let _subscription = store.subscribe(listener);
        settle().await;
        seen.lock().clear();

        store.refresh(RefreshOptions::default()).await;

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(!seen[0].is_loading);
        assert_eq!(seen[0].count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_server_snapshot_is_stable() {
        let (store, _port) = store_with(vec![ScriptedFetch::ok(unread_chats(3))]);

        let before = store.server_snapshot();
        store.refresh(RefreshOptions::forced()).await;
        let after = store.server_snapshot();

        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(*after, UnreadSnapshot::empty());
        assert_eq!(store.snapshot().count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribed_listener_misses_in_flight_result() {
        let (store, _port) = store_with(vec![ScriptedFetch::ok(unread_chats(3)).after(ms(50))]);
        let (seen, listener) = recorder();

        let subscription = store.subscribe(listener);
        let in_flight = store.refresh(RefreshOptions::default());
        subscription.unsubscribe();
        subscription.unsubscribe();

        let result = in_flight.await;
        assert_eq!(result.count, 3);

        let seen = seen.lock();
        assert_eq!(seen.len(), 1);
        assert!(seen[0].is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_unsubscribes() {
        let (store, _port) = store_with(vec![]);
        let (seen, listener) = recorder();

        let subscription = store.subscribe(listener);
        settle().await;
        let before = seen.lock().len();
        drop(subscription);

        store.refresh(RefreshOptions::forced()).await;

        assert_eq!(seen.lock().len(), before);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_activity_follows_subscribers() {
        let (store, _port) = store_with(vec![]);

        let a = store.subscribe(|_| {});
        let b = store.subscribe(|_| {});
        assert!(store.is_active());
        assert!(store.is_polling());

        a.unsubscribe();
        assert!(store.is_polling());

        b.unsubscribe();
        assert!(!store.is_active());
        assert!(!store.is_polling());

        let _c = store.subscribe(|_| {});
        assert!(store.is_polling());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_resubscribe_racing_last_unsubscribe_keeps_polling() {
        let store = ChatUnreadStore::new(Arc::new(MockChatPort::new()));
        let runtime = tokio::runtime::Handle::current();

        for _ in 0..200 {
            let leaving = store.subscribe(|_| {});
            let barrier = Arc::new(std::sync::Barrier::new(2));

            let joining = {
                let store = store.clone();
                let runtime = runtime.clone();
                let barrier = Arc::clone(&barrier);
                std::thread::spawn(move || {
                    let _guard = runtime.enter();
                    barrier.wait();
                    store.subscribe(|_| {})
                })
            };

            barrier.wait();
            drop(leaving);
            let joined = joining.join().unwrap();

            assert_eq!(store.subscriber_count(), 1);
            assert!(store.is_active());
            assert!(store.is_polling());

            drop(joined);
            assert!(!store.is_active());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_unsubscribe_waits_for_running_delivery() {
        use std::sync::atomic::AtomicUsize;

        let (store, _port) = store_with(vec![ScriptedFetch::ok(unread_chats(1)).after(ms(20))]);
        let (entered_tx, entered_rx) = std::sync::mpsc::channel::<()>();

        let _slow = store.subscribe(move |snapshot| {
            if snapshot.last_updated.is_some() {
                let _ = entered_tx.send(());
                std::thread::sleep(ms(50));
            }
        });

        let unsubscribed = Arc::new(AtomicBool::new(false));
        let late_calls = Arc::new(AtomicUsize::new(0));
        let target = {
            let unsubscribed = Arc::clone(&unsubscribed);
            let late_calls = Arc::clone(&late_calls);
            store.subscribe(move |_| {
                if unsubscribed.load(Ordering::SeqCst) {
                    late_calls.fetch_add(1, Ordering::SeqCst);
                }
            })
        };

        let flag = Arc::clone(&unsubscribed);
        tokio::task::spawn_blocking(move || {
            entered_rx.recv().unwrap();
            target.unsubscribe();
            flag.store(true, Ordering::SeqCst);
        })
        .await
        .unwrap();

        tokio::time::sleep(ms(100)).await;

        assert!(unsubscribed.load(Ordering::SeqCst));
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_interval_and_survives_failures() {
        let (store, port) = store_with(vec![
            ScriptedFetch::ok(unread_chats(1)),
            ScriptedFetch::err("timeout"),
            ScriptedFetch::ok(unread_chats(2)),
        ]);
        let _subscription = store.subscribe(|_| {});
        settle().await;
        assert_eq!(port.fetch_count(), 1);

        tokio::time::sleep(DEFAULT_POLL_INTERVAL + ms(1)).await;
        settle().await;
        assert_eq!(port.fetch_count(), 2);
        assert!(store.snapshot().error.is_some());
        assert_eq!(store.snapshot().count, 1);

        tokio::time::sleep(DEFAULT_POLL_INTERVAL).await;
        settle().await;
        assert_eq!(port.fetch_count(), 3);
        assert_eq!(store.snapshot().count, 2);
        assert!(store.snapshot().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_polling_while_idle() {
        let (store, port) = store_with(vec![]);
        let subscription = store.subscribe(|_| {});
        settle().await;
        drop(subscription);

        tokio::time::sleep(DEFAULT_POLL_INTERVAL * 3).await;
        settle().await;

        assert_eq!(port.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_interval_change_reschedules_timer() {
        let (store, port) = store_with(vec![]);
        let _subscription = store.subscribe(|_| {});
        settle().await;
        assert_eq!(port.fetch_count(), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        store.set_poll_interval(Duration::from_secs(2));

        tokio::time::sleep(Duration::from_secs(2) + ms(1)).await;
        settle().await;
        assert_eq!(port.fetch_count(), 2);

        tokio::time::sleep(Duration::from_secs(2)).await;
        settle().await;
        assert_eq!(port.fetch_count(), 3);

        // Past where the old 10s timer would have fired.
        tokio::time::sleep(Duration::from_millis(1500)).await;
        settle().await;
        assert_eq!(port.fetch_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_interval_disables_polling() {
        let (store, port) = store_with(vec![]);
        let _subscription = store.subscribe(|_| {});
        store.set_poll_interval(Duration::ZERO);
        settle().await;

        assert!(store.is_active());
        assert!(!store.is_polling());

        tokio::time::sleep(DEFAULT_POLL_INTERVAL * 2).await;
        settle().await;
        assert_eq!(port.fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_refreshes_while_active() {
        let (store, port) = store_with(vec![]);
        let trigger = store.trigger();
        let _subscription = store.subscribe(|_| {});
        settle().await;
        assert_eq!(port.fetch_count(), 1);

        trigger.fire();
        settle().await;

        assert_eq!(port.fetch_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_trigger_ignored_while_idle() {
        let (store, port) = store_with(vec![]);

        store.trigger().fire();
        settle().await;

        assert_eq!(port.fetch_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_panicking_listener_does_not_block_others() {
        let (store, _port) = store_with(vec![ScriptedFetch::ok(unread_chats(2))]);
        let (seen, listener) = recorder();

        let _bad = store.subscribe(|snapshot| {
            if snapshot.count > 0 {
                panic!("listener bug");
            }
        });
        let _good = store.subscribe(listener);

        let snapshot = store.refresh(RefreshOptions::default()).await;

        assert_eq!(snapshot.count, 2);
        assert_eq!(seen.lock().last().map(|s| s.count), Some(2));
    }
}
