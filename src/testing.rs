//! A recording subscriber for tests.
//!
//! [`TestSubscriber`] subscribes to any source, records every signal it
//! receives and exposes them to the test: synchronous accessors and
//! assertions for sources that deliver on the subscribing thread, and
//! `await_*` methods for sources that deliver from a task.
//!
//! Clones share their recording, so a test can keep one handle while the
//! source consumes another:
//!
//! ```rust
//! use streamstats::sources;
//! use streamstats::{Source, SourceExt};
//! use streamstats::testing::TestSubscriber;
//!
//! let probe = TestSubscriber::new();
//! sources::iter([2, 4, 6]).average().subscribe(probe.clone());
//! probe.request(2);
//! probe.assert_items(&[2.0, 3.0]);
//! ```

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::{Instant, timeout};

use crate::error::StreamError;
use crate::protocol::{Subscriber, Subscription};

const DEFAULT_WAIT: Duration = Duration::from_secs(5);

#[derive(Debug)]
enum Terminal {
  Completed,
  Failed(StreamError),
}

struct ProbeInner<T> {
  items: Mutex<Vec<T>>,
  terminals: Mutex<Vec<Terminal>>,
  subscription: Mutex<Option<Arc<dyn Subscription>>>,
  initial_demand: u64,
  notify: Notify,
}

impl<T> ProbeInner<T> {
  fn lock_items(&self) -> MutexGuard<'_, Vec<T>> {
    self.items.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn lock_terminals(&self) -> MutexGuard<'_, Vec<Terminal>> {
    self.terminals.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn lock_subscription(&self) -> MutexGuard<'_, Option<Arc<dyn Subscription>>> {
    self.subscription.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

/// A subscriber that records everything it is signalled.
///
/// Items are kept in arrival order and terminals are kept verbatim, so a
/// probe also catches a source that signals more than one terminal:
/// [`assert_completed`](TestSubscriber::assert_completed) insists on exactly
/// one.
///
/// Created with no demand by [`new`](TestSubscriber::new), or requesting
/// up front via [`with_demand`](TestSubscriber::with_demand); further
/// demand goes through [`request`](TestSubscriber::request).
pub struct TestSubscriber<T> {
  inner: Arc<ProbeInner<T>>,
}

impl<T> TestSubscriber<T> {
  /// Creates a probe that requests nothing on its own.
  pub fn new() -> Self {
    Self::with_demand(0)
  }

  /// Creates a probe that requests `demand` items as soon as it is
  /// subscribed.
  pub fn with_demand(demand: u64) -> Self {
    Self {
      inner: Arc::new(ProbeInner {
        items: Mutex::new(Vec::new()),
        terminals: Mutex::new(Vec::new()),
        subscription: Mutex::new(None),
        initial_demand: demand,
        notify: Notify::new(),
      }),
    }
  }

  /// Requests `n` more items from the subscription.
  ///
  /// # Panics
  ///
  /// Panics if the probe has not received `on_subscribe` yet.
  pub fn request(&self, n: u64) {
    let subscription = self.inner.lock_subscription().clone();
    match subscription {
      Some(subscription) => subscription.request(n),
      None => panic!("request before the probe was subscribed"),
    }
  }

  /// Cancels the subscription.
  ///
  /// # Panics
  ///
  /// Panics if the probe has not received `on_subscribe` yet.
  pub fn cancel(&self) {
    let subscription = self.inner.lock_subscription().clone();
    match subscription {
      Some(subscription) => subscription.cancel(),
      None => panic!("cancel before the probe was subscribed"),
    }
  }

  /// Whether `on_subscribe` has been received.
  pub fn is_subscribed(&self) -> bool {
    self.inner.lock_subscription().is_some()
  }

  /// Whether any terminal signal has been received.
  pub fn is_terminated(&self) -> bool {
    !self.inner.lock_terminals().is_empty()
  }

  /// Whether the first terminal signal was a completion.
  pub fn is_completed(&self) -> bool {
    matches!(self.inner.lock_terminals().first(), Some(Terminal::Completed))
  }

  /// Whether the first terminal signal was a failure.
  pub fn is_failed(&self) -> bool {
    matches!(self.inner.lock_terminals().first(), Some(Terminal::Failed(_)))
  }

  /// The error from the first terminal signal, if it was a failure.
  pub fn failure(&self) -> Option<StreamError> {
    match self.inner.lock_terminals().first() {
      Some(Terminal::Failed(error)) => Some(error.clone()),
      _ => None,
    }
  }

  /// A copy of the items received so far.
  pub fn items(&self) -> Vec<T>
  where
    T: Clone,
  {
    self.inner.lock_items().clone()
  }

  /// Asserts that exactly `expected` has been received, in order.
  pub fn assert_items(&self, expected: &[T])
  where
    T: PartialEq + fmt::Debug,
  {
    let items = self.inner.lock_items();
    assert_eq!(items.as_slice(), expected);
  }

  /// Asserts that the stream ended with exactly one completion.
  pub fn assert_completed(&self) {
    let terminals = self.inner.lock_terminals();
    assert!(
      matches!(terminals.as_slice(), [Terminal::Completed]),
      "expected a single completion, saw {terminals:?}"
    );
  }

  /// Asserts that no terminal signal has been received.
  pub fn assert_not_terminated(&self) {
    let terminals = self.inner.lock_terminals();
    assert!(
      terminals.is_empty(),
      "expected no terminal yet, saw {terminals:?}"
    );
  }

  /// Waits until at least `count` items have been received.
  ///
  /// # Panics
  ///
  /// Panics if the items do not show up within five seconds.
  pub async fn await_items(&self, count: usize) -> &Self {
    self
      .await_until(&format!("{count} items"), |probe| {
        probe.inner.lock_items().len() >= count
      })
      .await;
    self
  }

  /// Waits for the stream to end, then asserts it completed.
  ///
  /// # Panics
  ///
  /// Panics if no terminal shows up within five seconds, or if the
  /// terminal was a failure.
  pub async fn await_completion(&self) -> &Self {
    self
      .await_until("completion", TestSubscriber::is_terminated)
      .await;
    self.assert_completed();
    self
  }

  /// Waits for the stream to end, then returns its failure.
  ///
  /// # Panics
  ///
  /// Panics if no terminal shows up within five seconds, or if the stream
  /// completed instead of failing.
  pub async fn await_failure(&self) -> StreamError {
    self
      .await_until("a failure", TestSubscriber::is_terminated)
      .await;
    match self.failure() {
      Some(error) => error,
      None => panic!("stream completed instead of failing"),
    }
  }

  // Polling with a re-check after every wakeup; a signal that lands
  // between the check and the park leaves a permit behind, so it cannot
  // be missed.
  async fn await_until<F>(&self, waiting_for: &str, predicate: F)
  where
    F: Fn(&Self) -> bool,
  {
    let deadline = Instant::now() + DEFAULT_WAIT;
    loop {
      if predicate(self) {
        return;
      }
      let now = Instant::now();
      if now >= deadline {
        panic!("timed out after {DEFAULT_WAIT:?} waiting for {waiting_for}");
      }
      let _ = timeout(deadline - now, self.inner.notify.notified()).await;
    }
  }
}

impl<T> Clone for TestSubscriber<T> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

impl<T> Default for TestSubscriber<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T> fmt::Debug for TestSubscriber<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("TestSubscriber")
      .field("items", &self.inner.lock_items().len())
      .field("terminals", &*self.inner.lock_terminals())
      .finish_non_exhaustive()
  }
}

impl<T: Send> Subscriber for TestSubscriber<T> {
  type Item = T;

  fn on_subscribe(&mut self, subscription: Arc<dyn Subscription>) {
    *self.inner.lock_subscription() = Some(Arc::clone(&subscription));
    if self.inner.initial_demand > 0 {
      subscription.request(self.inner.initial_demand);
    }
    self.inner.notify.notify_one();
  }

  fn on_item(&mut self, item: T) {
    self.inner.lock_items().push(item);
    self.inner.notify.notify_one();
  }

  fn on_complete(&mut self) {
    self.inner.lock_terminals().push(Terminal::Completed);
    self.inner.notify.notify_one();
  }

  fn on_error(&mut self, error: StreamError) {
    self.inner.lock_terminals().push(Terminal::Failed(error));
    self.inner.notify.notify_one();
  }
}
