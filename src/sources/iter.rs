//! A source backed by a cloneable collection of items.

use std::iter::Peekable;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError};

use tracing::{debug, trace};

use crate::error::StreamError;
use crate::protocol::{Source, Subscriber, Subscription};
use crate::sources::demand_violation;

/// A source that replays a collection for every subscriber.
///
/// Each call to [`subscribe`](Source::subscribe) clones the collection and
/// walks a fresh iterator over it, so subscriptions never share progress.
/// Items are handed over strictly within the demand the subscriber has
/// requested; once the iterator runs out the subscriber is completed, or
/// failed if [`with_failure`](IterSource::with_failure) armed an error.
///
/// Exhaustion is discovered by looking one item ahead, which is how an empty
/// collection terminates its subscriber without any demand at all.
///
/// # Example
///
/// ```rust
/// use streamstats::sources;
/// use streamstats::Source;
/// use streamstats::testing::TestSubscriber;
///
/// let probe = TestSubscriber::with_demand(10);
/// sources::iter(vec![1, 2, 3]).subscribe(probe.clone());
/// probe.assert_items(&[1, 2, 3]);
/// probe.assert_completed();
/// ```
#[derive(Debug, Clone)]
pub struct IterSource<I> {
  items: I,
  failure: Option<StreamError>,
}

impl<I> IterSource<I> {
  /// Creates a source over `items`.
  pub fn new(items: I) -> Self {
    Self {
      items,
      failure: None,
    }
  }

  /// Arms `error` as the terminal signal.
  ///
  /// Every item is still delivered first; the stream then ends with
  /// `on_error(error)` where it would otherwise have completed.
  pub fn with_failure(mut self, error: StreamError) -> Self {
    self.failure = Some(error);
    self
  }
}

impl<I> Source for IterSource<I>
where
  I: IntoIterator + Clone,
  I::IntoIter: Send + 'static,
  I::Item: Send + 'static,
{
  type Item = I::Item;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = I::Item> + 'static,
  {
    let shared = Arc::new(IterShared {
      state: Mutex::new(Some(IterState {
        items: self.items.clone().into_iter().peekable(),
        failure: self.failure.clone(),
        subscriber: None,
      })),
      demand: AtomicU64::new(0),
      draining: AtomicBool::new(false),
      terminated: AtomicBool::new(false),
      violated: AtomicBool::new(false),
    });
    trace!("IterSource: subscription established");
    let mut subscriber = subscriber;
    subscriber.on_subscribe(Arc::clone(&shared) as Arc<dyn Subscription>);
    {
      let mut state = shared.lock_state();
      if let Some(inner) = state.as_mut() {
        inner.subscriber = Some(subscriber);
      }
    }
    // Deliver whatever is already possible: demand requested during
    // on_subscribe, or the terminal of an empty collection.
    shared.drain();
  }
}

struct IterState<It: Iterator, S> {
  items: Peekable<It>,
  failure: Option<StreamError>,
  subscriber: Option<S>,
}

struct IterShared<It: Iterator, S> {
  state: Mutex<Option<IterState<It, S>>>,
  demand: AtomicU64,
  draining: AtomicBool,
  terminated: AtomicBool,
  violated: AtomicBool,
}

impl<It, S> IterShared<It, S>
where
  It: Iterator,
  S: Subscriber<Item = It::Item>,
{
  fn lock_state(&self) -> MutexGuard<'_, Option<IterState<It, S>>> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn claim_termination(&self) -> bool {
    !self.terminated.swap(true, Ordering::AcqRel)
  }

  /// Runs delivery passes until demand is exhausted or the stream ends.
  ///
  /// Only one caller at a time holds the `draining` flag; everyone else
  /// returns immediately after bumping the atomics, and the active pass
  /// picks their update up. Re-checking after releasing the flag closes
  /// the window where an update lands between the last pass and the
  /// release.
  fn drain(&self) {
    loop {
      if self.draining.swap(true, Ordering::SeqCst) {
        return;
      }
      let stalled;
      {
        let _reset = scopeguard::guard(&self.draining, |flag| {
          flag.store(false, Ordering::SeqCst);
        });
        stalled = self.pump();
      }
      if stalled
        || self.terminated.load(Ordering::Acquire)
        || self.demand.load(Ordering::SeqCst) == 0
      {
        return;
      }
    }
  }

  /// One delivery pass under the state lock.
  ///
  /// Returns `true` when the subscriber is not attached yet, in which case
  /// `subscribe` drains again after attaching it.
  fn pump(&self) -> bool {
    let mut state = self.lock_state();
    loop {
      if self.terminated.load(Ordering::Acquire) {
        // A cancel that lost the try_lock race leaves release to us.
        *state = None;
        return false;
      }
      let Some(inner) = state.as_mut() else {
        return false;
      };
      if inner.subscriber.is_none() {
        return true;
      }
      if self.violated.load(Ordering::Acquire) {
        self.finish(&mut state, Some(demand_violation()));
        return false;
      }
      if inner.items.peek().is_none() {
        self.finish(&mut state, None);
        return false;
      }
      if self.demand.load(Ordering::SeqCst) == 0 {
        return false;
      }
      let Some(item) = inner.items.next() else {
        return false;
      };
      self.demand.fetch_sub(1, Ordering::SeqCst);
      let Some(subscriber) = inner.subscriber.as_mut() else {
        return false;
      };
      subscriber.on_item(item);
    }
  }

  /// Claims the terminal and delivers it, releasing the iterator and the
  /// subscriber on the way out.
  fn finish(&self, state: &mut Option<IterState<It, S>>, violation: Option<StreamError>) {
    if !self.claim_termination() {
      *state = None;
      return;
    }
    let Some(mut inner) = state.take() else {
      return;
    };
    let error = violation.or(inner.failure.take());
    let Some(subscriber) = inner.subscriber.as_mut() else {
      return;
    };
    match error {
      Some(error) => {
        trace!("IterSource: delivering failure");
        subscriber.on_error(error);
      }
      None => {
        trace!("IterSource: delivering completion");
        subscriber.on_complete();
      }
    }
  }
}

impl<It, S> Subscription for IterShared<It, S>
where
  It: Iterator + Send,
  It::Item: Send,
  S: Subscriber<Item = It::Item>,
{
  fn request(&self, n: u64) {
    if self.terminated.load(Ordering::Acquire) {
      return;
    }
    if n == 0 {
      debug!("IterSource: non-positive demand, failing the subscription");
      self.violated.store(true, Ordering::SeqCst);
      self.drain();
      return;
    }
    trace!(demand = n, "IterSource: demand received");
    let _ = self
      .demand
      .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |current| {
        Some(current.saturating_add(n))
      });
    self.drain();
  }

  fn cancel(&self) {
    if self.terminated.swap(true, Ordering::AcqRel) {
      return;
    }
    trace!("IterSource: subscription cancelled");
    // Release the iterator and the subscriber, unless a delivery pass holds
    // the lock; that pass observes the terminated flag and releases instead.
    match self.state.try_lock() {
      Ok(mut state) => *state = None,
      Err(TryLockError::Poisoned(poisoned)) => *poisoned.into_inner() = None,
      Err(TryLockError::WouldBlock) => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
  use std::sync::{Arc, Mutex};

  use super::*;
  use crate::testing::TestSubscriber;

  #[test]
  fn test_items_follow_staged_demand() {
    let probe = TestSubscriber::new();
    IterSource::new(vec![1, 2, 3, 4, 5]).subscribe(probe.clone());
    probe.assert_items(&[]);
    probe.request(2);
    probe.assert_items(&[1, 2]);
    probe.assert_not_terminated();
    probe.request(10);
    probe.assert_items(&[1, 2, 3, 4, 5]);
    probe.assert_completed();
  }

  #[test]
  fn test_empty_collection_completes_without_demand() {
    let probe = TestSubscriber::<i32>::new();
    IterSource::new(Vec::<i32>::new()).subscribe(probe.clone());
    probe.assert_items(&[]);
    probe.assert_completed();
  }

  #[test]
  fn test_armed_failure_arrives_after_the_items() {
    let error = StreamError::message("boom");
    let probe = TestSubscriber::with_demand(10);
    IterSource::new(vec![1, 2])
      .with_failure(error.clone())
      .subscribe(probe.clone());
    probe.assert_items(&[1, 2]);
    let delivered = probe.failure().expect("failure should have been delivered");
    assert!(delivered.ptr_eq(&error));
  }

  #[test]
  fn test_each_subscription_replays_from_the_start() {
    let source = IterSource::new(vec![1, 2, 3]);
    let first = TestSubscriber::with_demand(10);
    source.subscribe(first.clone());
    first.assert_items(&[1, 2, 3]);
    let second = TestSubscriber::with_demand(10);
    source.subscribe(second.clone());
    second.assert_items(&[1, 2, 3]);
    second.assert_completed();
  }

  #[test]
  fn test_zero_demand_fails_the_subscription() {
    let probe = TestSubscriber::new();
    IterSource::new(vec![1, 2, 3]).subscribe(probe.clone());
    probe.request(0);
    assert!(probe.is_failed());
    probe.assert_items(&[]);
  }

  #[test]
  fn test_demand_saturates_instead_of_wrapping() {
    let probe = TestSubscriber::new();
    IterSource::new(vec![1, 2, 3]).subscribe(probe.clone());
    probe.request(u64::MAX);
    probe.request(u64::MAX);
    probe.assert_items(&[1, 2, 3]);
    probe.assert_completed();
  }

  /// Requests one item at a time from inside `on_item`.
  ///
  /// The re-entrant request must neither recurse nor stall: delivery keeps
  /// going in the already-running pass.
  struct OneByOne {
    subscription: Option<Arc<dyn Subscription>>,
    seen: Arc<AtomicU64>,
    completed: Arc<AtomicBool>,
  }

  impl Subscriber for OneByOne {
    type Item = u64;

    fn on_subscribe(&mut self, subscription: Arc<dyn Subscription>) {
      subscription.request(1);
      self.subscription = Some(subscription);
    }

    fn on_item(&mut self, _item: u64) {
      self.seen.fetch_add(1, Ordering::SeqCst);
      if let Some(subscription) = &self.subscription {
        subscription.request(1);
      }
    }

    fn on_complete(&mut self) {
      self.completed.store(true, Ordering::SeqCst);
    }

    fn on_error(&mut self, _error: StreamError) {}
  }

  #[test]
  fn test_one_at_a_time_consumption_is_stack_safe() {
    let seen = Arc::new(AtomicU64::new(0));
    let completed = Arc::new(AtomicBool::new(false));
    IterSource::new(0..10_000u64).subscribe(OneByOne {
      subscription: None,
      seen: Arc::clone(&seen),
      completed: Arc::clone(&completed),
    });
    assert_eq!(seen.load(Ordering::SeqCst), 10_000);
    assert!(completed.load(Ordering::SeqCst));
  }

  /// Cancels from inside `on_item` once it has seen enough.
  struct CancelAfter {
    remaining: u64,
    subscription: Option<Arc<dyn Subscription>>,
    items: Arc<Mutex<Vec<i32>>>,
    terminated: Arc<AtomicBool>,
  }

  impl Subscriber for CancelAfter {
    type Item = i32;

    fn on_subscribe(&mut self, subscription: Arc<dyn Subscription>) {
      subscription.request(10);
      self.subscription = Some(subscription);
    }

    fn on_item(&mut self, item: i32) {
      self.items.lock().unwrap().push(item);
      self.remaining -= 1;
      if self.remaining == 0 {
        if let Some(subscription) = &self.subscription {
          subscription.cancel();
        }
      }
    }

    fn on_complete(&mut self) {
      self.terminated.store(true, Ordering::SeqCst);
    }

    fn on_error(&mut self, _error: StreamError) {
      self.terminated.store(true, Ordering::SeqCst);
    }
  }

  #[test]
  fn test_cancelling_mid_delivery_stops_the_stream_silently() {
    let items = Arc::new(Mutex::new(Vec::new()));
    let terminated = Arc::new(AtomicBool::new(false));
    IterSource::new(vec![1, 2, 3, 4, 5]).subscribe(CancelAfter {
      remaining: 2,
      subscription: None,
      items: Arc::clone(&items),
      terminated: Arc::clone(&terminated),
    });
    assert_eq!(*items.lock().unwrap(), vec![1, 2]);
    assert!(!terminated.load(Ordering::SeqCst));
  }
}
