//! Exposing a `futures` stream as a source.

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::stream::Map;
use futures::{Stream, StreamExt};
use tokio::sync::Notify;
use tracing::{debug, trace};

use crate::error::StreamError;
use crate::protocol::{Source, Subscriber, Subscription};
use crate::sources::{InertSubscription, demand_violation};

/// A source backed by a `futures` [`Stream`] of `Result` items.
///
/// Subscribing hands the stream to a spawned tokio task, which becomes the
/// single place all signals are issued from. The task polls the stream only
/// while demand is outstanding, so an unconsumed stream is never read ahead;
/// `Ok` items become `on_item`, the first `Err` becomes `on_error`, and the
/// end of the stream becomes `on_complete`.
///
/// The stream can be given out once. A second subscriber is failed at
/// subscribe time instead of sharing it.
///
/// Cancellation takes effect even while the stream is pending, and an item
/// the task has already pulled when the cancel lands is dropped rather than
/// delivered.
///
/// # Panics
///
/// `subscribe` panics when called outside a tokio runtime.
///
/// # Example
///
/// ```rust
/// use futures::stream;
/// use streamstats::adapters::StreamSource;
/// use streamstats::{Source, SourceExt};
/// use streamstats::testing::TestSubscriber;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let probe = TestSubscriber::with_demand(10);
/// StreamSource::infallible(stream::iter([1, 2, 3]))
///   .average()
///   .subscribe(probe.clone());
/// probe.await_items(3).await;
/// probe.assert_items(&[1.0, 1.5, 2.0]);
/// # }
/// ```
pub struct StreamSource<St> {
  stream: Mutex<Option<St>>,
}

impl<St> StreamSource<St> {
  /// Creates a source over a stream of `Result` items.
  pub fn new(stream: St) -> Self {
    Self {
      stream: Mutex::new(Some(stream)),
    }
  }
}

impl<St, T> StreamSource<Map<St, fn(T) -> Result<T, StreamError>>>
where
  St: Stream<Item = T>,
{
  /// Creates a source over a stream whose items cannot fail.
  pub fn infallible(stream: St) -> Self {
    Self::new(stream.map(Ok as fn(T) -> Result<T, StreamError>))
  }
}

impl<St> fmt::Debug for StreamSource<St> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StreamSource").finish_non_exhaustive()
  }
}

impl<St, T> Source for StreamSource<St>
where
  St: Stream<Item = Result<T, StreamError>> + Send + 'static,
  T: Send + 'static,
{
  type Item = T;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = T> + 'static,
  {
    let mut subscriber = subscriber;
    let taken = self
      .stream
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .take();
    let Some(stream) = taken else {
      debug!("StreamSource: rejecting a second subscriber");
      subscriber.on_subscribe(Arc::new(InertSubscription));
      subscriber.on_error(StreamError::message(
        "stream already claimed by an earlier subscriber",
      ));
      return;
    };
    let control = Arc::new(TaskControl {
      demand: AtomicU64::new(0),
      cancelled: AtomicBool::new(false),
      violated: AtomicBool::new(false),
      notify: Notify::new(),
    });
    subscriber.on_subscribe(Arc::clone(&control) as Arc<dyn Subscription>);
    trace!("StreamSource: delivery task starting");
    tokio::spawn(deliver(stream, subscriber, control));
  }
}

struct TaskControl {
  demand: AtomicU64,
  cancelled: AtomicBool,
  violated: AtomicBool,
  notify: Notify,
}

impl Subscription for TaskControl {
  fn request(&self, n: u64) {
    if self.cancelled.load(Ordering::Acquire) {
      return;
    }
    if n == 0 {
      debug!("StreamSource: non-positive demand, failing the subscription");
      self.violated.store(true, Ordering::Release);
    } else {
      trace!(demand = n, "StreamSource: demand received");
      let _ = self
        .demand
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
          Some(current.saturating_add(n))
        });
    }
    self.notify.notify_one();
  }

  fn cancel(&self) {
    if self.cancelled.swap(true, Ordering::AcqRel) {
      return;
    }
    trace!("StreamSource: subscription cancelled");
    self.notify.notify_one();
  }
}

/// Drives the stream on behalf of one subscriber.
///
/// All signals are issued from this task, so delivery is serialized by
/// construction. The inner loop parks until the control side supplies
/// demand or ends the subscription.
async fn deliver<St, S>(stream: St, mut subscriber: S, control: Arc<TaskControl>)
where
  St: Stream<Item = Result<S::Item, StreamError>>,
  S: Subscriber,
{
  tokio::pin!(stream);
  loop {
    loop {
      if control.cancelled.load(Ordering::Acquire) {
        return;
      }
      if control.violated.load(Ordering::Acquire) {
        subscriber.on_error(demand_violation());
        return;
      }
      if control.demand.load(Ordering::Acquire) > 0 {
        break;
      }
      control.notify.notified().await;
    }
    tokio::select! {
      biased;
      _ = control.notify.notified() => {
        // A control signal landed; loop around and re-check the flags.
      }
      next = stream.next() => {
        if control.cancelled.load(Ordering::Acquire) {
          // Cancelled while the item was in flight; it is dropped.
          return;
        }
        match next {
          Some(Ok(item)) => {
            control.demand.fetch_sub(1, Ordering::AcqRel);
            subscriber.on_item(item);
          }
          Some(Err(error)) => {
            trace!("StreamSource: delivering failure");
            subscriber.on_error(error);
            return;
          }
          None => {
            trace!("StreamSource: delivering completion");
            subscriber.on_complete();
            return;
          }
        }
      }
    }
  }
}
