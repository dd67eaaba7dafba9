//! Exposing a source as a `futures` stream.

use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::trace;

use crate::error::StreamError;
use crate::protocol::{Signal, Source, Subscriber, Subscription};

/// A `futures` [`Stream`] pulling from a [`Source`].
///
/// The bridge keeps a prefetch window of demand open against the source:
/// the window is requested up front and topped up by one after every item
/// the stream hands out, so the source never runs more than `prefetch`
/// items ahead of the consumer. Items arrive as `Ok`, a failure arrives as
/// the final `Err`.
///
/// Nothing happens until the stream is polled for the first time; that
/// first poll is what subscribes to the source. Dropping the stream before
/// the end cancels the subscription.
///
/// # Example
///
/// ```rust
/// use futures::StreamExt;
/// use streamstats::sources;
/// use streamstats::SourceExt;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut averages = sources::iter([1, 2, 3]).average().into_stream();
/// let mut last = None;
/// while let Some(average) = averages.next().await {
///   last = Some(average.unwrap());
/// }
/// assert_eq!(last, Some(2.0));
/// # }
/// ```
pub struct SourceStream<T> {
  inner: Pin<Box<dyn Stream<Item = Result<T, StreamError>> + Send>>,
}

impl<T: Send + 'static> SourceStream<T> {
  /// Bridges `source` with a prefetch window of one item.
  pub fn new<Src>(source: Src) -> Self
  where
    Src: Source<Item = T> + Send + 'static,
  {
    Self::with_prefetch(source, 1)
  }

  /// Bridges `source`, keeping up to `prefetch` items of demand open.
  ///
  /// # Panics
  ///
  /// Panics if `prefetch` is zero.
  pub fn with_prefetch<Src>(source: Src, prefetch: u64) -> Self
  where
    Src: Source<Item = T> + Send + 'static,
  {
    assert!(prefetch > 0, "prefetch must be at least one item");
    let stream = async_stream::stream! {
      trace!(prefetch, "SourceStream: subscribing on first poll");
      let (sender, receiver) = mpsc::unbounded_channel();
      let handle = Arc::new(BridgeHandle::default());
      source.subscribe(BridgeSubscriber {
        sender,
        handle: Arc::clone(&handle),
      });
      handle.request(prefetch);
      let _cancel = scopeguard::guard(Arc::clone(&handle), |handle| {
        handle.cancel();
      });
      let mut signals = UnboundedReceiverStream::new(receiver);
      while let Some(signal) = signals.next().await {
        match signal {
          Signal::Item(item) => {
            yield Ok(item);
            handle.request(1);
          }
          Signal::Error(error) => {
            yield Err(error);
            break;
          }
          Signal::Complete => break,
        }
      }
    };
    Self {
      inner: Box::pin(stream),
    }
  }
}

impl<T> Stream for SourceStream<T> {
  type Item = Result<T, StreamError>;

  fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
    self.inner.as_mut().poll_next(cx)
  }
}

impl<T> fmt::Debug for SourceStream<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SourceStream").finish_non_exhaustive()
  }
}

/// Relays every signal into the bridge channel.
struct BridgeSubscriber<T> {
  sender: mpsc::UnboundedSender<Signal<T>>,
  handle: Arc<BridgeHandle>,
}

impl<T: Send> Subscriber for BridgeSubscriber<T> {
  type Item = T;

  fn on_subscribe(&mut self, subscription: Arc<dyn Subscription>) {
    self.handle.attach(subscription);
  }

  fn on_item(&mut self, item: T) {
    let _ = self.sender.send(Signal::Item(item));
  }

  fn on_complete(&mut self) {
    let _ = self.sender.send(Signal::Complete);
  }

  fn on_error(&mut self, error: StreamError) {
    let _ = self.sender.send(Signal::Error(error));
  }
}

/// The consumer side's grip on the upstream subscription.
#[derive(Default)]
struct BridgeHandle {
  subscription: Mutex<Option<Arc<dyn Subscription>>>,
}

impl BridgeHandle {
  fn lock(&self) -> MutexGuard<'_, Option<Arc<dyn Subscription>>> {
    self.subscription.lock().unwrap_or_else(PoisonError::into_inner)
  }

  fn attach(&self, subscription: Arc<dyn Subscription>) {
    *self.lock() = Some(subscription);
  }

  // The subscription is cloned out so upstream calls run without the lock.
  fn request(&self, n: u64) {
    let subscription = self.lock().clone();
    if let Some(subscription) = subscription {
      subscription.request(n);
    }
  }

  fn cancel(&self) {
    let subscription = self.lock().take();
    if let Some(subscription) = subscription {
      subscription.cancel();
    }
  }
}
