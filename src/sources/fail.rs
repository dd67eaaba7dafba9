//! A source that is broken from the start.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::debug;

use crate::error::StreamError;
use crate::protocol::{Source, Subscriber};
use crate::sources::InertSubscription;

/// A source that fails every subscriber straight away.
///
/// The failure arrives at subscribe time, before any demand exists. Every
/// subscriber receives a clone of the same underlying error, so callers can
/// recognize it again with [`StreamError::ptr_eq`].
///
/// # Example
///
/// ```rust
/// use streamstats::sources;
/// use streamstats::{Source, StreamError};
/// use streamstats::testing::TestSubscriber;
///
/// let error = StreamError::message("backing store unavailable");
/// let probe = TestSubscriber::<i32>::new();
/// sources::fail(error.clone()).subscribe(probe.clone());
/// assert!(probe.failure().is_some_and(|delivered| delivered.ptr_eq(&error)));
/// ```
#[derive(Debug, Clone)]
pub struct FailSource<T> {
  error: StreamError,
  _marker: PhantomData<T>,
}

impl<T> FailSource<T> {
  /// Creates a source that fails with `error`.
  pub fn new(error: StreamError) -> Self {
    Self {
      error,
      _marker: PhantomData,
    }
  }
}

impl<T> Source for FailSource<T> {
  type Item = T;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = T> + 'static,
  {
    let mut subscriber = subscriber;
    subscriber.on_subscribe(Arc::new(InertSubscription));
    debug!(error = %self.error, "FailSource: failing at subscribe");
    subscriber.on_error(self.error.clone());
  }
}
