//! A source with no items.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::trace;

use crate::protocol::{Source, Subscriber};
use crate::sources::InertSubscription;

/// A source that completes every subscriber straight away.
///
/// The completion arrives at subscribe time, before any demand exists; the
/// end of a stream never waits for a request.
///
/// # Example
///
/// ```rust
/// use streamstats::sources;
/// use streamstats::Source;
/// use streamstats::testing::TestSubscriber;
///
/// let probe = TestSubscriber::<i32>::new();
/// sources::empty().subscribe(probe.clone());
/// probe.assert_completed();
/// ```
#[derive(Debug, Clone, Default)]
pub struct EmptySource<T> {
  _marker: PhantomData<T>,
}

impl<T> EmptySource<T> {
  /// Creates an empty source.
  pub fn new() -> Self {
    Self {
      _marker: PhantomData,
    }
  }
}

impl<T> Source for EmptySource<T> {
  type Item = T;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = T> + 'static,
  {
    let mut subscriber = subscriber;
    subscriber.on_subscribe(Arc::new(InertSubscription));
    trace!("EmptySource: completing at subscribe");
    subscriber.on_complete();
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestSubscriber;

  #[test]
  fn test_completes_without_any_demand() {
    let probe = TestSubscriber::<String>::new();
    EmptySource::new().subscribe(probe.clone());
    probe.assert_items(&[]);
    probe.assert_completed();
  }

  #[test]
  fn test_requests_after_completion_are_ignored() {
    let probe = TestSubscriber::<i32>::new();
    EmptySource::new().subscribe(probe.clone());
    probe.request(5);
    probe.assert_items(&[]);
    probe.assert_completed();
  }
}
