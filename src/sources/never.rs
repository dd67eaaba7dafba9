//! A source that stays silent.

use std::marker::PhantomData;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, trace};

use crate::protocol::{Source, Subscriber, Subscription};
use crate::sources::demand_violation;

/// A source that accepts demand but never signals.
///
/// Requested demand is parked and nothing ever follows, so the only ways
/// out are cancelling the subscription or requesting zero, which fails the
/// stream like any other demand violation.
///
/// Useful as the degenerate end of protocol tests.
///
/// # Example
///
/// ```rust
/// use streamstats::sources;
/// use streamstats::Source;
/// use streamstats::testing::TestSubscriber;
///
/// let probe = TestSubscriber::<u32>::with_demand(5);
/// sources::never().subscribe(probe.clone());
/// probe.assert_not_terminated();
/// probe.cancel();
/// ```
#[derive(Debug, Clone, Default)]
pub struct NeverSource<T> {
  _marker: PhantomData<T>,
}

impl<T> NeverSource<T> {
  /// Creates a silent source.
  pub fn new() -> Self {
    Self {
      _marker: PhantomData,
    }
  }
}

impl<T> Source for NeverSource<T> {
  type Item = T;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = T> + 'static,
  {
    let subscription = Arc::new(NeverSubscription::<S> {
      state: Mutex::new(NeverState {
        subscriber: None,
        terminated: false,
        violated: false,
      }),
    });
    let mut subscriber = subscriber;
    subscriber.on_subscribe(Arc::clone(&subscription) as Arc<dyn Subscription>);
    let mut state = subscription.lock_state();
    if state.violated {
      // Zero demand during on_subscribe; the error still has to go out.
      drop(state);
      subscriber.on_error(demand_violation());
      return;
    }
    if state.terminated {
      return;
    }
    state.subscriber = Some(subscriber);
  }
}

struct NeverState<S> {
  subscriber: Option<S>,
  terminated: bool,
  violated: bool,
}

struct NeverSubscription<S> {
  state: Mutex<NeverState<S>>,
}

impl<S> NeverSubscription<S> {
  fn lock_state(&self) -> MutexGuard<'_, NeverState<S>> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<S: Subscriber> Subscription for NeverSubscription<S> {
  fn request(&self, n: u64) {
    if n > 0 {
      if !self.lock_state().terminated {
        trace!(demand = n, "NeverSource: demand parked");
      }
      return;
    }
    // Take the subscriber out before signalling so the handler runs
    // without the state lock held.
    let taken = {
      let mut state = self.lock_state();
      if state.terminated {
        return;
      }
      state.terminated = true;
      let taken = state.subscriber.take();
      if taken.is_none() {
        state.violated = true;
      }
      taken
    };
    if let Some(mut subscriber) = taken {
      debug!("NeverSource: non-positive demand, failing the subscription");
      subscriber.on_error(demand_violation());
    }
  }

  fn cancel(&self) {
    let dropped = {
      let mut state = self.lock_state();
      if state.terminated {
        return;
      }
      state.terminated = true;
      state.subscriber.take()
    };
    trace!("NeverSource: subscription cancelled");
    drop(dropped);
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestSubscriber;

  #[test]
  fn test_demand_is_parked_forever() {
    let probe = TestSubscriber::<i32>::with_demand(5);
    NeverSource::new().subscribe(probe.clone());
    probe.request(5);
    probe.assert_items(&[]);
    probe.assert_not_terminated();
  }

  #[test]
  fn test_zero_demand_fails_the_subscription() {
    let probe = TestSubscriber::<i32>::new();
    NeverSource::new().subscribe(probe.clone());
    probe.request(0);
    assert!(probe.is_failed());
  }

  #[test]
  fn test_cancel_silences_later_requests() {
    let probe = TestSubscriber::<i32>::new();
    NeverSource::new().subscribe(probe.clone());
    probe.cancel();
    probe.request(0);
    probe.assert_not_terminated();
  }
}
