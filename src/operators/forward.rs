//! Per-subscription forwarding machinery shared by every operator.
//!
//! Each operator in this crate is a strict 1-to-1 transform: one upstream
//! item folds into per-subscription state and produces exactly one downstream
//! item, while demand, completion, failure, and cancellation pass through
//! untouched. [`ForwardingSubscriber`] carries that shape once; operators
//! plug in only their fold via [`Accumulator`].
//!
//! Termination is a single atomic claim shared between the signal side (the
//! subscriber handlers) and the control side (the subscription handle).
//! Completion, failure, and cancellation all race for the same claim;
//! whichever wins decides the terminal outcome and every later signal is
//! discarded. This is the one piece of cross-thread coordination here: the
//! accumulation path itself relies on serialized delivery and takes no locks.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, trace};

use crate::error::StreamError;
use crate::protocol::{Subscriber, Subscription};

/// The per-item fold at the heart of an operator.
///
/// `accumulate` is called once per upstream item, in delivery order, and
/// returns the item to emit downstream. It runs inline inside the upstream's
/// delivery call, so implementations must be fast, non-blocking, and
/// infallible.
pub(crate) trait Accumulator: Send {
  /// Upstream item type.
  type Input;
  /// Downstream item type.
  type Output;

  /// Folds one item into the running state and returns the emission.
  fn accumulate(&mut self, item: Self::Input) -> Self::Output;
}

/// At-most-once terminal transition for one subscription.
#[derive(Debug, Default)]
struct Termination {
  flag: AtomicBool,
}

impl Termination {
  /// Attempts the terminal transition; `true` for the single winner.
  fn claim(&self) -> bool {
    !self.flag.swap(true, Ordering::AcqRel)
  }

  fn is_terminated(&self) -> bool {
    self.flag.load(Ordering::Acquire)
  }
}

/// Subscriber an operator registers with its upstream.
///
/// Owns the fresh accumulator for this subscription, the downstream
/// subscriber, and the shared termination claim. Dropped signals are traced,
/// never surfaced: a late item, a duplicate terminal, or an extra
/// subscription handle is a no-op by protocol.
pub(crate) struct ForwardingSubscriber<A, S> {
  accumulator: A,
  downstream: S,
  termination: Arc<Termination>,
  subscribed: bool,
}

impl<A, S> ForwardingSubscriber<A, S> {
  pub(crate) fn new(accumulator: A, downstream: S) -> Self {
    Self {
      accumulator,
      downstream,
      termination: Arc::new(Termination::default()),
      subscribed: false,
    }
  }
}

impl<A, S> Subscriber for ForwardingSubscriber<A, S>
where
  A: Accumulator,
  S: Subscriber<Item = A::Output>,
{
  type Item = A::Input;

  fn on_subscribe(&mut self, subscription: Arc<dyn Subscription>) {
    if self.subscribed {
      debug!("dropping excess upstream subscription handle");
      subscription.cancel();
      return;
    }
    self.subscribed = true;
    trace!("operator subscription established");
    let handle = ForwardingSubscription {
      upstream: subscription,
      termination: Arc::clone(&self.termination),
    };
    self.downstream.on_subscribe(Arc::new(handle));
  }

  fn on_item(&mut self, item: A::Input) {
    if self.termination.is_terminated() {
      trace!("discarding item delivered after termination");
      return;
    }
    let output = self.accumulator.accumulate(item);
    self.downstream.on_item(output);
  }

  fn on_complete(&mut self) {
    if self.termination.claim() {
      trace!("forwarding completion downstream");
      self.downstream.on_complete();
    } else {
      trace!("discarding completion delivered after termination");
    }
  }

  fn on_error(&mut self, error: StreamError) {
    if self.termination.claim() {
      trace!("forwarding failure downstream");
      self.downstream.on_error(error);
    } else {
      debug!(%error, "discarding failure delivered after termination");
    }
  }
}

/// Handle handed to the downstream subscriber.
///
/// Demand passes through 1-to-1, in value and in call count; the operator
/// never requests on its own initiative. Cancellation claims termination and
/// propagates upstream exactly once.
struct ForwardingSubscription {
  upstream: Arc<dyn Subscription>,
  termination: Arc<Termination>,
}

impl Subscription for ForwardingSubscription {
  fn request(&self, n: u64) {
    if self.termination.is_terminated() {
      trace!(demand = n, "ignoring demand after termination");
      return;
    }
    self.upstream.request(n);
  }

  fn cancel(&self) {
    if self.termination.claim() {
      trace!("propagating cancellation upstream");
      self.upstream.cancel();
    }
  }
}
