//! Subscription protocol guarantees, observed from outside the crate.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use streamstats::sources;
use streamstats::testing::TestSubscriber;
use streamstats::{Source, SourceExt, StreamError, Subscriber, Subscription};

struct NoopSubscription;

impl Subscription for NoopSubscription {
  fn request(&self, _n: u64) {}

  fn cancel(&self) {}
}

/// A source that breaks the rules: it ignores demand and keeps signalling
/// after its own terminal.
struct RudeSource;

impl Source for RudeSource {
  type Item = i32;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = i32> + 'static,
  {
    let mut subscriber = subscriber;
    subscriber.on_subscribe(Arc::new(NoopSubscription));
    subscriber.on_item(1);
    subscriber.on_complete();
    subscriber.on_item(2);
    subscriber.on_complete();
    subscriber.on_error(StreamError::message("late"));
  }
}

#[test]
fn test_operators_shield_downstream_from_rude_upstreams() {
  let probe = TestSubscriber::new();
  RudeSource.average().subscribe(probe.clone());
  probe.assert_items(&[1.0]);
  probe.assert_completed();
}

#[derive(Default)]
struct RecordingSubscription {
  requests: Mutex<Vec<u64>>,
  cancels: AtomicUsize,
}

impl Subscription for RecordingSubscription {
  fn request(&self, n: u64) {
    self.requests.lock().unwrap().push(n);
  }

  fn cancel(&self) {
    self.cancels.fetch_add(1, Ordering::SeqCst);
  }
}

/// A source that only hands out a recording subscription and never signals.
struct InspectableSource {
  subscription: Arc<RecordingSubscription>,
}

impl Source for InspectableSource {
  type Item = i32;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = i32> + 'static,
  {
    let mut subscriber = subscriber;
    subscriber.on_subscribe(Arc::clone(&self.subscription) as Arc<dyn Subscription>);
  }
}

#[test]
fn test_demand_passes_through_operators_verbatim() {
  let upstream = Arc::new(RecordingSubscription::default());
  let source = InspectableSource {
    subscription: Arc::clone(&upstream),
  };
  let probe = TestSubscriber::<u64>::new();
  source.count().subscribe(probe.clone());
  probe.request(3);
  probe.request(7);
  assert_eq!(*upstream.requests.lock().unwrap(), vec![3, 7]);
}

#[test]
fn test_cancellation_propagates_upstream_exactly_once() {
  let upstream = Arc::new(RecordingSubscription::default());
  let source = InspectableSource {
    subscription: Arc::clone(&upstream),
  };
  let probe = TestSubscriber::<u64>::new();
  source.count().subscribe(probe.clone());
  probe.cancel();
  probe.cancel();
  assert_eq!(upstream.cancels.load(Ordering::SeqCst), 1);
  probe.request(1);
  assert!(upstream.requests.lock().unwrap().is_empty());
}

#[test]
fn test_zero_demand_is_a_protocol_violation() {
  let probe = TestSubscriber::<f64>::new();
  sources::iter([1, 2, 3]).average().subscribe(probe.clone());
  probe.request(0);
  let error = probe.failure().expect("violation should fail the stream");
  assert_eq!(error.to_string(), "requested demand must be greater than zero");
  probe.assert_items(&[]);
}

#[test]
fn test_resubscribing_starts_from_scratch() {
  let averages = sources::iter([6.0, 12.0]).average();
  let first = TestSubscriber::with_demand(10);
  averages.subscribe(first.clone());
  first.assert_items(&[6.0, 9.0]);
  first.assert_completed();

  let second = TestSubscriber::with_demand(10);
  averages.subscribe(second.clone());
  second.assert_items(&[6.0, 9.0]);
  second.assert_completed();
}

/// Cancels through the operator chain once it has seen two items.
struct TakeTwo {
  subscription: Option<Arc<dyn Subscription>>,
  seen: Arc<Mutex<Vec<f64>>>,
  terminated: Arc<AtomicBool>,
}

impl Subscriber for TakeTwo {
  type Item = f64;

  fn on_subscribe(&mut self, subscription: Arc<dyn Subscription>) {
    subscription.request(10);
    self.subscription = Some(subscription);
  }

  fn on_item(&mut self, item: f64) {
    let mut seen = self.seen.lock().unwrap();
    seen.push(item);
    if seen.len() == 2 {
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
fn test_cancelling_mid_stream_stops_delivery_through_operators() {
  let seen = Arc::new(Mutex::new(Vec::new()));
  let terminated = Arc::new(AtomicBool::new(false));
  sources::iter([1.0, 2.0, 3.0, 4.0]).average().subscribe(TakeTwo {
    subscription: None,
    seen: Arc::clone(&seen),
    terminated: Arc::clone(&terminated),
  });
  assert_eq!(*seen.lock().unwrap(), vec![1.0, 1.5]);
  assert!(!terminated.load(Ordering::SeqCst));
}
