//! Running arithmetic mean over a stream of numeric items.
//!
//! This module provides [`Average`] and [`AverageState`], the running-mean
//! operator and its per-subscription state. [`Average`] sits between an
//! upstream source of numbers and a downstream subscriber of `f64` means:
//! every upstream item folds into the state and produces exactly one
//! downstream emission, the mean of everything seen so far.
//!
//! # Overview
//!
//! The operator is a stateless factory. Subscribing wires a fresh
//! [`AverageState`] into the forwarding machinery, so repeated or concurrent
//! subscriptions never share state. Demand, completion, failure, and
//! cancellation all pass through unchanged; the operator adds nothing to the
//! protocol beyond the per-item fold.
//!
//! An empty upstream produces an empty downstream: the mean is only ever
//! computed inside the fold, after the item count has been incremented, so
//! completion with zero items forwards bare and no division by zero can
//! occur.
//!
//! # Quick Start
//!
//! ```rust
//! use streamstats::sources;
//! use streamstats::{Source, SourceExt};
//! use streamstats::testing::TestSubscriber;
//!
//! let probe = TestSubscriber::with_demand(10);
//! sources::iter([1.0, 2.0, 3.0]).average().subscribe(probe.clone());
//!
//! probe.assert_items(&[1.0, 1.5, 2.0]);
//! probe.assert_completed();
//! ```
//!
//! Integer inputs promote to `f64` before accumulating, so non-integral
//! means come out exact to floating-point precision:
//!
//! ```rust
//! use streamstats::sources;
//! use streamstats::{Source, SourceExt};
//! use streamstats::testing::TestSubscriber;
//!
//! let probe = TestSubscriber::with_demand(10);
//! sources::iter([1_u32, 2, 2]).average().subscribe(probe.clone());
//!
//! probe.assert_items(&[1.0, 1.5, 5.0 / 3.0]);
//! ```

use std::marker::PhantomData;

use num_traits::AsPrimitive;

use crate::operators::forward::{Accumulator, ForwardingSubscriber};
use crate::protocol::{Source, Subscriber};

/// Running state for the mean calculation.
///
/// One value per active subscription, owned by that subscription's delivery
/// path and touched by nothing else.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AverageState {
  /// Sum of every item accepted so far.
  pub sum: f64,
  /// Number of items accepted so far.
  pub count: u64,
}

impl AverageState {
  /// Creates an empty state: no items seen, nothing to emit yet.
  pub fn new() -> Self {
    Self::default()
  }

  /// Folds one value in and returns the updated mean.
  ///
  /// The count is incremented before the division, so the result is always
  /// well defined.
  pub fn update(&mut self, value: f64) -> f64 {
    self.sum += value;
    self.count += 1;
    self.sum / self.count as f64
  }

  /// The current mean, or `None` before the first item.
  pub fn average(&self) -> Option<f64> {
    if self.count == 0 {
      None
    } else {
      Some(self.sum / self.count as f64)
    }
  }
}

/// Glue between [`AverageState`] and the forwarding machinery.
struct AverageAccumulator<T> {
  state: AverageState,
  _input: PhantomData<T>,
}

impl<T> AverageAccumulator<T> {
  fn new() -> Self {
    Self {
      state: AverageState::new(),
      _input: PhantomData,
    }
  }
}

impl<T> Accumulator for AverageAccumulator<T>
where
  T: AsPrimitive<f64> + Send,
{
  type Input = T;
  type Output = f64;

  fn accumulate(&mut self, item: T) -> f64 {
    self.state.update(item.as_())
  }
}

/// An operator that emits the running mean of its upstream's items.
///
/// Built with [`SourceExt::average`](crate::operators::SourceExt::average) or
/// [`Average::new`]. Accepts any item type convertible to `f64` and emits
/// `f64`.
///
/// # Example
///
/// ```rust
/// use streamstats::sources;
/// use streamstats::operators::Average;
/// use streamstats::protocol::Source;
/// use streamstats::testing::TestSubscriber;
///
/// let averages = Average::new(sources::iter([4.0, 6.0]));
/// let probe = TestSubscriber::with_demand(2);
/// averages.subscribe(probe.clone());
/// probe.assert_items(&[4.0, 5.0]);
/// ```
#[derive(Debug, Clone)]
#[must_use = "an operator does nothing until subscribed"]
pub struct Average<Src> {
  upstream: Src,
}

impl<Src> Average<Src> {
  /// Wraps `upstream` in a running-mean operator.
  pub fn new(upstream: Src) -> Self {
    Self { upstream }
  }
}

impl<Src> Source for Average<Src>
where
  Src: Source,
  Src::Item: AsPrimitive<f64> + Send,
{
  type Item = f64;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = f64> + 'static,
  {
    self
      .upstream
      .subscribe(ForwardingSubscriber::new(AverageAccumulator::new(), subscriber));
  }
}
