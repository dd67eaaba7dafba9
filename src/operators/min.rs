//! Running minimum over a stream of partially ordered items.

use std::cmp::Ordering;

use crate::operators::forward::{Accumulator, ForwardingSubscriber};
use crate::protocol::{Source, Subscriber};

struct MinAccumulator<T> {
  current: Option<T>,
}

impl<T> Accumulator for MinAccumulator<T>
where
  T: PartialOrd + Copy + Send,
{
  type Input = T;
  type Output = T;

  fn accumulate(&mut self, item: T) -> T {
    // An incomparable candidate (a float NaN) never replaces the current
    // minimum.
    let next = match self.current {
      Some(current) if !matches!(item.partial_cmp(&current), Some(Ordering::Less)) => current,
      _ => item,
    };
    self.current = Some(next);
    next
  }
}

/// An operator that emits the smallest item seen so far, once per item.
///
/// Built with [`SourceExt::min`](crate::operators::SourceExt::min).
///
/// # Example
///
/// ```rust
/// use streamstats::sources;
/// use streamstats::{Source, SourceExt};
/// use streamstats::testing::TestSubscriber;
///
/// let probe = TestSubscriber::with_demand(10);
/// sources::iter([3, 1, 2]).min().subscribe(probe.clone());
/// probe.assert_items(&[3, 1, 1]);
/// ```
#[derive(Debug, Clone)]
#[must_use = "an operator does nothing until subscribed"]
pub struct Min<Src> {
  upstream: Src,
}

impl<Src> Min<Src> {
  /// Wraps `upstream` in a running-minimum operator.
  pub fn new(upstream: Src) -> Self {
    Self { upstream }
  }
}

impl<Src> Source for Min<Src>
where
  Src: Source,
  Src::Item: PartialOrd + Copy + Send + 'static,
{
  type Item = Src::Item;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = Src::Item> + 'static,
  {
    self
      .upstream
      .subscribe(ForwardingSubscriber::new(MinAccumulator { current: None }, subscriber));
  }
}
