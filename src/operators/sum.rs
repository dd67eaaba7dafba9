//! Running total over a stream of addable items.

use std::ops::Add;

use crate::operators::forward::{Accumulator, ForwardingSubscriber};
use crate::protocol::{Source, Subscriber};

/// Running-total fold; the first item seeds the total.
struct SumAccumulator<T> {
  total: Option<T>,
}

impl<T> Accumulator for SumAccumulator<T>
where
  T: Add<Output = T> + Copy + Send,
{
  type Input = T;
  type Output = T;

  fn accumulate(&mut self, item: T) -> T {
    let next = match self.total {
      Some(total) => total + item,
      None => item,
    };
    self.total = Some(next);
    next
  }
}

/// An operator that emits the running total of its upstream's items.
///
/// One emission per item: the k-th output is the sum of the first k inputs.
/// Built with [`SourceExt::sum`](crate::operators::SourceExt::sum).
///
/// # Example
///
/// ```rust
/// use streamstats::sources;
/// use streamstats::{Source, SourceExt};
/// use streamstats::testing::TestSubscriber;
///
/// let probe = TestSubscriber::with_demand(10);
/// sources::iter([1, 2, 3]).sum().subscribe(probe.clone());
/// probe.assert_items(&[1, 3, 6]);
/// ```
#[derive(Debug, Clone)]
#[must_use = "an operator does nothing until subscribed"]
pub struct Sum<Src> {
  upstream: Src,
}

impl<Src> Sum<Src> {
  /// Wraps `upstream` in a running-total operator.
  pub fn new(upstream: Src) -> Self {
    Self { upstream }
  }
}

impl<Src> Source for Sum<Src>
where
  Src: Source,
  Src::Item: Add<Output = Src::Item> + Copy + Send + 'static,
{
  type Item = Src::Item;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = Src::Item> + 'static,
  {
    self
      .upstream
      .subscribe(ForwardingSubscriber::new(SumAccumulator { total: None }, subscriber));
  }
}
