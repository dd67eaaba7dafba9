//! Running maximum over a stream of partially ordered items.

use std::cmp::Ordering;

use crate::operators::forward::{Accumulator, ForwardingSubscriber};
use crate::protocol::{Source, Subscriber};

struct MaxAccumulator<T> {
  current: Option<T>,
}

impl<T> Accumulator for MaxAccumulator<T>
where
  T: PartialOrd + Copy + Send,
{
  type Input = T;
  type Output = T;

  fn accumulate(&mut self, item: T) -> T {
    // An incomparable candidate (a float NaN) never replaces the current
    // maximum.
    let next = match self.current {
      Some(current) if !matches!(item.partial_cmp(&current), Some(Ordering::Greater)) => current,
      _ => item,
    };
    self.current = Some(next);
    next
  }
}

/// An operator that emits the largest item seen so far, once per item.
///
/// Built with [`SourceExt::max`](crate::operators::SourceExt::max).
///
/// # Example
///
/// ```rust
/// use streamstats::sources;
/// use streamstats::{Source, SourceExt};
/// use streamstats::testing::TestSubscriber;
///
/// let probe = TestSubscriber::with_demand(10);
/// sources::iter([2, 23, 5]).max().subscribe(probe.clone());
/// probe.assert_items(&[2, 23, 23]);
/// ```
#[derive(Debug, Clone)]
#[must_use = "an operator does nothing until subscribed"]
pub struct Max<Src> {
  upstream: Src,
}

impl<Src> Max<Src> {
  /// Wraps `upstream` in a running-maximum operator.
  pub fn new(upstream: Src) -> Self {
    Self { upstream }
  }
}

impl<Src> Source for Max<Src>
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
      .subscribe(ForwardingSubscriber::new(MaxAccumulator { current: None }, subscriber));
  }
}

#[cfg(test)]
mod tests {
  use crate::operators::SourceExt;
  use crate::protocol::Source;
  use crate::sources;
  use crate::testing::TestSubscriber;

  #[test]
  fn test_running_maximum() {
    let probe = TestSubscriber::with_demand(10);
    sources::iter([5, 7, 2, 9]).max().subscribe(probe.clone());
    probe.assert_items(&[5, 7, 7, 9]);
    probe.assert_completed();
  }
}
