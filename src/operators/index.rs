//! Pairing items with their position in the stream.

use std::marker::PhantomData;

use crate::operators::forward::{Accumulator, ForwardingSubscriber};
use crate::protocol::{Source, Subscriber};

struct IndexAccumulator<T> {
  next: u64,
  _input: PhantomData<T>,
}

impl<T: Send> Accumulator for IndexAccumulator<T> {
  type Input = T;
  type Output = (u64, T);

  fn accumulate(&mut self, item: T) -> (u64, T) {
    let index = self.next;
    self.next += 1;
    (index, item)
  }
}

/// An operator that pairs each item with its zero-based position.
///
/// Built with [`SourceExt::index`](crate::operators::SourceExt::index).
///
/// # Example
///
/// ```rust
/// use streamstats::sources;
/// use streamstats::{Source, SourceExt};
/// use streamstats::testing::TestSubscriber;
///
/// let probe = TestSubscriber::with_demand(10);
/// sources::iter(["a", "b"]).index().subscribe(probe.clone());
/// probe.assert_items(&[(0, "a"), (1, "b")]);
/// ```
#[derive(Debug, Clone)]
#[must_use = "an operator does nothing until subscribed"]
pub struct Index<Src> {
  upstream: Src,
}

impl<Src> Index<Src> {
  /// Wraps `upstream` in an indexing operator.
  pub fn new(upstream: Src) -> Self {
    Self { upstream }
  }
}

impl<Src> Source for Index<Src>
where
  Src: Source,
  Src::Item: Send + 'static,
{
  type Item = (u64, Src::Item);

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = (u64, Src::Item)> + 'static,
  {
    let accumulator = IndexAccumulator {
      next: 0,
      _input: PhantomData,
    };
    self
      .upstream
      .subscribe(ForwardingSubscriber::new(accumulator, subscriber));
  }
}
