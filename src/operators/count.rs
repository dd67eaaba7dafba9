//! Running item count.

use std::marker::PhantomData;

use crate::operators::forward::{Accumulator, ForwardingSubscriber};
use crate::protocol::{Source, Subscriber};

struct CountAccumulator<T> {
  seen: u64,
  _input: PhantomData<T>,
}

impl<T: Send> Accumulator for CountAccumulator<T> {
  type Input = T;
  type Output = u64;

  fn accumulate(&mut self, _item: T) -> u64 {
    self.seen += 1;
    self.seen
  }
}

/// An operator that emits how many items have been seen so far, once per
/// item.
///
/// Built with [`SourceExt::count`](crate::operators::SourceExt::count).
/// Works over any item type; the items themselves are discarded.
#[derive(Debug, Clone)]
#[must_use = "an operator does nothing until subscribed"]
pub struct Count<Src> {
  upstream: Src,
}

impl<Src> Count<Src> {
  /// Wraps `upstream` in a running-count operator.
  pub fn new(upstream: Src) -> Self {
    Self { upstream }
  }
}

impl<Src> Source for Count<Src>
where
  Src: Source,
  Src::Item: Send + 'static,
{
  type Item = u64;

  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = u64> + 'static,
  {
    let accumulator = CountAccumulator {
      seen: 0,
      _input: PhantomData,
    };
    self
      .upstream
      .subscribe(ForwardingSubscriber::new(accumulator, subscriber));
  }
}
