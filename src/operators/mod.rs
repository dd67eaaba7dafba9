//! Running statistics over a source.
//!
//! Every operator in this module wraps an upstream [`Source`] and emits one
//! output item per input item, carrying the statistic computed over the items
//! seen so far:
//!
//! * **[`Average`]**: running arithmetic mean as `f64`
//! * **[`Sum`]**: running sum
//! * **[`Min`]** / **[`Max`]**: running extremes
//! * **[`Count`]**: running item count
//! * **[`Index`]**: each item paired with its zero-based position
//!
//! Operators do not buffer and do not alter demand: every `request(n)` from
//! the downstream subscriber is forwarded to the upstream subscription
//! verbatim, and completion, failure and cancellation pass through unchanged.
//!
//! The [`SourceExt`] extension trait puts all of them behind method syntax so
//! chains read left to right:
//!
//! ```rust
//! use streamstats::sources;
//! use streamstats::{Source, SourceExt};
//! use streamstats::testing::TestSubscriber;
//!
//! let probe = TestSubscriber::with_demand(10);
//! sources::iter([3.0, 1.0, 2.0]).min().subscribe(probe.clone());
//! probe.assert_items(&[3.0, 1.0, 1.0]);
//! ```

use std::ops::Add;

use num_traits::AsPrimitive;

use crate::adapters::SourceStream;
use crate::protocol::Source;

mod forward;

pub mod average;
pub mod count;
pub mod index;
pub mod max;
pub mod min;
pub mod sum;

pub use average::*;
pub use count::*;
pub use index::*;
pub use max::*;
pub use min::*;
pub use sum::*;

/// Method-syntax constructors for the statistics operators.
///
/// Implemented for every [`Source`], so operators chain directly off source
/// expressions. Each method only names the wrapper; nothing runs until the
/// result is subscribed to.
pub trait SourceExt: Source {
  /// Emits the running arithmetic mean of the items seen so far.
  ///
  /// Input items are widened to `f64` before they enter the mean.
  ///
  /// # Example
  ///
  /// ```rust
  /// use streamstats::sources;
  /// use streamstats::{Source, SourceExt};
  /// use streamstats::testing::TestSubscriber;
  ///
  /// let probe = TestSubscriber::with_demand(10);
  /// sources::iter([1, 2, 3]).average().subscribe(probe.clone());
  /// probe.assert_items(&[1.0, 1.5, 2.0]);
  /// ```
  fn average(self) -> Average<Self>
  where
    Self: Sized,
    Self::Item: AsPrimitive<f64> + Send,
  {
    Average::new(self)
  }

  /// Emits the running sum of the items seen so far.
  fn sum(self) -> Sum<Self>
  where
    Self: Sized,
    Self::Item: Add<Output = Self::Item> + Copy + Send + 'static,
  {
    Sum::new(self)
  }

  /// Emits the smallest item seen so far.
  fn min(self) -> Min<Self>
  where
    Self: Sized,
    Self::Item: PartialOrd + Copy + Send + 'static,
  {
    Min::new(self)
  }

  /// Emits the largest item seen so far.
  fn max(self) -> Max<Self>
  where
    Self: Sized,
    Self::Item: PartialOrd + Copy + Send + 'static,
  {
    Max::new(self)
  }

  /// Emits how many items have been seen so far, starting at 1.
  fn count(self) -> Count<Self>
  where
    Self: Sized,
    Self::Item: Send + 'static,
  {
    Count::new(self)
  }

  /// Pairs each item with its zero-based position.
  fn index(self) -> Index<Self>
  where
    Self: Sized,
    Self::Item: Send + 'static,
  {
    Index::new(self)
  }

  /// Bridges this source into a [`futures::Stream`](futures::Stream) of
  /// `Result` items.
  ///
  /// Equivalent to [`SourceStream::new`]; see there for the demand the
  /// bridge issues and how dropping the stream cancels the subscription.
  fn into_stream(self) -> SourceStream<Self::Item>
  where
    Self: Sized + Send + 'static,
    Self::Item: Send + 'static,
  {
    SourceStream::new(self)
  }
}

impl<Src: Source> SourceExt for Src {}
