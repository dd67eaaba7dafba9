//! Sources that feed the statistics operators.
//!
//! All of them deliver their signals on the subscribing thread, honor the
//! demand their subscriber has requested and hand over an
//! `on_subscribe` before anything else:
//!
//! * **[`iter`]**: replays a cloneable collection, optionally ending in an
//!   armed failure
//! * **[`empty`]**: completes at subscribe time
//! * **[`never`]**: accepts demand and stays silent
//! * **[`fail`]**: fails at subscribe time with a given error
//!
//! Terminal signals alone are exempt from demand: a source that has nothing
//! left to say ends the stream whether or not anything was requested.

use tracing::trace;

use crate::error::StreamError;
use crate::protocol::Subscription;

pub mod empty;
pub mod fail;
pub mod iter;
pub mod never;

pub use empty::*;
pub use fail::*;
pub use iter::*;
pub use never::*;

/// Creates a source that replays `items` for every subscriber.
///
/// The collection is cloned per subscription, so each subscriber walks its
/// own iterator from the start.
///
/// # Example
///
/// ```rust
/// use streamstats::sources;
/// use streamstats::{Source, SourceExt};
/// use streamstats::testing::TestSubscriber;
///
/// let probe = TestSubscriber::with_demand(10);
/// sources::iter([1, 2, 3, 4]).sum().subscribe(probe.clone());
/// probe.assert_items(&[1, 3, 6, 10]);
/// ```
pub fn iter<I>(items: I) -> IterSource<I>
where
  I: IntoIterator + Clone,
{
  IterSource::new(items)
}

/// Creates a source that completes every subscriber at subscribe time.
pub fn empty<T>() -> EmptySource<T> {
  EmptySource::new()
}

/// Creates a source that accepts demand but never signals.
pub fn never<T>() -> NeverSource<T> {
  NeverSource::new()
}

/// Creates a source that fails every subscriber at subscribe time.
pub fn fail<T>(error: StreamError) -> FailSource<T> {
  FailSource::new(error)
}

/// The subscription handed out alongside a terminal delivered at subscribe
/// time. There is nothing left to request and nothing left to cancel.
pub(crate) struct InertSubscription;

impl Subscription for InertSubscription {
  fn request(&self, n: u64) {
    trace!(demand = n, "InertSubscription: request after terminal ignored");
  }

  fn cancel(&self) {}
}

/// The failure delivered when a subscriber requests zero items.
pub(crate) fn demand_violation() -> StreamError {
  StreamError::message("requested demand must be greater than zero")
}
