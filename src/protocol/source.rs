//! The producing side of the protocol.

use crate::protocol::Subscriber;

/// A factory of subscriptions.
///
/// Subscribing does not consume the source: each `subscribe` call creates a
/// fresh subscription with its own independent state, so the same source
/// value (or the same operator chain hanging off it) can serve many
/// consumers, sequentially or concurrently. A source backed by a one-shot
/// resource may refuse repeat subscriptions, but it does so through the
/// protocol (an immediate `on_error`), never by panicking.
///
/// Implementations deliver `on_subscribe` to the given subscriber before
/// `subscribe` returns. Everything after that follows the demand rules
/// described on [`Subscriber`] and
/// [`Subscription`](crate::protocol::Subscription).
pub trait Source {
  /// The item type this source produces.
  type Item;

  /// Wires `subscriber` to a fresh subscription on this source.
  fn subscribe<S>(&self, subscriber: S)
  where
    S: Subscriber<Item = Self::Item> + 'static;
}
