//! The receiving side of a subscription.

use std::sync::Arc;

use crate::error::StreamError;
use crate::protocol::Subscription;

/// A consumer of one subscription's signals.
///
/// Delivery is serialized by contract: the upstream never invokes two signal
/// handlers concurrently for the same subscription, which is why every
/// handler takes `&mut self` and implementations need no locking on their
/// signal path. Sources that cannot uphold serialization themselves must be
/// wrapped in a serializing collaborator (see the `adapters` module) before
/// they face a subscriber.
///
/// # Contract
///
/// - `on_subscribe` is delivered exactly once, before any other signal, and
///   before the originating [`Source::subscribe`](crate::protocol::Source)
///   call returns.
/// - `on_item` is delivered at most as many times as demand was requested.
/// - At most one of `on_complete` / `on_error` is delivered, after which the
///   subscription is terminated and nothing further arrives.
pub trait Subscriber: Send {
  /// The item type this subscriber consumes.
  type Item;

  /// Receives the control handle for this subscription.
  fn on_subscribe(&mut self, subscription: Arc<dyn Subscription>);

  /// Receives one item, against previously requested demand.
  fn on_item(&mut self, item: Self::Item);

  /// Receives the normal end of the stream.
  fn on_complete(&mut self);

  /// Receives the failure that ended the stream.
  fn on_error(&mut self, error: StreamError);
}
