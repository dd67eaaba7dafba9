//! The event vocabulary of a stream.

use crate::error::StreamError;

/// One event observed on a subscription.
///
/// A well-behaved stream is any number of `Item`s followed by at most one
/// terminal signal. `Complete` and `Error` are mutually exclusive.
#[derive(Debug, Clone)]
pub enum Signal<T> {
  /// A data item, delivered only against outstanding demand.
  Item(T),
  /// Normal end of the stream.
  Complete,
  /// Abnormal end of the stream, carrying the upstream failure.
  Error(StreamError),
}

impl<T> Signal<T> {
  /// Returns `true` for `Complete` and `Error`.
  pub fn is_terminal(&self) -> bool {
    !matches!(self, Signal::Item(_))
  }
}
