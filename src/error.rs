//! # Error Carrier
//!
//! Failure values that travel through the stream protocol.
//!
//! ## Overview
//!
//! A source that fails delivers exactly one failure to each of its
//! subscribers, and every stage between the source and the final consumer
//! relays that failure unchanged. [`StreamError`] is the carrier for that
//! contract: it wraps an arbitrary error value behind an `Arc`, so relaying
//! and recording the failure in several places (a subscriber, a test probe, a
//! log line) all observe the same underlying value rather than copies of its
//! message.
//!
//! ## Core Types
//!
//! - **[`StreamError`]**: opaque, cloneable failure relayed through the
//!   protocol
//! - **[`MessageError`]**: a plain-text failure for cases where no richer
//!   error value exists
//!
//! Operators never construct a [`StreamError`] of their own for data-path
//! reasons; the only failures a subscriber sees are the ones its upstream
//! produced. Sources construct them for genuine source-side conditions
//! (exhausted input configured to fail, protocol violations such as a
//! non-positive demand request).

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// An opaque failure produced by an upstream source and relayed verbatim.
///
/// Cloning is cheap and preserves identity: all clones point at the same
/// underlying error value, so a failure fanned out to a subscriber and a test
/// probe can still be recognized as one event via [`StreamError::ptr_eq`] or
/// inspected via [`StreamError::downcast_ref`].
///
/// # Example
///
/// ```rust
/// use streamstats::StreamError;
///
/// let boom = StreamError::message("boom");
/// let relayed = boom.clone();
/// assert!(boom.ptr_eq(&relayed));
/// assert_eq!(relayed.to_string(), "boom");
/// ```
#[derive(Clone)]
pub struct StreamError {
  inner: Arc<dyn Error + Send + Sync + 'static>,
}

impl StreamError {
  /// Wraps any error value as a stream failure.
  pub fn new<E>(error: E) -> Self
  where
    E: Error + Send + Sync + 'static,
  {
    Self {
      inner: Arc::new(error),
    }
  }

  /// Builds a failure from a plain text message.
  ///
  /// The text becomes the failure's `Display` output, backed by a
  /// [`MessageError`].
  pub fn message(message: impl Into<String>) -> Self {
    Self::new(MessageError(message.into()))
  }

  /// Attempts to view the wrapped error as a concrete type.
  pub fn downcast_ref<E>(&self) -> Option<&E>
  where
    E: Error + 'static,
  {
    self.inner.downcast_ref::<E>()
  }

  /// Returns `true` if both values wrap the very same underlying error.
  ///
  /// Relayed and cloned failures compare equal here; two separately
  /// constructed failures never do, even with identical messages.
  pub fn ptr_eq(&self, other: &StreamError) -> bool {
    Arc::ptr_eq(&self.inner, &other.inner)
  }
}

impl fmt::Debug for StreamError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_tuple("StreamError").field(&self.inner).finish()
  }
}

impl fmt::Display for StreamError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.inner)
  }
}

impl Error for StreamError {
  fn source(&self) -> Option<&(dyn Error + 'static)> {
    let inner: &(dyn Error + 'static) = &*self.inner;
    Some(inner)
  }
}

/// A simple error type that wraps a string message.
///
/// Used by [`StreamError::message`] and by sources that fail a subscription
/// for protocol reasons, where no richer error value exists.
#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct MessageError(pub String);
