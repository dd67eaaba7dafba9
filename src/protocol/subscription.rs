//! The control handle a subscriber uses to pull items and to walk away.

/// Demand and cancellation control for one subscription.
///
/// Handles are shared (`Arc<dyn Subscription>`) and may be driven from a
/// different thread than the one delivering signals, so both methods take
/// `&self`; implementations coordinate through atomics.
///
/// # Contract
///
/// - `request(n)` with `n > 0` adds `n` to the outstanding demand.
///   Implementations saturate at `u64::MAX` rather than overflow.
/// - `request(0)` is a protocol violation. Sources answer it by failing the
///   subscription with a descriptive error; intermediate operators forward
///   demand verbatim and inherit the rule from their upstream.
/// - After the subscription has terminated (completion, failure, or
///   cancellation), `request` is a no-op.
/// - `cancel` is idempotent and propagates upstream at most once. Signals
///   already in flight when `cancel` wins the race are dropped, never
///   delivered.
pub trait Subscription: Send + Sync {
  /// Asks the source for up to `n` further items.
  fn request(&self, n: u64);

  /// Abandons the subscription.
  fn cancel(&self);
}
