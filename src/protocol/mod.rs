//! # Stream Protocol
//!
//! The demand-driven pull protocol every component in this crate speaks.
//!
//! ## Overview
//!
//! Three capability traits and one vocabulary type describe the whole
//! contract:
//!
//! - **[`Source`]**: a factory of subscriptions; each `subscribe` call wires
//!   up fresh, independent per-subscription state
//! - **[`Subscriber`]**: the receiving side; signal handlers take `&mut self`
//!   because delivery for one subscription is serialized by contract
//! - **[`Subscription`]**: the control handle flowing back up; `request` and
//!   `cancel` may be called from any thread, so handles are shared and
//!   internally atomic
//! - **[`Signal`]**: the three events a stream can carry (an item, normal
//!   completion, a failure)
//!
//! ## Flow control
//!
//! Nothing is pushed uninvited: a source may deliver at most as many items as
//! its subscriber has requested. Completion and failure are not subject to
//! demand and may arrive at any point, including before the first request.
//! Once any terminal signal (completion, failure, or cancellation) has been
//! observed for a subscription, every later signal on it is discarded.

pub mod signal;
pub mod source;
pub mod subscriber;
pub mod subscription;

pub use signal::Signal;
pub use source::Source;
pub use subscriber::Subscriber;
pub use subscription::Subscription;
