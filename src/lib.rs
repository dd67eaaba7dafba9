//! # StreamStats
//!
//! Demand-driven running statistics for item streams.
//!
//! StreamStats computes running aggregates over streams of items: every
//! incoming item produces the statistic over the items seen so far, and
//! delivery is strictly bounded by the demand each subscriber has
//! requested.
//!
//! ## Key Features
//!
//! - **Pull-Based Protocol**: subscribers request demand and sources never
//!   run ahead of it
//! - **Running Statistics**: average, sum, min, max, count and index, one
//!   output item per input item
//! - **Fluent Composition**: operators chain through the [`SourceExt`]
//!   methods
//! - **Async Bridges**: any `futures` stream can feed a source and any
//!   source can be consumed as a stream
//! - **Test Probe**: a recording subscriber for exercising sources end to
//!   end
//!
//! ## Quick Start
//!
//! ```rust
//! use streamstats::sources;
//! use streamstats::{Source, SourceExt};
//! use streamstats::testing::TestSubscriber;
//!
//! let readings = sources::iter([12.0, 14.0, 16.0]);
//! let probe = TestSubscriber::with_demand(10);
//! readings.average().subscribe(probe.clone());
//! probe.assert_items(&[12.0, 13.0, 14.0]);
//! probe.assert_completed();
//! ```
//!
//! Sources deliver on the subscribing thread; the [`adapters`] module holds
//! the bridges to and from `futures` streams for async pipelines.

// Documentation enforcement - treat missing docs as errors
#![deny(missing_docs)]

/// Bridges between sources and `futures` streams.
pub mod adapters;
/// The shared error type carried by failure signals.
pub mod error;
/// Running statistics operators and the fluent extension trait.
pub mod operators;
/// The subscription protocol: sources, subscribers, demand and signals.
pub mod protocol;
/// Built-in sources to feed the operators.
pub mod sources;
/// A recording subscriber for tests.
pub mod testing;

pub use adapters::{SourceStream, StreamSource};
pub use error::{MessageError, StreamError};
pub use operators::{Average, Count, Index, Max, Min, SourceExt, Sum};
pub use protocol::{Signal, Source, Subscriber, Subscription};
