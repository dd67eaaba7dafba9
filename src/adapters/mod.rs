//! Bridges between sources and `futures` streams.
//!
//! [`StreamSource`] turns a `futures` [`Stream`](futures::Stream) into a
//! [`Source`](crate::Source), delivering its items from a spawned tokio
//! task. [`SourceStream`] goes the other way: it drives a source with a
//! prefetch window of demand and exposes the output as a stream of
//! `Result` items.

pub mod source_stream;
pub mod stream_source;

pub use source_stream::*;
pub use stream_source::*;
