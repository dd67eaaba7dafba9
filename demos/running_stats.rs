//! # Running statistics over a demand-driven pipeline
//!
//! Demonstrates:
//! - **Sources**: turning a vector into a replayable demand-driven source.
//! - **Operators**: `average` and `min` emit one running value per input.
//! - **Adapters**: consuming any source as a `futures::Stream`, and lifting
//!   an async stream into a source so the same operators apply.
//!
//! Run with `RUST_LOG=trace` to watch subscriptions, demand, and terminals
//! move through the pipeline.

use futures::StreamExt;
use streamstats::{SourceExt, StreamSource};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
  tracing_subscriber::fmt::init();

  println!("=== Running average over a vector ===");
  let readings = vec![12.0_f64, 14.5, 9.75, 20.0];
  let mut averages = streamstats::sources::iter(readings.clone())
    .average()
    .into_stream();
  while let Some(value) = averages.next().await {
    println!("running average: {}", value?);
  }

  println!("\n=== Running minimum over an async stream ===");
  let mut minima = StreamSource::infallible(tokio_stream::iter(readings))
    .min()
    .into_stream();
  while let Some(value) = minima.next().await {
    println!("running minimum: {}", value?);
  }

  println!("\nDone.");
  Ok(())
}
