//! Delivery through the async bridges.

use futures::{StreamExt, stream};
use rand::Rng;
use streamstats::adapters::StreamSource;
use streamstats::sources;
use streamstats::testing::TestSubscriber;
use streamstats::{Source, SourceExt, StreamError};
use tokio_stream::wrappers::UnboundedReceiverStream;

#[tokio::test]
async fn test_stream_backed_average() {
  let probe = TestSubscriber::with_demand(10);
  StreamSource::infallible(stream::iter([2.0, 4.0, 9.0]))
    .average()
    .subscribe(probe.clone());
  probe.await_completion().await;
  probe.assert_items(&[2.0, 3.0, 5.0]);
}

#[tokio::test]
async fn test_stream_failure_crosses_the_pipeline() {
  let error = StreamError::message("socket closed");
  let items = vec![Ok(1.0), Ok(3.0), Err(error.clone())];
  let probe = TestSubscriber::with_demand(10);
  StreamSource::new(stream::iter(items))
    .average()
    .subscribe(probe.clone());
  let delivered = probe.await_failure().await;
  assert!(delivered.ptr_eq(&error));
  probe.assert_items(&[1.0, 2.0]);
}

#[tokio::test]
async fn test_running_mean_matches_direct_computation() {
  let mut rng = rand::thread_rng();
  let values: Vec<f64> = (0..200).map(|_| rng.gen_range(-1000.0..1000.0)).collect();
  let probe = TestSubscriber::with_demand(u64::MAX);
  StreamSource::infallible(stream::iter(values.clone()))
    .average()
    .subscribe(probe.clone());
  probe.await_completion().await;
  let items = probe.items();
  assert_eq!(items.len(), values.len());
  // Same sums in the same order, so the comparison is exact.
  let mut sum = 0.0;
  for (position, item) in items.iter().enumerate() {
    sum += values[position];
    assert_eq!(*item, sum / (position + 1) as f64);
  }
}

#[tokio::test(flavor = "multi_thread")]
async fn test_channel_fed_pipeline_across_tasks() {
  let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
  let probe = TestSubscriber::with_demand(u64::MAX);
  StreamSource::infallible(UnboundedReceiverStream::new(receiver))
    .sum()
    .subscribe(probe.clone());
  let feeder = tokio::spawn(async move {
    for value in [5, 10, 15] {
      sender.send(value).expect("receiver alive");
      tokio::task::yield_now().await;
    }
  });
  probe.await_items(3).await;
  probe.assert_items(&[5, 15, 30]);
  feeder.await.expect("feeder panicked");
  probe.await_completion().await;
}

#[tokio::test]
async fn test_cancelling_a_pending_async_source_stays_silent() {
  let (sender, receiver) = tokio::sync::mpsc::unbounded_channel::<f64>();
  let probe = TestSubscriber::with_demand(10);
  StreamSource::infallible(UnboundedReceiverStream::new(receiver)).subscribe(probe.clone());
  tokio::task::yield_now().await;
  probe.cancel();
  // The delivery task drops the stream on cancel, which closes the sender.
  sender.closed().await;
  probe.assert_items(&[]);
  probe.assert_not_terminated();
}

#[tokio::test]
async fn test_cancelling_mid_stream_stops_async_delivery() {
  let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
  let probe = TestSubscriber::with_demand(10);
  StreamSource::infallible(UnboundedReceiverStream::new(receiver)).subscribe(probe.clone());
  sender.send(4.0).expect("receiver alive");
  sender.send(6.0).expect("receiver alive");
  probe.await_items(2).await;
  probe.cancel();
  // A value sent after the cancel must never reach the subscriber.
  let _ = sender.send(100.0);
  sender.closed().await;
  probe.assert_items(&[4.0, 6.0]);
  probe.assert_not_terminated();
}

#[tokio::test]
async fn test_source_consumed_as_a_stream() {
  let collected: Vec<f64> = sources::iter([1, 2, 3])
    .average()
    .into_stream()
    .map(|item| item.expect("source cannot fail"))
    .collect()
    .await;
  assert_eq!(collected, vec![1.0, 1.5, 2.0]);
}

#[tokio::test]
async fn test_bridges_compose_end_to_end() {
  let collected: Vec<u64> = StreamSource::infallible(stream::iter([10, 20, 30]))
    .count()
    .into_stream()
    .map(|item| item.expect("count cannot fail"))
    .collect()
    .await;
  assert_eq!(collected, vec![1, 2, 3]);
}
