//! End-to-end behavior of the statistics operators over built-in sources.

use streamstats::sources;
use streamstats::testing::TestSubscriber;
use streamstats::{Source, SourceExt, StreamError};

#[test]
fn test_staged_demand_walks_the_running_mean() {
  let probe = TestSubscriber::with_demand(3);
  sources::iter([1.0, 2.0, 3.0, 4.0, 2.0, 5.0])
    .average()
    .subscribe(probe.clone());
  probe.assert_items(&[1.0, 1.5, 2.0]);
  probe.assert_not_terminated();
  probe.request(10);
  probe.assert_items(&[1.0, 1.5, 2.0, 2.5, 2.4, 17.0 / 6.0]);
  probe.assert_completed();
}

#[test]
fn test_failure_preserves_partial_output() {
  let error = StreamError::message("sensor dropped");
  let probe = TestSubscriber::with_demand(10);
  sources::iter([1.0, 2.0, 3.0, 4.0, 2.0])
    .with_failure(error.clone())
    .average()
    .subscribe(probe.clone());
  probe.assert_items(&[1.0, 1.5, 2.0, 2.5, 2.4]);
  assert!(probe.failure().is_some_and(|delivered| delivered.ptr_eq(&error)));
}

#[test]
fn test_empty_input_completes_with_zero_demand() {
  let probe = TestSubscriber::new();
  sources::empty::<f64>().average().subscribe(probe.clone());
  probe.assert_items(&[]);
  probe.assert_completed();
}

#[test]
fn test_silent_source_stays_silent_through_operators() {
  let probe = TestSubscriber::with_demand(5);
  sources::never::<i32>().sum().subscribe(probe.clone());
  probe.assert_items(&[]);
  probe.assert_not_terminated();
  probe.cancel();
  probe.assert_not_terminated();
}

#[test]
fn test_operators_compose() {
  let probe = TestSubscriber::with_demand(10);
  sources::iter([1, 2, 3]).sum().average().subscribe(probe.clone());
  probe.assert_items(&[1.0, 2.0, 10.0 / 3.0]);
  probe.assert_completed();
}

#[test]
fn test_extremes_and_positions_over_one_input() {
  let input = [7, 3, 9, 1];

  let minima = TestSubscriber::with_demand(10);
  sources::iter(input).min().subscribe(minima.clone());
  minima.assert_items(&[7, 3, 3, 1]);

  let maxima = TestSubscriber::with_demand(10);
  sources::iter(input).max().subscribe(maxima.clone());
  maxima.assert_items(&[7, 7, 9, 9]);

  let indexed = TestSubscriber::with_demand(10);
  sources::iter(input).index().subscribe(indexed.clone());
  indexed.assert_items(&[(0, 7), (1, 3), (2, 9), (3, 1)]);
}
