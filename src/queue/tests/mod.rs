//! Test modules for the queue system
//!
//! Tests are organized by functional area for better maintainability.


use crate::queue::QueueConsumer;
use std::time::Duration;

/// Short wait used to assert that a consumer is parked
pub(super) const PARKED: Duration = Duration::from_millis(30);

/// Pull one item, failing the test if the cycle ended or errored
pub(super) async fn pull<T>(consumer: &mut QueueConsumer<T>) -> T {
    match consumer.next().await {
        Some(Ok(item)) => item,
        Some(Err(error)) => panic!("consumer failed: {}", error),
        None => panic!("consumption cycle ended unexpectedly"),
    }
}

/// Assert the consumer has nothing to deliver right now
pub(super) async fn assert_parked<T>(consumer: &mut QueueConsumer<T>) {
    assert!(
        consumer.next_within(PARKED).await.is_err(),
        "consumer should be waiting for new items"
    );
}
