//! Consumption, termination and cancellation of `ApexStream`

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures_util::{StreamExt, stream};
use macrocosmos::SdkError;
use macrocosmos::streaming::{AbortController, ApexStream, GrpcSource};
use tracing_test::traced_test;

use crate::support::fake_source::fake_source;

fn source_error() -> SdkError {
    SdkError::rpc(tonic::Code::Internal, "miner crashed")
}

#[tokio::test]
async fn items_are_yielded_in_emission_order() {
    let (source, handle) = fake_source::<u32>();
    let mut stream = ApexStream::from_source(source, AbortController::new());

    for i in 1..=5 {
        assert!(handle.data(i));
    }
    handle.end();

    let items: Vec<u32> = stream
        .stream()
        .unwrap()
        .map(|item| item.unwrap())
        .collect()
        .await;
    assert_eq!(items, vec![1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn events_pushed_while_consuming_keep_their_order() {
    let (source, handle) = fake_source::<u32>();
    let mut stream = ApexStream::from_source(source, AbortController::new());
    let mut items = stream.stream().unwrap();

    let producer = tokio::spawn(async move {
        for i in 0..100 {
            handle.data(i);
            if i % 10 == 0 {
                tokio::task::yield_now().await;
            }
        }
        handle.end();
        handle
    });

    let mut seen = Vec::new();
    while let Some(item) = items.next().await {
        seen.push(item.unwrap());
    }
    let handle = producer.await.unwrap();

    assert_eq!(seen, (0..100).collect::<Vec<_>>());
    assert_eq!(handle.cancel_count(), 0);
}

#[tokio::test]
async fn second_iteration_fails_after_completion() {
    let (source, handle) = fake_source::<u32>();
    let mut stream = ApexStream::from_source(source, AbortController::new());
    handle.data(1);
    handle.end();

    let first: Vec<_> = stream.stream().unwrap().collect().await;
    assert_eq!(first.len(), 1);

    let err = stream.stream().err().unwrap();
    assert_eq!(err, SdkError::StreamConsumed);
    assert_eq!(
        err.to_string(),
        "Cannot iterate over a consumed stream, use `.tee()` to split the stream."
    );
}

#[tokio::test]
async fn second_iteration_fails_while_first_is_pending() {
    let (source, _handle) = fake_source::<u32>();
    let mut stream = ApexStream::from_source(source, AbortController::new());

    let _first = stream.stream().unwrap();
    assert!(stream.is_consumed());
    assert!(stream.stream().err().unwrap().is_stream_consumed());
}

#[tokio::test]
async fn error_surfaces_at_its_position_and_ends_the_stream() {
    let (source, handle) = fake_source::<u32>();
    let mut stream = ApexStream::from_source(source, AbortController::new());

    handle.data(1);
    handle.data(2);
    handle.error(source_error());
    handle.data(3);

    let results: Vec<_> = stream.stream().unwrap().collect().await;
    assert_eq!(results, vec![Ok(1), Ok(2), Err(source_error())]);
    // The source failed on its own; nothing to cancel.
    assert_eq!(handle.cancel_count(), 0);
    assert_eq!(handle.unsubscribe_count(), 1);
}

#[tokio::test]
#[traced_test]
async fn abort_ends_silently_and_cancels_once() {
    let (source, handle) = fake_source::<u32>();
    let controller = AbortController::new();
    let mut stream = ApexStream::from_source(source, controller.clone());
    let mut items = stream.stream().unwrap();

    handle.data(1);
    handle.data(2);
    assert_eq!(items.next().await, Some(Ok(1)));

    controller.abort();
    // The queued item is not delivered after abort.
    assert_eq!(items.next().await, None);
    assert_eq!(items.next().await, None);
    drop(items);

    assert_eq!(handle.cancel_count(), 1);
    assert_eq!(handle.unsubscribe_count(), 1);
    assert!(logs_contain("stream aborted by caller"));
}

#[tokio::test]
async fn abort_between_polls_cancels_the_source_immediately() {
    let (source, handle) = fake_source::<u32>();
    let controller = AbortController::new();
    let mut stream = ApexStream::from_source(source, controller.clone());
    let mut items = stream.stream().unwrap();

    handle.data(1);
    assert_eq!(items.next().await, Some(Ok(1)));

    // The consumer is busy elsewhere and does not poll.
    controller.abort();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(handle.cancel_count(), 1);

    assert_eq!(items.next().await, None);
    drop(items);
    assert_eq!(handle.cancel_count(), 1);
    assert_eq!(handle.unsubscribe_count(), 1);
}

#[tokio::test]
async fn abort_between_polls_stops_the_grpc_pump() {
    let pulled = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pulled);
    let responses = stream::iter(0u32..).then(move |i| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move {
            tokio::task::yield_now().await;
            Ok::<_, tonic::Status>(i)
        }
    });
    let source = GrpcSource::new(responses).with_method("ChatCompletionStream");
    let mut stream = ApexStream::from_source(source, AbortController::new());
    let mut items = stream.stream().unwrap();

    assert_eq!(items.next().await, Some(Ok(0)));
    stream.abort();
    tokio::time::sleep(Duration::from_millis(20)).await;
    let after_abort = pulled.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(pulled.load(Ordering::SeqCst), after_abort, "pump kept reading");
    assert_eq!(items.next().await, None);
}

#[tokio::test]
async fn abort_wakes_an_idle_consumer() {
    let (source, handle) = fake_source::<u32>();
    let mut stream = ApexStream::from_source(source, AbortController::new());
    let controller = stream.controller().clone();
    let mut items = stream.stream().unwrap();

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        controller.abort();
    });

    let next = tokio::time::timeout(Duration::from_secs(1), items.next())
        .await
        .expect("abort should end the wait");
    assert!(next.is_none());
    drop(items);
    assert_eq!(handle.cancel_count(), 1);
}

#[tokio::test]
async fn abort_before_first_poll_yields_nothing() {
    let (source, handle) = fake_source::<u32>();
    let mut stream = ApexStream::from_source(source, AbortController::new());
    handle.data(1);
    stream.abort();

    let items: Vec<_> = stream.stream().unwrap().collect().await;
    assert!(items.is_empty());
    assert_eq!(handle.cancel_count(), 1);
}

#[tokio::test]
async fn idle_source_blocks_the_consumer() {
    let (source, handle) = fake_source::<u32>();
    let mut stream = ApexStream::from_source(source, AbortController::new());
    let mut items = stream.stream().unwrap();

    let waited = tokio::time::timeout(Duration::from_millis(50), items.next()).await;
    assert!(waited.is_err(), "no timeout is applied by the adapter");

    // Still usable afterwards.
    handle.data(7);
    assert_eq!(items.next().await, Some(Ok(7)));
}

#[tokio::test]
async fn dropping_mid_stream_cancels_the_source() {
    let (source, handle) = fake_source::<u32>();
    let controller = AbortController::new();
    let mut stream = ApexStream::from_source(source, controller.clone());
    let mut items = stream.stream().unwrap();

    handle.data(1);
    handle.data(2);
    assert_eq!(items.next().await, Some(Ok(1)));
    drop(items);

    assert_eq!(handle.cancel_count(), 1);
    assert_eq!(handle.unsubscribe_count(), 1);
    assert!(controller.is_aborted());
    assert!(!handle.data(3), "adapter detached from the source");
}

#[tokio::test]
async fn natural_end_does_not_cancel() {
    let (source, handle) = fake_source::<u32>();
    let controller = AbortController::new();
    let mut stream = ApexStream::from_source(source, controller.clone());
    handle.data(1);
    handle.end();

    let items: Vec<_> = stream.stream().unwrap().collect().await;
    assert_eq!(items, vec![Ok(1)]);
    assert_eq!(handle.subscribe_count(), 1);
    assert_eq!(handle.unsubscribe_count(), 1);
    assert_eq!(handle.cancel_count(), 0);
    assert!(!controller.is_aborted());
}
