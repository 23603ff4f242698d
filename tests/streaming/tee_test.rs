//! Splitting an `ApexStream` with `tee`

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::{StreamExt, stream};
use macrocosmos::SdkError;
use macrocosmos::streaming::{AbortController, ApexStream};

use crate::support::fake_source::fake_source;

#[tokio::test]
async fn both_children_see_every_item_and_upstream_is_pulled_once_per_item() {
    let pulls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&pulls);
    let upstream = stream::iter(vec![Ok(1u32), Ok(2), Ok(3)]).inspect(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let mut parent = ApexStream::new(upstream, AbortController::new());

    let (mut left, mut right) = parent.tee().unwrap();
    let left: Vec<u32> = left.stream().unwrap().map(Result::unwrap).collect().await;
    let right: Vec<u32> = right.stream().unwrap().map(Result::unwrap).collect().await;

    assert_eq!(left, vec![1, 2, 3]);
    assert_eq!(right, vec![1, 2, 3]);
    assert_eq!(pulls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn children_can_be_read_concurrently() {
    let (source, handle) = fake_source::<u32>();
    let mut parent = ApexStream::from_source(source, AbortController::new());
    let (mut left, mut right) = parent.tee().unwrap();
    let left = left.stream().unwrap();
    let right = right.stream().unwrap();

    let left_task = tokio::spawn(left.map(Result::unwrap).collect::<Vec<_>>());
    let right_task = tokio::spawn(right.map(Result::unwrap).collect::<Vec<_>>());

    for i in 0..20 {
        handle.data(i);
        tokio::task::yield_now().await;
    }
    handle.end();

    let expected: Vec<u32> = (0..20).collect();
    assert_eq!(left_task.await.unwrap(), expected);
    assert_eq!(right_task.await.unwrap(), expected);
    assert_eq!(handle.cancel_count(), 0);
}

#[tokio::test]
async fn tee_after_consumption_fails() {
    let mut parent = ApexStream::new(stream::iter(vec![Ok(1u32)]), AbortController::new());
    let _items = parent.stream().unwrap();

    assert!(matches!(parent.tee(), Err(SdkError::StreamConsumed)));
}

#[tokio::test]
async fn parent_and_children_are_single_use() {
    let mut parent = ApexStream::new(stream::iter(vec![Ok(1u32)]), AbortController::new());
    let (mut left, _right) = parent.tee().unwrap();

    assert!(parent.stream().err().unwrap().is_stream_consumed());
    let _items = left.stream().unwrap();
    assert!(left.stream().err().unwrap().is_stream_consumed());
}

#[tokio::test]
async fn error_is_replayed_to_both_children() {
    let (source, handle) = fake_source::<u32>();
    let mut parent = ApexStream::from_source(source, AbortController::new());
    let err = SdkError::rpc(tonic::Code::Unavailable, "connection reset");

    handle.data(1);
    handle.error(err.clone());

    let (mut left, mut right) = parent.tee().unwrap();
    let left: Vec<_> = left.stream().unwrap().collect().await;
    let right: Vec<_> = right.stream().unwrap().collect().await;

    assert_eq!(left, vec![Ok(1), Err(err.clone())]);
    assert_eq!(right, vec![Ok(1), Err(err)]);
    assert_eq!(handle.cancel_count(), 0);
}

#[tokio::test]
async fn aborting_one_child_stops_both_and_cancels_the_source() {
    let (source, handle) = fake_source::<u32>();
    let mut parent = ApexStream::from_source(source, AbortController::new());
    let (mut left, mut right) = parent.tee().unwrap();
    let mut left_items = left.stream().unwrap();
    let mut right_items = right.stream().unwrap();

    handle.data(1);
    assert_eq!(left_items.next().await, Some(Ok(1)));

    left.abort();
    assert!(right.controller().is_aborted());
    assert_eq!(left_items.next().await, None);
    assert_eq!(right_items.next().await, None);

    drop(left_items);
    drop(right_items);
    assert_eq!(handle.cancel_count(), 1);
}

#[tokio::test]
async fn dropping_one_child_leaves_the_other_running() {
    let (source, handle) = fake_source::<u32>();
    let mut parent = ApexStream::from_source(source, AbortController::new());
    let (left, mut right) = parent.tee().unwrap();
    drop(left);

    handle.data(1);
    handle.data(2);
    handle.end();

    let right: Vec<u32> = right.stream().unwrap().map(Result::unwrap).collect().await;
    assert_eq!(right, vec![1, 2]);
    assert_eq!(handle.cancel_count(), 0);
}
