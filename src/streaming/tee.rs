//! Splitting one stream into two independent readers.
//!
//! Each upstream item is pulled once and buffered for the side that has not
//! read it yet, so the two halves may progress at different speeds.

use std::collections::VecDeque;
use std::sync::{Arc, MutexGuard, PoisonError};

use futures::Stream;
use futures_util::StreamExt;

use super::abort::AbortSignal;
use super::stream::ItemStream;
use crate::error::Result;

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

impl Side {
    fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }

    fn sibling(self) -> usize {
        1 - self.index()
    }
}

struct Buffers<T> {
    /// Items pulled by one side and not yet read by the other. `None` marks
    /// upstream exhaustion.
    pending: [VecDeque<Option<Result<T>>>; 2],
    /// The sibling side was dropped; stop buffering for it.
    closed: [bool; 2],
    exhausted: bool,
}

struct Shared<T> {
    upstream: tokio::sync::Mutex<ItemStream<T>>,
    /// Never held across an await point.
    buffers: std::sync::Mutex<Buffers<T>>,
}

impl<T: Clone> Shared<T> {
    fn buffers(&self) -> MutexGuard<'_, Buffers<T>> {
        self.buffers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pop(&self, side: Side) -> Option<Option<Result<T>>> {
        let mut buffers = self.buffers();
        match buffers.pending[side.index()].pop_front() {
            Some(buffered) => Some(buffered),
            None if buffers.exhausted => Some(None),
            None => None,
        }
    }

    async fn pull(&self, side: Side) -> Option<Result<T>> {
        if let Some(buffered) = self.pop(side) {
            return buffered;
        }

        let mut upstream = self.upstream.lock().await;

        // The sibling may have pulled while this side waited for the lock.
        if let Some(buffered) = self.pop(side) {
            return buffered;
        }

        let next = upstream.next().await;

        let mut buffers = self.buffers();
        if matches!(next, None | Some(Err(_))) {
            buffers.exhausted = true;
        }
        if !buffers.closed[side.sibling()] {
            buffers.pending[side.sibling()].push_back(next.clone());
        }
        next
    }

    fn close(&self, side: Side) {
        let mut buffers = self.buffers();
        buffers.closed[side.index()] = true;
        buffers.pending[side.index()].clear();
    }
}

struct CloseOnDrop<T: Clone> {
    shared: Arc<Shared<T>>,
    side: Side,
}

impl<T: Clone> Drop for CloseOnDrop<T> {
    fn drop(&mut self) {
        self.shared.close(self.side);
    }
}

fn child<T>(
    shared: Arc<Shared<T>>,
    side: Side,
    signal: AbortSignal,
) -> impl Stream<Item = Result<T>> + Send + 'static
where
    T: Clone + Send + 'static,
{
    let guard = CloseOnDrop { shared, side };
    async_stream::stream! {
        let guard = guard;
        loop {
            if signal.is_aborted() {
                break;
            }
            let next = tokio::select! {
                biased;
                _ = signal.aborted() => None,
                next = guard.shared.pull(guard.side) => next,
            };
            match next {
                Some(Ok(item)) => {
                    if signal.is_aborted() {
                        break;
                    }
                    yield Ok(item);
                }
                Some(Err(err)) => {
                    yield Err(err);
                    break;
                }
                None => break,
            }
        }
    }
}

/// Split `upstream` into two streams that each observe every item, and a
/// terminal error, in the original order.
pub(crate) fn tee_stream<T>(
    upstream: ItemStream<T>,
    signal: AbortSignal,
) -> (
    impl Stream<Item = Result<T>> + Send + 'static,
    impl Stream<Item = Result<T>> + Send + 'static,
)
where
    T: Clone + Send + 'static,
{
    let shared = Arc::new(Shared {
        upstream: tokio::sync::Mutex::new(upstream),
        buffers: std::sync::Mutex::new(Buffers {
            pending: [VecDeque::new(), VecDeque::new()],
            closed: [false, false],
            exhausted: false,
        }),
    });
    (
        child(Arc::clone(&shared), Side::Left, signal.clone()),
        child(shared, Side::Right, signal),
    )
}
