//! Streaming response adapter
//!
//! [`ApexStream`] presents a push-based, cancellable source as a lazy,
//! single-use stream of items:
//!
//! - items are yielded in exactly the order the source emitted them
//! - a source error is yielded at its position and ends the stream
//! - aborting through the [`AbortController`] ends the stream silently and
//!   cancels the source right away, whether or not the consumer is polling
//! - a second iteration attempt fails with [`SdkError::StreamConsumed`]
//!
//! Teardown is tied to the lifetime of the consumer's stream: however the
//! consumer stops (drained, failed, aborted, or simply dropped), the source is
//! unsubscribed and, if it was still producing, cancelled.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut stream = client.chat_completion_stream(request).await?;
//! let mut chunks = stream.stream()?;
//! while let Some(chunk) = chunks.next().await {
//!     let chunk = chunk?;
//!     // ...
//! }
//! ```

use std::marker::PhantomData;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::Stream;
use serde::Serialize;
use tokio::task::JoinHandle;

use super::abort::AbortController;
use super::bytes::{ByteStream, encode_json_lines};
use super::source::{EventSink, SourceEvent, StreamSource};
use super::tee::tee_stream;
use crate::error::{Result, SdkError};

/// Pinned, boxed stream of items produced by an [`ApexStream`].
pub type ItemStream<T> = Pin<Box<dyn Stream<Item = Result<T>> + Send>>;

/// Single-use, cancellable stream of server-pushed items.
pub struct ApexStream<T> {
    inner: Option<ItemStream<T>>,
    controller: AbortController,
}

impl<T> std::fmt::Debug for ApexStream<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApexStream")
            .field("consumed", &self.is_consumed())
            .field("aborted", &self.controller.is_aborted())
            .finish()
    }
}

impl<T: Send + 'static> ApexStream<T> {
    /// Adapt a push-based source.
    ///
    /// The adapter's sink is registered immediately. Events pushed before the
    /// first poll are queued, never dropped.
    pub fn from_source<S>(mut source: S, controller: AbortController) -> Self
    where
        S: StreamSource<T> + 'static,
    {
        let (sink, mut events) = EventSink::channel();
        source.subscribe(sink);
        let signal = controller.signal();
        let state = Arc::new(Mutex::new(SourceState {
            source,
            finished: false,
            cancelled: false,
            _item: PhantomData,
        }));
        let guard = SourceGuard {
            listener: spawn_abort_listener(&state, &controller),
            state,
            controller: controller.clone(),
        };

        let stream = async_stream::stream! {
            loop {
                let event = tokio::select! {
                    biased;
                    _ = signal.aborted() => None,
                    event = events.recv() => Some(event),
                };

                match event {
                    None => {
                        guard.cancel_on_abort();
                        break;
                    }
                    Some(Some(SourceEvent::Data(item))) => {
                        yield Ok(item);
                    }
                    Some(Some(SourceEvent::End)) => {
                        guard.finish();
                        break;
                    }
                    Some(None) => {
                        // Every sink clone is gone; nothing can arrive any more.
                        tracing::debug!(
                            target: "macrocosmos::streaming",
                            "stream source dropped its sink without signalling end"
                        );
                        guard.finish();
                        break;
                    }
                    Some(Some(SourceEvent::Error(err))) => {
                        guard.finish();
                        yield Err(err);
                        break;
                    }
                }
            }
        };

        Self::new(stream, controller)
    }

    /// Wrap an already pull-based stream.
    pub fn new<S>(stream: S, controller: AbortController) -> Self
    where
        S: Stream<Item = Result<T>> + Send + 'static,
    {
        Self {
            inner: Some(Box::pin(stream)),
            controller,
        }
    }

    /// Take the stream of items.
    ///
    /// Can be called once; later calls fail with [`SdkError::StreamConsumed`].
    /// Use [`tee`](Self::tee) to read the same items twice.
    pub fn stream(&mut self) -> Result<ItemStream<T>> {
        self.inner.take().ok_or(SdkError::StreamConsumed)
    }

    /// Split into two streams which can be read independently and at
    /// different speeds.
    ///
    /// The source is read once per item; each item (and a terminal error) is
    /// replayed to both halves. Both halves share this stream's
    /// [`AbortController`], so aborting either one stops both. Dropping one
    /// half leaves the other running.
    pub fn tee(&mut self) -> Result<(ApexStream<T>, ApexStream<T>)>
    where
        T: Clone,
    {
        let upstream = self.stream()?;
        let (left, right) = tee_stream(upstream, self.controller.signal());
        Ok((
            ApexStream::new(left, self.controller.clone()),
            ApexStream::new(right, self.controller.clone()),
        ))
    }

    /// Serialize each item as one JSON line (`<json>\n`), one chunk per item.
    ///
    /// Dropping the returned stream cancels the source.
    pub fn byte_stream(&mut self) -> Result<ByteStream>
    where
        T: Serialize,
    {
        Ok(encode_json_lines(self.stream()?))
    }

    /// [`byte_stream`](Self::byte_stream) as an `AsyncRead`, for piping into
    /// files or sockets.
    pub fn byte_reader(&mut self) -> Result<impl tokio::io::AsyncRead + Send + Unpin + 'static>
    where
        T: Serialize,
    {
        let bytes = self.byte_stream()?;
        Ok(tokio_util::io::StreamReader::new(bytes_as_io(bytes)))
    }
}

impl<T> ApexStream<T> {
    /// Controller that aborts this stream.
    pub fn controller(&self) -> &AbortController {
        &self.controller
    }

    /// Abort the stream; the consumer sees a clean end.
    pub fn abort(&self) {
        self.controller.abort();
    }

    /// Whether [`stream`](ApexStream::stream) has already been taken.
    pub fn is_consumed(&self) -> bool {
        self.inner.is_none()
    }
}

fn bytes_as_io(
    bytes: ByteStream,
) -> impl Stream<Item = std::io::Result<bytes::Bytes>> + Send + Unpin + 'static {
    use futures_util::StreamExt;
    bytes.map(|chunk| chunk.map_err(std::io::Error::from))
}

/// Source plus the flags that make `cancel()` run at most once.
struct SourceState<T, S: StreamSource<T>> {
    source: S,
    /// The source reported end or error.
    finished: bool,
    /// `cancel()` was already called.
    cancelled: bool,
    _item: PhantomData<fn() -> T>,
}

impl<T, S: StreamSource<T>> SourceState<T, S> {
    /// Cancel a still-running source. Returns `false` when there was nothing
    /// to cancel.
    fn cancel(&mut self) -> bool {
        if self.finished || self.cancelled {
            return false;
        }
        self.cancelled = true;
        self.source.cancel();
        true
    }
}

type SharedSource<T, S> = Arc<Mutex<SourceState<T, S>>>;

fn lock<T, S: StreamSource<T>>(state: &SharedSource<T, S>) -> MutexGuard<'_, SourceState<T, S>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cancel the source as soon as the controller is aborted, even while the
/// consumer is not polling.
///
/// Without a runtime there is nothing to run the listener on; the abort is
/// then observed at the consumer's next poll.
fn spawn_abort_listener<T, S>(
    state: &SharedSource<T, S>,
    controller: &AbortController,
) -> Option<JoinHandle<()>>
where
    T: 'static,
    S: StreamSource<T> + 'static,
{
    let runtime = tokio::runtime::Handle::try_current().ok()?;
    let state = Arc::clone(state);
    let signal = controller.signal();
    Some(runtime.spawn(async move {
        signal.aborted().await;
        if lock(&state).cancel() {
            tracing::debug!(target: "macrocosmos::streaming", "source cancelled on abort");
        }
    }))
}

/// Owns the source for the lifetime of the consumer's stream.
struct SourceGuard<T, S: StreamSource<T>> {
    state: SharedSource<T, S>,
    controller: AbortController,
    listener: Option<JoinHandle<()>>,
}

impl<T, S: StreamSource<T>> SourceGuard<T, S> {
    fn finish(&self) {
        lock(&self.state).finished = true;
    }

    fn cancel_on_abort(&self) {
        // The listener may already have cancelled the source.
        lock(&self.state).cancel();
        tracing::debug!(target: "macrocosmos::streaming", "stream aborted by caller");
    }
}

impl<T, S: StreamSource<T>> Drop for SourceGuard<T, S> {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.take() {
            listener.abort();
        }
        let cancelled = {
            let mut state = lock(&self.state);
            state.source.unsubscribe();
            state.cancel()
        };
        if !cancelled {
            return;
        }
        // Consumer went away mid-stream.
        if !self.controller.is_aborted() {
            self.controller.abort();
        }
        tracing::debug!(
            target: "macrocosmos::streaming",
            "stream dropped before completion; source cancelled"
        );
    }
}
