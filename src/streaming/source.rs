//! Push-based stream sources
//!
//! A source emits discrete items, an end-of-stream signal, or an error, and
//! can be cancelled. The adapter in [`super::stream`] subscribes an
//! [`EventSink`] to a source and turns the pushed events into a pull-based
//! stream.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use futures::Stream;
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::SdkError;

/// Event emitted by a push-based source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent<T> {
    /// One item of the stream
    Data(T),
    /// The source finished normally
    End,
    /// The source failed; nothing follows
    Error(SdkError),
}

/// Handle through which a source delivers its events.
///
/// Events are queued in arrival order and never dropped while the consumer
/// is alive. All `send`-style methods return `false` once the consumer is
/// gone, which a source can use to stop producing.
#[derive(Debug)]
pub struct EventSink<T> {
    tx: mpsc::UnboundedSender<SourceEvent<T>>,
}

impl<T> Clone for EventSink<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<T> EventSink<T> {
    /// Create a sink and the receiving end of its queue.
    pub(crate) fn channel() -> (Self, mpsc::UnboundedReceiver<SourceEvent<T>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Deliver an item.
    pub fn data(&self, item: T) -> bool {
        self.send(SourceEvent::Data(item))
    }

    /// Signal normal end of stream.
    pub fn end(&self) -> bool {
        self.send(SourceEvent::End)
    }

    /// Signal a failure.
    pub fn error(&self, error: SdkError) -> bool {
        self.send(SourceEvent::Error(error))
    }

    /// Deliver a raw event.
    pub fn send(&self, event: SourceEvent<T>) -> bool {
        self.tx.send(event).is_ok()
    }

    /// Whether the consuming side has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// A push-based, cancellable producer of items.
///
/// Implementations must deliver events only through the subscribed sink and
/// must stop delivering after [`unsubscribe`](StreamSource::unsubscribe).
pub trait StreamSource<T>: Send {
    /// Attach the sink that receives data, end and error events.
    fn subscribe(&mut self, sink: EventSink<T>);

    /// Detach every handler. Later events are discarded.
    fn unsubscribe(&mut self);

    /// Stop production. Safe to call more than once.
    fn cancel(&mut self);
}

/// Source backed by a server-streaming gRPC response.
///
/// On subscribe a pump task forwards each message of the response to the
/// sink; a non-OK status becomes [`SdkError::Rpc`]. Cancelling aborts the pump,
/// which drops the response body and resets the underlying HTTP/2 stream.
pub struct GrpcSource<S> {
    stream: Option<S>,
    pump: Option<JoinHandle<()>>,
    detached: Arc<AtomicBool>,
    method: &'static str,
}

impl<S> GrpcSource<S> {
    /// Wrap a response stream (typically `tonic::Streaming<T>`).
    pub fn new(stream: S) -> Self {
        Self {
            stream: Some(stream),
            pump: None,
            detached: Arc::new(AtomicBool::new(false)),
            method: "stream",
        }
    }

    /// Name of the RPC, used in log records.
    pub fn with_method(mut self, method: &'static str) -> Self {
        self.method = method;
        self
    }
}

impl<T, S> StreamSource<T> for GrpcSource<S>
where
    T: Send + 'static,
    S: Stream<Item = Result<T, tonic::Status>> + Send + 'static,
{
    fn subscribe(&mut self, sink: EventSink<T>) {
        let Some(stream) = self.stream.take() else {
            tracing::warn!(
                target: "macrocosmos::streaming",
                method = self.method,
                "gRPC source subscribed twice; ignoring"
            );
            return;
        };
        let detached = Arc::clone(&self.detached);
        let method = self.method;
        self.pump = Some(tokio::spawn(async move {
            let mut stream = std::pin::pin!(stream);
            while let Some(message) = stream.next().await {
                if detached.load(Ordering::Acquire) {
                    return;
                }
                match message {
                    Ok(item) => {
                        if !sink.data(item) {
                            return;
                        }
                    }
                    Err(status) => {
                        tracing::debug!(
                            target: "macrocosmos::streaming",
                            method,
                            code = ?status.code(),
                            "gRPC stream failed"
                        );
                        sink.error(status.into());
                        return;
                    }
                }
            }
            if !detached.load(Ordering::Acquire) {
                sink.end();
            }
        }));
    }

    fn unsubscribe(&mut self) {
        self.detached.store(true, Ordering::Release);
    }

    fn cancel(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
            tracing::debug!(
                target: "macrocosmos::streaming",
                method = self.method,
                "gRPC stream cancelled"
            );
        }
        self.stream = None;
    }
}

impl<S> Drop for GrpcSource<S> {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}
