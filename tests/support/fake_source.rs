//! Scripted push source for driving `ApexStream` in tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use macrocosmos::SdkError;
use macrocosmos::streaming::{EventSink, StreamSource};

struct State<T> {
    sink: Option<EventSink<T>>,
    subscribed: usize,
    unsubscribed: usize,
    cancelled: usize,
}

/// Source half, handed to the adapter.
pub struct FakeSource<T> {
    state: Arc<Mutex<State<T>>>,
}

/// Test half: pushes events and inspects what the adapter did.
#[derive(Clone)]
pub struct FakeHandle<T> {
    state: Arc<Mutex<State<T>>>,
}

pub fn fake_source<T>() -> (FakeSource<T>, FakeHandle<T>) {
    let state = Arc::new(Mutex::new(State {
        sink: None,
        subscribed: 0,
        unsubscribed: 0,
        cancelled: 0,
    }));
    (
        FakeSource {
            state: Arc::clone(&state),
        },
        FakeHandle { state },
    )
}

impl<T: Send> StreamSource<T> for FakeSource<T> {
    fn subscribe(&mut self, sink: EventSink<T>) {
        let mut state = self.state.lock().unwrap();
        state.sink = Some(sink);
        state.subscribed += 1;
    }

    fn unsubscribe(&mut self) {
        let mut state = self.state.lock().unwrap();
        state.sink = None;
        state.unsubscribed += 1;
    }

    fn cancel(&mut self) {
        self.state.lock().unwrap().cancelled += 1;
    }
}

impl<T> FakeHandle<T> {
    /// Push an item; `false` once the adapter has detached.
    pub fn data(&self, item: T) -> bool {
        match &self.state.lock().unwrap().sink {
            Some(sink) => sink.data(item),
            None => false,
        }
    }

    pub fn end(&self) -> bool {
        match &self.state.lock().unwrap().sink {
            Some(sink) => sink.end(),
            None => false,
        }
    }

    pub fn error(&self, error: SdkError) -> bool {
        match &self.state.lock().unwrap().sink {
            Some(sink) => sink.error(error),
            None => false,
        }
    }

    pub fn subscribe_count(&self) -> usize {
        self.state.lock().unwrap().subscribed
    }

    pub fn unsubscribe_count(&self) -> usize {
        self.state.lock().unwrap().unsubscribed
    }

    pub fn cancel_count(&self) -> usize {
        self.state.lock().unwrap().cancelled
    }
}
