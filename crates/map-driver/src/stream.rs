// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Memoized multicast streams.
//!
//! A [`MemoryStream`] fans every value out to all current subscribers and
//! remembers the last one, so a late subscriber starts with the most recent
//! value and then sees everything after it. Nothing is dropped between
//! values: each subscriber has its own unbounded queue.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};
use std::sync::{Arc, Mutex, MutexGuard};

use futures_util::Stream;
use tokio::sync::mpsc;

struct Shared<T> {
    last: Option<T>,
    subscribers: Vec<mpsc::UnboundedSender<T>>,
    emissions: usize,
}

/// Replay-last multicast stream. Clones share the same channel.
pub struct MemoryStream<T> {
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T> Clone for MemoryStream<T> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<T> Default for MemoryStream<T> {
    fn default() -> Self {
        Self {
            shared: Arc::new(Mutex::new(Shared {
                last: None,
                subscribers: Vec::new(),
                emissions: 0,
            })),
        }
    }
}

impl<T> core::fmt::Debug for MemoryStream<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let shared = self.lock();
        f.debug_struct("MemoryStream")
            .field("subscribers", &shared.subscribers.len())
            .field("emissions", &shared.emissions)
            .finish_non_exhaustive()
    }
}

impl<T> MemoryStream<T> {
    /// Create a stream with no value yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Shared<T>> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Number of values sent so far.
    pub fn emissions(&self) -> usize {
        self.lock().emissions
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        let mut shared = self.lock();
        shared.subscribers.retain(|tx| !tx.is_closed());
        shared.subscribers.len()
    }
}

impl<T: Clone> MemoryStream<T> {
    /// Deliver `value` to every subscriber and remember it.
    pub fn send(&self, value: T) {
        let mut shared = self.lock();
        shared
            .subscribers
            .retain(|tx| tx.send(value.clone()).is_ok());
        shared.last = Some(value);
        shared.emissions += 1;
    }

    /// Subscribe; the last value, if any, is delivered first.
    pub fn subscribe(&self) -> Subscription<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut shared = self.lock();
        if let Some(last) = &shared.last {
            let _ = tx.send(last.clone());
        }
        shared.subscribers.push(tx);
        Subscription { rx }
    }

    /// The last value sent, if any.
    pub fn last(&self) -> Option<T> {
        self.lock().last.clone()
    }
}

/// One subscriber's view of a [`MemoryStream`].
///
/// Ends once every clone of the originating stream has been dropped and the
/// queue is drained.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    /// Wait for the next value.
    pub fn recv(&mut self) -> impl Future<Output = Option<T>> + '_ {
        self.rx.recv()
    }

    /// Take the next value if one is already queued.
    pub fn try_recv(&mut self) -> Option<T> {
        self.rx.try_recv().ok()
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.get_mut().rx.poll_recv(cx)
    }
}
