// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Document port: selector resolution and structural-change watching.

use tokio::sync::mpsc;

/// An element of the surrounding document tree that widgets and overlays
/// can be bound to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Element {
    id: u64,
    name: String,
}

impl Element {
    /// Build an element handle. Documents allocate the ids.
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// Document-unique id.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Human-readable name (usually the selector that created it).
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Document-like tree the driver mounts into.
pub trait Document: Send + Sync {
    /// Resolve a selector to an element currently in the tree.
    fn query_selector(&self, selector: &str) -> Option<Element>;

    /// Start watching the tree for structural changes.
    fn observe(&self) -> MutationWatch;
}

/// Subscription to structural changes of a [`Document`].
///
/// Each notification means "the tree changed, re-query what you need".
/// Notifications carry no payload and may be coalesced by the document.
/// [`MutationWatch::disconnect`] consumes the watch, so a watch can be
/// disconnected at most once; dropping it disconnects too.
pub struct MutationWatch {
    rx: mpsc::UnboundedReceiver<()>,
    on_disconnect: Option<Box<dyn FnOnce() + Send>>,
}

impl MutationWatch {
    /// Wrap a notification receiver. `on_disconnect` runs exactly once, when
    /// the watch is disconnected or dropped.
    pub fn new(
        rx: mpsc::UnboundedReceiver<()>,
        on_disconnect: impl FnOnce() + Send + 'static,
    ) -> Self {
        Self {
            rx,
            on_disconnect: Some(Box::new(on_disconnect)),
        }
    }

    /// Wait for the next structural change. Returns `false` once the
    /// document has gone away and no further changes can arrive.
    pub async fn changed(&mut self) -> bool {
        if self.rx.recv().await.is_none() {
            return false;
        }
        // Collapse bursts into one re-evaluation.
        while self.rx.try_recv().is_ok() {}
        true
    }

    /// Stop watching.
    pub fn disconnect(mut self) {
        self.release();
    }

    fn release(&mut self) {
        self.rx.close();
        if let Some(hook) = self.on_disconnect.take() {
            hook();
        }
    }
}

impl Drop for MutationWatch {
    fn drop(&mut self) {
        self.release();
    }
}

impl core::fmt::Debug for MutationWatch {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("MutationWatch")
            .field("connected", &self.on_disconnect.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn bursts_collapse_into_one_change() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut watch = MutationWatch::new(rx, || {});
        tx.send(()).unwrap();
        tx.send(()).unwrap();
        tx.send(()).unwrap();
        assert!(watch.changed().await);
        drop(tx);
        assert!(!watch.changed().await);
    }

    #[test]
    fn disconnect_hook_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let (_tx, rx) = mpsc::unbounded_channel();
        let counter = calls.clone();
        let watch = MutationWatch::new(rx, move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        watch.disconnect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
