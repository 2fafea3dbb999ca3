// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Mock document: a selector table with mutation notifications.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use map_port::{Document, Element, MutationWatch};
use tokio::sync::mpsc;

use crate::widget::lock;

#[derive(Default)]
struct DocState {
    elements: HashMap<String, Element>,
    watchers: HashMap<u64, mpsc::UnboundedSender<()>>,
    next_element: u64,
    next_watcher: u64,
    disconnects: usize,
    queries: usize,
}

/// In-memory [`Document`].
///
/// Selectors are matched literally: inserting `"#map"` makes
/// `query_selector("#map")` resolve. Every insertion and removal notifies
/// all connected watchers. Clones share the same tree.
#[derive(Clone, Default)]
pub struct MockDocument {
    state: Arc<Mutex<DocState>>,
}

impl MockDocument {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element reachable by `selector` and notify watchers.
    /// Re-inserting an existing selector returns the existing element.
    pub fn insert(&self, selector: &str) -> Element {
        let element = {
            let mut state = lock(&self.state);
            if let Some(existing) = state.elements.get(selector) {
                existing.clone()
            } else {
                state.next_element += 1;
                let element = Element::new(state.next_element, selector);
                state.elements.insert(selector.to_string(), element.clone());
                element
            }
        };
        self.notify();
        element
    }

    /// Remove the element reachable by `selector` and notify watchers.
    pub fn remove(&self, selector: &str) -> Option<Element> {
        let removed = lock(&self.state).elements.remove(selector);
        self.notify();
        removed
    }

    /// Notify watchers of a change that did not affect any tracked selector.
    pub fn touch(&self) {
        self.notify();
    }

    /// Number of currently connected watchers.
    pub fn active_watchers(&self) -> usize {
        lock(&self.state).watchers.len()
    }

    /// Number of watchers that have been disconnected so far.
    pub fn disconnects(&self) -> usize {
        lock(&self.state).disconnects
    }

    /// Number of `query_selector` calls served so far.
    pub fn queries(&self) -> usize {
        lock(&self.state).queries
    }

    fn notify(&self) {
        let state = lock(&self.state);
        for tx in state.watchers.values() {
            let _ = tx.send(());
        }
    }
}

impl Document for MockDocument {
    fn query_selector(&self, selector: &str) -> Option<Element> {
        let mut state = lock(&self.state);
        state.queries += 1;
        state.elements.get(selector).cloned()
    }

    fn observe(&self) -> MutationWatch {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut state = lock(&self.state);
            let id = state.next_watcher;
            state.next_watcher += 1;
            state.watchers.insert(id, tx);
            id
        };
        let shared = self.state.clone();
        MutationWatch::new(rx, move || {
            let mut state = lock(&shared);
            if state.watchers.remove(&id).is_some() {
                state.disconnects += 1;
            }
        })
    }
}
