// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared harness: a driver on the mock engine and document, fed by a channel.
#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{self, BoxStream};
use futures_util::{Stream, StreamExt};
use map_driver::{DriverOptions, Inbound, MapDriver};
use map_port_mock::{MockDocument, MockEngine, MockMap};
use tokio::sync::mpsc;

pub const WAIT: Duration = Duration::from_secs(2);

pub struct Harness {
    pub engine: Arc<MockEngine>,
    pub doc: MockDocument,
    pub commands: mpsc::UnboundedSender<Inbound>,
    pub driver: MapDriver,
}

impl Harness {
    pub fn start(options: DriverOptions) -> Self {
        let engine = Arc::new(MockEngine::new());
        let doc = MockDocument::new();
        let (commands, rx) = mpsc::unbounded_channel();
        let driver = MapDriver::start(
            options,
            engine.clone(),
            Arc::new(doc.clone()),
            channel_stream(rx),
        )
        .expect("valid options");
        Self {
            engine,
            doc,
            commands,
            driver,
        }
    }

    pub fn send(&self, item: impl Into<Inbound>) {
        self.commands.send(item.into()).expect("driver alive");
    }

    /// Insert the target and wait until the widget exists.
    pub async fn mount(&self, target: &str) -> Arc<MockMap> {
        self.doc.insert(target);
        eventually(|| self.engine.last_map().is_some()).await;
        self.engine.last_map().expect("mounted")
    }
}

pub fn channel_stream<T: Send + 'static>(rx: mpsc::UnboundedReceiver<T>) -> BoxStream<'static, T> {
    stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|item| (item, rx)) }).boxed()
}

/// Next item of a stream, failing the test after [`WAIT`].
pub async fn next<S>(stream: &mut S) -> S::Item
where
    S: Stream + Unpin + Send,
    S::Item: Send,
{
    within(stream.next()).await.expect("stream ended")
}

pub async fn within<F: Future + Send>(fut: F) -> F::Output {
    tokio::time::timeout(WAIT, fut).await.expect("timed out")
}

/// Poll `cond` until it holds, failing the test after [`WAIT`].
pub async fn eventually(mut cond: impl FnMut() -> bool + Send) {
    within(async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(1)).await;
        }
    })
    .await;
}
