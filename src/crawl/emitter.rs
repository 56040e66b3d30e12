// src/crawl/emitter.rs
// =============================================================================
// The boundary between a running crawl and whoever consumes it.
//
// The traverser runs as a background task and pushes entities into a bounded
// channel. The caller reads them through EntityStream, which implements
// futures::Stream. Because the channel is bounded, a slow consumer slows the
// crawl down instead of letting the whole tree pile up in memory.
//
// If the caller drops the stream, the next send fails and the traverser
// stops walking.
// =============================================================================

use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use super::entity::Entity;
use crate::error::CrawlError;

/// How many entities may wait in the channel before producers block.
pub const CHANNEL_CAPACITY: usize = 64;

pub type CrawlItem = Result<Entity, CrawlError>;

/// Producer half, cloned into every concurrent directory task.
#[derive(Clone)]
pub struct Emitter {
    tx: mpsc::Sender<CrawlItem>,
}

/// The receiving end of a crawl session.
pub struct EntityStream {
    rx: mpsc::Receiver<CrawlItem>,
}

pub fn channel() -> (Emitter, EntityStream) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    (Emitter { tx }, EntityStream { rx })
}

impl Emitter {
    /// Sends one entity. Returns false once the consumer has gone away.
    pub async fn emit(&self, entity: Entity) -> bool {
        self.tx.send(Ok(entity)).await.is_ok()
    }

    /// Ends the session with a fatal error.
    pub async fn fail(&self, error: CrawlError) {
        let _ = self.tx.send(Err(error)).await;
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl Stream for EntityStream {
    type Item = CrawlItem;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}
