// File: celeste-core/src/http/sequencer.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::Error;
use super::{HttpClient, HttpResponse, Method, OutboundRequest};

type Completion = oneshot::Sender<Result<HttpResponse, Error>>;

struct QueuedRequest {
    request: OutboundRequest,
    done: Completion,
}

/// Serializes GET requests so that only one is in flight at a time.
///
/// GETs are answered strictly in submission order: the head of the queue is
/// sent, and only when its response arrives is the next one sent. POST and
/// PATCH requests skip the queue and go out immediately.
///
/// Must be created inside a tokio runtime; it spawns the queue worker.
#[derive(Clone)]
pub struct RequestSequencer {
    client: Arc<dyn HttpClient>,
    queue: mpsc::UnboundedSender<QueuedRequest>,
    pending: Arc<AtomicUsize>,
}

impl RequestSequencer {
    pub fn new(client: Arc<dyn HttpClient>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        tokio::spawn(Self::get_queue_loop(client.clone(), rx, pending.clone()));
        Self {
            client,
            queue: tx,
            pending,
        }
    }

    async fn get_queue_loop(
        client: Arc<dyn HttpClient>,
        mut rx: mpsc::UnboundedReceiver<QueuedRequest>,
        pending: Arc<AtomicUsize>,
    ) {
        while let Some(QueuedRequest { request, done }) = rx.recv().await {
            trace!("GET queue head => {}", request.url);
            let result = client.execute(request).await;
            pending.fetch_sub(1, Ordering::SeqCst);
            // The caller may have stopped waiting; the queue moves on either way.
            let _ = done.send(result);
        }
        debug!("(RequestSequencer) GET queue closed");
    }

    /// Queues or sends `request` and returns a receiver for its outcome.
    pub fn submit(&self, request: OutboundRequest) -> oneshot::Receiver<Result<HttpResponse, Error>> {
        let (done, rx) = oneshot::channel();
        match request.method {
            Method::Get => {
                self.pending.fetch_add(1, Ordering::SeqCst);
                if let Err(mpsc::error::SendError(rejected)) = self.queue.send(QueuedRequest { request, done }) {
                    self.pending.fetch_sub(1, Ordering::SeqCst);
                    let _ = rejected.done.send(Err(Error::Platform("GET queue is closed".into())));
                }
            }
            Method::Post | Method::Patch => {
                let client = self.client.clone();
                tokio::spawn(async move {
                    let result = client.execute(request).await;
                    let _ = done.send(result);
                });
            }
        }
        rx
    }

    /// Submits `request` and waits for its response.
    pub async fn send(&self, request: OutboundRequest) -> Result<HttpResponse, Error> {
        self.submit(request)
            .await
            .map_err(|_| Error::Platform("request dropped before completion".into()))?
    }

    /// Number of GET requests queued or in flight.
    pub fn pending_gets(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}
