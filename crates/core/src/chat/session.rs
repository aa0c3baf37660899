use crate::chat::store::MessageStore;
use crate::client::StockApi;
use crate::domain::payload::StockResponse;
use crate::domain::view::{ChatMessage, ErrorView, SnapshotView, ViewModel};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tracing::Instrument;
use uuid::Uuid;

pub type RequestId = Uuid;

const EVENT_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A turn was appended at `index`.
    Appended { index: usize },
    /// A request is in flight and its user turn is already in the log.
    Started { request_id: RequestId },
    /// A request finished, successfully or not. Views scroll to the latest turn.
    Settled { request_id: RequestId },
}

/// Drives stock requests and owns the chat log for one session.
///
/// Cloning is cheap and every clone shares the same log, in-flight counter and event
/// channel. Overlapping submissions are neither deduplicated nor cancelled; their
/// assistant turns land in the order the responses arrive.
#[derive(Clone)]
pub struct ChatSession {
    api: Arc<dyn StockApi>,
    store: Arc<Mutex<MessageStore>>,
    in_flight: Arc<AtomicUsize>,
    events: broadcast::Sender<ChatEvent>,
}

impl ChatSession {
    pub fn new(api: Arc<dyn StockApi>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            store: Arc::new(Mutex::new(MessageStore::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    /// True while at least one request is outstanding.
    pub fn is_loading(&self) -> bool {
        self.in_flight() > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub async fn messages(&self) -> Vec<ChatMessage> {
        self.store.lock().await.as_slice().to_vec()
    }

    pub async fn message(&self, index: usize) -> Option<ChatMessage> {
        self.store.lock().await.get(index).cloned()
    }

    pub async fn message_count(&self) -> usize {
        self.store.lock().await.len()
    }

    /// Submits one ticker lookup. Blank input is ignored and returns `None`.
    ///
    /// Failures never escape: they become an error turn in the log.
    pub async fn submit(&self, input: &str) -> Option<RequestId> {
        let ticker = input.trim();
        if ticker.is_empty() {
            tracing::debug!("ignoring blank ticker");
            return None;
        }

        let request_id = Uuid::new_v4();
        let display_ticker = ticker.to_uppercase();
        let span = tracing::info_span!("submit", %request_id, ticker = %display_ticker);

        async {
            // Entered before the user turn lands so views never see it without loading.
            let _in_flight = InFlight::enter(&self.in_flight, &self.events, request_id);
            self.append(ChatMessage::user(&display_ticker)).await;
            let _ = self.events.send(ChatEvent::Started { request_id });
            tracing::info!(in_flight = self.in_flight(), "stock request started");

            let view = match self.api.fetch_stock(ticker).await {
                Ok(body) => {
                    let payload = StockResponse::from_value(body);
                    tracing::info!(
                        history = payload.history.len(),
                        predictions = payload.predictions.len(),
                        news = payload.news.len(),
                        "stock request succeeded"
                    );
                    ViewModel::Snapshot(Box::new(SnapshotView::from_response(&display_ticker, &payload)))
                }
                Err(err) => {
                    tracing::warn!(error = %err, "stock request failed");
                    ViewModel::Error(ErrorView::request_failed(&err))
                }
            };

            self.append(ChatMessage::assistant(view)).await;
        }
        .instrument(span)
        .await;

        Some(request_id)
    }

    async fn append(&self, message: ChatMessage) -> usize {
        let index = self.store.lock().await.push(message);
        // No subscribers is fine.
        let _ = self.events.send(ChatEvent::Appended { index });
        index
    }
}

/// Holds one slot of the in-flight counter. Releasing it on drop covers every exit path,
/// including the submitting future being dropped mid-request.
struct InFlight<'a> {
    count: &'a AtomicUsize,
    events: &'a broadcast::Sender<ChatEvent>,
    request_id: RequestId,
}

impl<'a> InFlight<'a> {
    fn enter(
        count: &'a AtomicUsize,
        events: &'a broadcast::Sender<ChatEvent>,
        request_id: RequestId,
    ) -> Self {
        count.fetch_add(1, Ordering::SeqCst);
        Self {
            count,
            events,
            request_id,
        }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.count.fetch_sub(1, Ordering::SeqCst);
        let _ = self.events.send(ChatEvent::Settled {
            request_id: self.request_id,
        });
    }
}
