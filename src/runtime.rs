//! Cooperative event loop driving a [`View`].
//!
//! The view is owned by one task and only touched there. Each ticket the
//! view issues is executed on its own spawned task; completions come back
//! over a channel and are applied in arrival order. Superseded requests are
//! not cancelled, their results are simply rejected by the slot.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{trace, warn};

use crate::api::{FetchError, Fetcher};
use crate::state::Ticket;
use crate::views::View;

struct Completion<K> {
    ticket: Ticket<K>,
    result: Result<Value, FetchError>,
}

pub struct Runtime<V: View> {
    view: V,
    fetcher: Arc<dyn Fetcher>,
    tx: mpsc::UnboundedSender<Completion<V::Key>>,
    rx: mpsc::UnboundedReceiver<Completion<V::Key>>,
    in_flight: usize,
}

impl<V: View> Runtime<V> {
    pub fn new(view: V, fetcher: Arc<dyn Fetcher>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            view,
            fetcher,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Run a user action against the view, then dispatch whatever it implies.
    pub fn update<R>(&mut self, action: impl FnOnce(&mut V) -> R) -> R {
        let out = action(&mut self.view);
        self.dispatch();
        out
    }

    /// Number of spawned fetches whose results have not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Spawn a fetch for every ticket the view currently wants.
    pub fn dispatch(&mut self) -> usize {
        let tickets = self.view.poll_requests();
        let count = tickets.len();
        for ticket in tickets {
            trace!("dispatching {:?} {}", ticket.slot, ticket.request);
            let fetcher = Arc::clone(&self.fetcher);
            let tx = self.tx.clone();
            self.in_flight += 1;
            tokio::spawn(async move {
                // A panicking fetcher still has to produce a completion, or
                // in_flight never drains.
                let result = AssertUnwindSafe(fetcher.execute(&ticket.request))
                    .catch_unwind()
                    .await
                    .unwrap_or_else(|_| {
                        warn!("Fetch task for {} panicked", ticket.request);
                        Err(FetchError::transport("fetch task panicked"))
                    });
                // Receiver only goes away with the runtime itself.
                let _ = tx.send(Completion { ticket, result });
            });
        }
        count
    }

    /// Wait for one completion and apply it. Returns false when nothing is
    /// in flight.
    pub async fn next_completion(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.rx.recv().await {
            Some(Completion { ticket, result }) => {
                self.in_flight -= 1;
                self.view.apply(&ticket, result);
                true
            }
            None => false,
        }
    }

    /// Dispatch and apply until the view is quiescent.
    pub async fn settle(&mut self) {
        self.dispatch();
        while self.next_completion().await {
            self.dispatch();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiRequest;
    use crate::views::{CommentsView, ListDisplay};
    use async_trait::async_trait;
    use serde_json::json;

    struct Fixed(Value);

    #[async_trait]
    impl Fetcher for Fixed {
        async fn execute(&self, _request: &ApiRequest) -> Result<Value, FetchError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn test_settle_loads_mount_request() {
        let mut runtime = Runtime::new(CommentsView::default(), Arc::new(Fixed(json!([]))));
        runtime.settle().await;
        assert_eq!(runtime.in_flight(), 0);
        assert!(matches!(runtime.view().display(), ListDisplay::Empty(_)));
    }

    struct Panicking;

    #[async_trait]
    impl Fetcher for Panicking {
        async fn execute(&self, request: &ApiRequest) -> Result<Value, FetchError> {
            panic!("backend exploded on {}", request);
        }
    }

    #[tokio::test]
    async fn test_panicking_fetcher_still_settles() {
        let mut runtime = Runtime::new(CommentsView::default(), Arc::new(Panicking));
        runtime.settle().await;
        assert_eq!(runtime.in_flight(), 0);
        assert_eq!(
            runtime.view().display(),
            ListDisplay::Failed(crate::views::comments::LOAD_ERROR)
        );
    }

    #[tokio::test]
    async fn test_next_completion_without_work() {
        let mut runtime = Runtime::new(CommentsView::default(), Arc::new(Fixed(json!([]))));
        assert!(!runtime.next_completion().await);
    }
}
