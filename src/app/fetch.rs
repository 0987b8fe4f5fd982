//! Background fetches for the interactive dashboard.
//!
//! Each ticket runs on its own thread against the shared store; results come
//! back tagged with the ticket id so the session can drop stale ones.

use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::app::session::{FetchRequest, FetchResponse, Ticket};
use crate::data::ProductStore;

/// Run a request synchronously.
pub fn fetch(store: &dyn ProductStore, request: &FetchRequest) -> FetchResponse {
    match request {
        FetchRequest::Catalog => FetchResponse::Catalog(store.list_products()),
        FetchRequest::Series { product } => FetchResponse::Series(store.get_series(product)),
    }
}

pub struct FetchWorker {
    store: Arc<dyn ProductStore>,
    tx: Sender<(u64, FetchResponse)>,
    rx: Receiver<(u64, FetchResponse)>,
}

impl FetchWorker {
    pub fn new(store: Arc<dyn ProductStore>) -> Self {
        let (tx, rx) = mpsc::channel();
        Self { store, tx, rx }
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    pub fn submit(&self, ticket: Ticket) {
        let store = Arc::clone(&self.store);
        let tx = self.tx.clone();
        debug!(id = ticket.id, request = ?ticket.request, "submitting fetch");
        thread::spawn(move || {
            let response = fetch(store.as_ref(), &ticket.request);
            // The receiver is gone once the dashboard has exited.
            let _ = tx.send((ticket.id, response));
        });
    }

    pub fn try_recv(&self) -> Option<(u64, FetchResponse)> {
        self.rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<(u64, FetchResponse)> {
        match self.rx.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }
}
