//! Dashboard session state.
//!
//! The session owns everything the viewer has selected (product, timeframe)
//! and the series currently loaded. Fetches are described by [`Ticket`]s; only
//! the most recently issued ticket may update the session, so a slow response
//! for an earlier selection can never overwrite a later one.

use tracing::{debug, info, warn};

use crate::app::pipeline::{DashboardView, build_dashboard};
use crate::domain::{TimeSeries, TimeframeToken};
use crate::engine::TimeframeTable;
use crate::error::ForecastError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchRequest {
    Catalog,
    Series { product: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum FetchResponse {
    Catalog(Result<Vec<String>, ForecastError>),
    Series(Result<TimeSeries, ForecastError>),
}

/// An issued fetch. `id` increases monotonically per session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ticket {
    pub id: u64,
    pub request: FetchRequest,
}

/// What the trend, anomaly and chart panels show. All three always share one state.
#[derive(Debug, Clone, PartialEq)]
pub enum Panels {
    Loading,
    Ready(DashboardView),
    Error(String),
}

#[derive(Debug, Clone)]
struct LoadedSeries {
    product: String,
    series: TimeSeries,
}

pub struct Session {
    table: TimeframeTable,
    token: TimeframeToken,
    products: Vec<String>,
    selected: Option<usize>,
    loaded: Option<LoadedSeries>,
    panels: Panels,
    next_id: u64,
    pending: Option<Ticket>,
}

impl Session {
    pub fn new(table: TimeframeTable) -> Self {
        let token = table.default_token();
        Self {
            table,
            token,
            products: Vec::new(),
            selected: None,
            loaded: None,
            panels: Panels::Loading,
            next_id: 0,
            pending: None,
        }
    }

    pub fn table(&self) -> &TimeframeTable {
        &self.table
    }

    pub fn token(&self) -> TimeframeToken {
        self.token
    }

    pub fn products(&self) -> &[String] {
        &self.products
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected_product(&self) -> Option<&str> {
        self.selected.and_then(|i| self.products.get(i)).map(String::as_str)
    }

    pub fn panels(&self) -> &Panels {
        &self.panels
    }

    pub fn is_fetching(&self) -> bool {
        self.pending.is_some()
    }

    fn issue(&mut self, request: FetchRequest) -> Ticket {
        self.next_id += 1;
        let ticket = Ticket {
            id: self.next_id,
            request,
        };
        if let Some(prev) = self.pending.replace(ticket.clone()) {
            debug!(superseded = prev.id, by = ticket.id, "superseding in-flight fetch");
        }
        self.panels = Panels::Loading;
        ticket
    }

    /// Initial load: fetch the product list.
    pub fn start(&mut self) -> Ticket {
        self.issue(FetchRequest::Catalog)
    }

    /// Select a product by index and fetch its series.
    pub fn select_product(&mut self, index: usize) -> Option<Ticket> {
        let product = self.products.get(index)?.clone();
        self.selected = Some(index);
        Some(self.issue(FetchRequest::Series { product }))
    }

    pub fn select_next(&mut self) -> Option<Ticket> {
        let next = self.selected.map_or(0, |i| i + 1);
        if next >= self.products.len() {
            return None;
        }
        self.select_product(next)
    }

    pub fn select_prev(&mut self) -> Option<Ticket> {
        let prev = self.selected?.checked_sub(1)?;
        self.select_product(prev)
    }

    /// Re-fetch the selected product, or the catalog if there is none.
    pub fn reload(&mut self) -> Ticket {
        match self.selected_product().map(str::to_string) {
            Some(product) => self.issue(FetchRequest::Series { product }),
            None => self.issue(FetchRequest::Catalog),
        }
    }

    /// Change the timeframe and recompute the chart from the loaded series.
    ///
    /// No fetch is needed; while loading or in an error state only the
    /// selection is remembered.
    pub fn set_timeframe(&mut self, token: TimeframeToken) {
        self.token = token;
        if let Panels::Ready(_) = self.panels {
            self.refresh_view();
        }
    }

    pub fn next_timeframe(&mut self) {
        self.set_timeframe(self.table.next(self.token));
    }

    pub fn prev_timeframe(&mut self) {
        self.set_timeframe(self.table.prev(self.token));
    }

    fn refresh_view(&mut self) {
        if let Some(loaded) = &self.loaded {
            let view = build_dashboard(&loaded.product, &loaded.series, &self.table, self.token);
            self.panels = Panels::Ready(view);
        }
    }

    /// Apply a fetch result. Responses for anything but the latest ticket are
    /// discarded. May return a follow-up ticket (the catalog load selects the
    /// first product).
    pub fn apply(&mut self, id: u64, response: FetchResponse) -> Option<Ticket> {
        let ticket = match &self.pending {
            Some(t) if t.id == id => self.pending.take()?,
            _ => {
                debug!(id, "discarding stale fetch response");
                return None;
            }
        };

        match (ticket.request, response) {
            (FetchRequest::Catalog, FetchResponse::Catalog(Ok(products))) => {
                if products.is_empty() {
                    warn!("catalog is empty");
                    self.products.clear();
                    self.selected = None;
                    self.panels = Panels::Error(ForecastError::EmptyCatalog.to_string());
                    return None;
                }
                info!(count = products.len(), "catalog loaded");
                self.products = products;
                self.select_product(0)
            }
            (FetchRequest::Series { product }, FetchResponse::Series(Ok(series))) => {
                info!(%product, entries = series.len(), "series loaded");
                self.loaded = Some(LoadedSeries { product, series });
                self.refresh_view();
                None
            }
            (_, FetchResponse::Catalog(Err(err)) | FetchResponse::Series(Err(err))) => {
                warn!("fetch failed: {err}");
                self.panels = Panels::Error(err.to_string());
                None
            }
            (request, _) => {
                warn!(?request, "response kind does not match request");
                self.panels = Panels::Error("Unexpected response from data source.".to_string());
                None
            }
        }
    }
}
