use std::sync::{
    atomic::{
        AtomicU64,
        Ordering,
    },
    Arc,
    Mutex,
};

use chrono::NaiveDate;
use tokio_util::sync::CancellationToken;

use super::dashboard::{
    load_dashboard,
    DashboardView,
    SrsSource,
};

/// Identifies one refresh. Only the newest ticket may publish its result.
#[derive(Debug, Clone)]
pub struct RefreshTicket {
    generation: u64,
    cancel: CancellationToken,
}

impl RefreshTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Hands out increasing generations and cancels the previous refresh when a
/// new one starts.
#[derive(Debug, Default)]
pub struct RefreshGate {
    issued: AtomicU64,
    in_flight: Mutex<Option<CancellationToken>>,
}

impl RefreshGate {
    pub fn begin(&self) -> RefreshTicket {
        let generation = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        let cancel = CancellationToken::new();

        let mut in_flight = self.in_flight.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(previous) = in_flight.replace(cancel.clone()) {
            previous.cancel();
        }

        RefreshTicket { generation, cancel }
    }

    pub fn is_current(&self, ticket: &RefreshTicket) -> bool {
        self.issued.load(Ordering::SeqCst) == ticket.generation
    }
}

/// Latest dashboard published by the newest refresh.
#[derive(Debug, Default)]
pub struct DashboardState {
    gate: RefreshGate,
    current: Mutex<Option<Arc<DashboardView>>>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> RefreshTicket {
        self.gate.begin()
    }

    /// Publishes `view` unless a newer refresh has started since `ticket`
    /// was issued. Returns the published view, or `None` if it was stale.
    pub fn apply(&self, ticket: &RefreshTicket, view: DashboardView) -> Option<Arc<DashboardView>> {
        let mut current = self.current.lock().unwrap_or_else(|p| p.into_inner());
        if !self.gate.is_current(ticket) {
            tracing::debug!(generation = ticket.generation, "Dropping stale dashboard refresh");
            return None;
        }
        let view = Arc::new(view);
        *current = Some(view.clone());
        Some(view)
    }

    pub fn current(&self) -> Option<Arc<DashboardView>> {
        self.current.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    /// Loads and publishes a dashboard. Returns `None` when a newer refresh
    /// superseded this one, either mid-flight or before it could publish.
    pub async fn refresh<S: SrsSource + ?Sized>(
        &self,
        source: &S,
        today: NaiveDate,
    ) -> Option<Arc<DashboardView>> {
        let ticket = self.begin();

        let view = tokio::select! {
            biased;
            _ = ticket.cancel.cancelled() => {
                tracing::debug!(generation = ticket.generation, "Dashboard refresh superseded");
                return None;
            }
            view = load_dashboard(source, today) => view,
        };

        self.apply(&ticket, view)
    }
}
