use std::sync::Arc;

use fileguard_events::{EventBroadcaster, NotificationDispatcher};
use fileguard_processing::ProcessingClient;
use fileguard_tracker::{DownloadResolver, TaskRegistry};

use crate::config::ServerConfig;
use crate::engine::callback::CallbackGateway;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Every component is constructed once in `main` (or a test harness) and
/// injected here; there is no process-global state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool (users, devices, notifications).
    pub pool: fileguard_db::DbPool,
    pub config: Arc<ServerConfig>,
    pub registry: Arc<TaskRegistry>,
    pub downloads: Arc<DownloadResolver>,
    pub broadcaster: Arc<EventBroadcaster>,
    pub dispatcher: Arc<NotificationDispatcher>,
    /// Outbound gateway to the processing worker.
    pub processing: Arc<dyn ProcessingClient>,
    pub gateway: Arc<CallbackGateway>,
}

impl AppState {
    /// Assemble the state, wiring the callback gateway to the shared
    /// registry, resolver, broadcaster and dispatcher.
    pub fn new(
        pool: fileguard_db::DbPool,
        config: ServerConfig,
        broadcaster: Arc<EventBroadcaster>,
        dispatcher: Arc<NotificationDispatcher>,
        processing: Arc<dyn ProcessingClient>,
    ) -> Self {
        let registry = Arc::new(TaskRegistry::new());
        let downloads = Arc::new(DownloadResolver::new());
        let gateway = Arc::new(CallbackGateway::new(
            Arc::clone(&registry),
            Arc::clone(&downloads),
            Arc::clone(&broadcaster),
            Arc::clone(&dispatcher),
        ));

        Self {
            pool,
            config: Arc::new(config),
            registry,
            downloads,
            broadcaster,
            dispatcher,
            processing,
            gateway,
        }
    }
}
