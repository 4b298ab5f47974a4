use chrono::NaiveDate;
use dormkeep::billing::{BillingEngine, LogNotifier};
use dormkeep::error::AppError;
use dormkeep::registry::RegistryService;
use dormkeep::reporting::DashboardService;
use dormkeep::store::InMemoryStore;
use dormkeep::tenancy::TenantLifecycleService;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Deserialize;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Every service the presentation layer talks to, wired over one shared store.
pub(crate) struct Dormitory {
    pub(crate) registry: RegistryService<InMemoryStore>,
    pub(crate) lifecycle: Arc<TenantLifecycleService<InMemoryStore>>,
    pub(crate) billing: Arc<BillingEngine<InMemoryStore, LogNotifier>>,
    pub(crate) dashboard: DashboardService<InMemoryStore, LogNotifier>,
}

impl Dormitory {
    pub(crate) fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let lifecycle = Arc::new(TenantLifecycleService::new(store.clone()));
        let billing = Arc::new(BillingEngine::new(store.clone(), Arc::new(LogNotifier)));
        let dashboard = DashboardService::new(store.clone(), lifecycle.clone(), billing.clone());

        Self {
            registry: RegistryService::new(store),
            lifecycle,
            billing,
            dashboard,
        }
    }
}

/// Run store-bound work on the blocking pool so handlers never hold a runtime thread.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| AppError::Worker(err.to_string()))?
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn deserialize_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).map_err(serde::de::Error::custom)
}

pub(crate) fn deserialize_optional_date<'de, D>(
    deserializer: D,
) -> Result<Option<NaiveDate>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.map(|value| parse_date(&value).map_err(serde::de::Error::custom))
        .transpose()
}
