use crate::billing::BillingError;
use crate::config::ConfigError;
use crate::domain::ValidationError;
use crate::import::RosterImportError;
use crate::occupancy::OccupancyError;
use crate::registry::RegistryError;
use crate::reporting::ReportingError;
use crate::store::StoreError;
use crate::telemetry::TelemetryError;
use crate::tenancy::LifecycleError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Map, Value};
use std::fmt;

const REFRESH_HINT: &str = "the record may have changed; refresh and try again";

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Lifecycle(LifecycleError),
    Billing(BillingError),
    Registry(RegistryError),
    Reporting(ReportingError),
    Occupancy(OccupancyError),
    Import(RosterImportError),
    /// A blocking worker panicked or was cancelled before reporting back.
    Worker(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Lifecycle(err) => write!(f, "{}", err),
            AppError::Billing(err) => write!(f, "{}", err),
            AppError::Registry(err) => write!(f, "{}", err),
            AppError::Reporting(err) => write!(f, "{}", err),
            AppError::Occupancy(err) => write!(f, "{}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
            AppError::Worker(detail) => write!(f, "background worker failed: {}", detail),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Lifecycle(err) => Some(err),
            AppError::Billing(err) => Some(err),
            AppError::Registry(err) => Some(err),
            AppError::Reporting(err) => Some(err),
            AppError::Occupancy(err) => Some(err),
            AppError::Import(err) => Some(err),
            AppError::Worker(_) => None,
        }
    }
}

/// How a failure is surfaced to the presentation layer.
enum Surface<'a> {
    Invalid(&'a ValidationError),
    Missing,
    Capacity,
    Unavailable,
    BadRequest,
    Internal,
}

fn occupancy_surface(err: &OccupancyError) -> Surface<'_> {
    match err {
        OccupancyError::Full(_) | OccupancyError::AtCapacity(_) => Surface::Capacity,
        OccupancyError::NotFound(_) => Surface::Missing,
        OccupancyError::Store(err) => store_surface(err),
    }
}

fn store_surface(err: &StoreError) -> Surface<'_> {
    match err {
        StoreError::Conflict(_) => Surface::Capacity,
        StoreError::NotFound => Surface::Missing,
        StoreError::Unavailable(_) => Surface::Unavailable,
    }
}

fn lifecycle_surface(err: &LifecycleError) -> Surface<'_> {
    match err {
        LifecycleError::Validation(err) => Surface::Invalid(err),
        LifecycleError::TenantNotFound(_) | LifecycleError::ReferenceNotFound { .. } => {
            Surface::Missing
        }
        LifecycleError::TenantInactive(_) => Surface::Capacity,
        LifecycleError::Occupancy(err) => occupancy_surface(err),
        LifecycleError::Store(err) => store_surface(err),
    }
}

fn billing_surface(err: &BillingError) -> Surface<'_> {
    match err {
        BillingError::Validation(err) => Surface::Invalid(err),
        BillingError::TenantNotFound(_) => Surface::Missing,
        BillingError::InvalidRange { .. } => Surface::BadRequest,
        BillingError::Export(_) => Surface::Internal,
        BillingError::Store(err) => store_surface(err),
    }
}

impl AppError {
    fn surface(&self) -> Surface<'_> {
        match self {
            AppError::Lifecycle(err) => lifecycle_surface(err),
            AppError::Billing(err) => billing_surface(err),
            AppError::Occupancy(err) => occupancy_surface(err),
            AppError::Registry(err) => match err {
                RegistryError::Validation(err) => Surface::Invalid(err),
                RegistryError::Duplicate(_) | RegistryError::RoomOccupied { .. } => {
                    Surface::Capacity
                }
                RegistryError::NotFound(_) => Surface::Missing,
                RegistryError::Store(err) => store_surface(err),
            },
            AppError::Reporting(err) => match err {
                ReportingError::Billing(err) => billing_surface(err),
                ReportingError::Lifecycle(err) => lifecycle_surface(err),
                ReportingError::Store(err) => store_surface(err),
            },
            AppError::Import(_) => Surface::BadRequest,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_)
            | AppError::Worker(_) => Surface::Internal,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert("error".to_string(), Value::String(self.to_string()));

        let status = match self.surface() {
            Surface::Invalid(err) => {
                body.insert("field".to_string(), Value::String(err.field.to_string()));
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Surface::Missing => {
                body.insert("hint".to_string(), json!(REFRESH_HINT));
                StatusCode::NOT_FOUND
            }
            Surface::Capacity => StatusCode::CONFLICT,
            Surface::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Surface::BadRequest => StatusCode::BAD_REQUEST,
            Surface::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(Value::Object(body))).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<LifecycleError> for AppError {
    fn from(value: LifecycleError) -> Self {
        Self::Lifecycle(value)
    }
}

impl From<BillingError> for AppError {
    fn from(value: BillingError) -> Self {
        Self::Billing(value)
    }
}

impl From<RegistryError> for AppError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

impl From<ReportingError> for AppError {
    fn from(value: ReportingError) -> Self {
        Self::Reporting(value)
    }
}

impl From<OccupancyError> for AppError {
    fn from(value: OccupancyError) -> Self {
        Self::Occupancy(value)
    }
}

impl From<RosterImportError> for AppError {
    fn from(value: RosterImportError) -> Self {
        Self::Import(value)
    }
}
