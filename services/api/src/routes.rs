use crate::infra::{blocking, deserialize_date, deserialize_optional_date, AppState, Dormitory};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use chrono::{Local, NaiveDate};
use dormkeep::billing::RecordedPayment;
use dormkeep::domain::money::format_currency;
use dormkeep::domain::{
    EmergencyContact, EmergencyContactId, Guardian, GuardianId, NewContact, NewPayment, NewRoom,
    NewTenant, Payment, Room, RoomId, Tenant, TenantDetails, TenantId,
};
use dormkeep::error::AppError;
use dormkeep::occupancy::Occupancy;
use dormkeep::registry::RoomUpdate;
use dormkeep::reporting::{DashboardSummary, OverdueEntry, TenantRow};
use dormkeep::tenancy::{Deactivation, LinksUpdate, RoomAssignment, TenantCreation, TenantLinks};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

type Shared = State<Arc<Dormitory>>;

#[derive(Debug, Deserialize)]
pub(crate) struct RoomChangeRequest {
    #[serde(default)]
    pub(crate) room_id: Option<RoomId>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AsOfQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TodayQuery {
    #[serde(default, deserialize_with = "deserialize_optional_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RevenueQuery {
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) start: NaiveDate,
    #[serde(deserialize_with = "deserialize_date")]
    pub(crate) end: NaiveDate,
}

#[derive(Debug, Serialize)]
pub(crate) struct RentDueResponse {
    pub(crate) tenant_id: TenantId,
    pub(crate) as_of: NaiveDate,
    pub(crate) rent_due: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct RevenueResponse {
    pub(crate) start: NaiveDate,
    pub(crate) end: NaiveDate,
    pub(crate) total: Decimal,
    pub(crate) label: String,
}

/// Dormitory endpoints plus the operational probes.
pub(crate) fn with_dormitory_routes(dormitory: Arc<Dormitory>) -> Router {
    dormitory_router(dormitory)
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
}

pub(crate) fn dormitory_router(dormitory: Arc<Dormitory>) -> Router {
    Router::new()
        .route("/api/v1/rooms", post(create_room).get(list_rooms))
        .route("/api/v1/rooms/:room_id", put(update_room))
        .route("/api/v1/rooms/:room_id/occupancy", get(room_occupancy))
        .route("/api/v1/rooms/:room_id/deactivate", post(deactivate_room))
        .route("/api/v1/rooms/:room_id/reactivate", post(reactivate_room))
        .route("/api/v1/guardians", post(create_guardian))
        .route("/api/v1/guardians/:guardian_id/active", put(set_guardian_active))
        .route("/api/v1/emergency-contacts", post(create_emergency_contact))
        .route(
            "/api/v1/emergency-contacts/:contact_id/active",
            put(set_emergency_contact_active),
        )
        .route("/api/v1/tenants", post(create_tenant).get(list_tenants))
        .route("/api/v1/tenants/:tenant_id", put(update_tenant_details))
        .route("/api/v1/tenants/:tenant_id/links", get(tenant_links).put(relink_tenant))
        .route("/api/v1/tenants/:tenant_id/room", put(assign_room))
        .route("/api/v1/tenants/:tenant_id/deactivate", post(deactivate_tenant))
        .route("/api/v1/tenants/:tenant_id/reactivate", post(reactivate_tenant))
        .route("/api/v1/tenants/:tenant_id/payments", get(payment_history))
        .route("/api/v1/tenants/:tenant_id/rent-due", get(rent_due))
        .route("/api/v1/payments", post(record_payment))
        .route("/api/v1/revenue", get(revenue))
        .route("/api/v1/dashboard", get(dashboard))
        .route("/api/v1/overdue", get(overdue))
        .with_state(dormitory)
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn create_room(
    State(dormitory): Shared,
    Json(room): Json<NewRoom>,
) -> Result<(StatusCode, Json<Room>), AppError> {
    let room = blocking(move || Ok(dormitory.registry.create_room(room)?)).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

async fn list_rooms(State(dormitory): Shared) -> Result<Json<Vec<Room>>, AppError> {
    let rooms = blocking(move || Ok(dormitory.registry.rooms()?)).await?;
    Ok(Json(rooms))
}

async fn room_occupancy(
    State(dormitory): Shared,
    Path(room_id): Path<u64>,
) -> Result<Json<Occupancy>, AppError> {
    let occupancy = blocking(move || {
        Ok(dormitory
            .lifecycle
            .ledger()
            .query_occupancy(RoomId(room_id))?)
    })
    .await?;
    Ok(Json(occupancy))
}

async fn update_room(
    State(dormitory): Shared,
    Path(room_id): Path<u64>,
    Json(update): Json<RoomUpdate>,
) -> Result<Json<Room>, AppError> {
    let room = blocking(move || {
        Ok(dormitory
            .registry
            .update_room(RoomId(room_id), update)?)
    })
    .await?;
    Ok(Json(room))
}

async fn deactivate_room(
    State(dormitory): Shared,
    Path(room_id): Path<u64>,
) -> Result<Json<Room>, AppError> {
    let room = blocking(move || Ok(dormitory.registry.deactivate_room(RoomId(room_id))?)).await?;
    Ok(Json(room))
}

async fn reactivate_room(
    State(dormitory): Shared,
    Path(room_id): Path<u64>,
) -> Result<Json<Room>, AppError> {
    let room = blocking(move || Ok(dormitory.registry.reactivate_room(RoomId(room_id))?)).await?;
    Ok(Json(room))
}

#[derive(Debug, Deserialize)]
pub(crate) struct ActiveFlag {
    pub(crate) active: bool,
}

async fn create_guardian(
    State(dormitory): Shared,
    Json(contact): Json<NewContact>,
) -> Result<(StatusCode, Json<Guardian>), AppError> {
    let guardian = blocking(move || Ok(dormitory.registry.create_guardian(contact)?)).await?;
    Ok((StatusCode::CREATED, Json(guardian)))
}

async fn set_guardian_active(
    State(dormitory): Shared,
    Path(guardian_id): Path<u64>,
    Json(flag): Json<ActiveFlag>,
) -> Result<Json<Guardian>, AppError> {
    let guardian = blocking(move || {
        Ok(dormitory
            .registry
            .set_guardian_active(GuardianId(guardian_id), flag.active)?)
    })
    .await?;
    Ok(Json(guardian))
}

async fn create_emergency_contact(
    State(dormitory): Shared,
    Json(contact): Json<NewContact>,
) -> Result<(StatusCode, Json<EmergencyContact>), AppError> {
    let contact =
        blocking(move || Ok(dormitory.registry.create_emergency_contact(contact)?)).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn set_emergency_contact_active(
    State(dormitory): Shared,
    Path(contact_id): Path<u64>,
    Json(flag): Json<ActiveFlag>,
) -> Result<Json<EmergencyContact>, AppError> {
    let contact = blocking(move || {
        Ok(dormitory
            .registry
            .set_emergency_contact_active(EmergencyContactId(contact_id), flag.active)?)
    })
    .await?;
    Ok(Json(contact))
}

async fn create_tenant(
    State(dormitory): Shared,
    Json(tenant): Json<NewTenant>,
) -> Result<(StatusCode, Json<TenantCreation>), AppError> {
    let creation = blocking(move || Ok(dormitory.lifecycle.create_tenant(tenant)?)).await?;
    Ok((StatusCode::CREATED, Json(creation)))
}

async fn list_tenants(State(dormitory): Shared) -> Result<Json<Vec<TenantRow>>, AppError> {
    let rows = blocking(move || Ok(dormitory.dashboard.tenant_rows()?)).await?;
    Ok(Json(rows))
}

async fn update_tenant_details(
    State(dormitory): Shared,
    Path(tenant_id): Path<u64>,
    Json(details): Json<TenantDetails>,
) -> Result<Json<Tenant>, AppError> {
    let tenant = blocking(move || {
        Ok(dormitory
            .lifecycle
            .update_details(TenantId(tenant_id), details)?)
    })
    .await?;
    Ok(Json(tenant))
}

async fn tenant_links(
    State(dormitory): Shared,
    Path(tenant_id): Path<u64>,
) -> Result<Json<TenantLinks>, AppError> {
    let links =
        blocking(move || Ok(dormitory.lifecycle.resolve_links(TenantId(tenant_id))?)).await?;
    Ok(Json(links))
}

async fn relink_tenant(
    State(dormitory): Shared,
    Path(tenant_id): Path<u64>,
    Json(update): Json<LinksUpdate>,
) -> Result<Json<TenantLinks>, AppError> {
    let tenant_id = TenantId(tenant_id);
    let links = blocking(move || {
        dormitory.lifecycle.relink(tenant_id, &update)?;
        Ok(dormitory.lifecycle.resolve_links(tenant_id)?)
    })
    .await?;
    Ok(Json(links))
}

async fn assign_room(
    State(dormitory): Shared,
    Path(tenant_id): Path<u64>,
    Json(change): Json<RoomChangeRequest>,
) -> Result<Json<RoomAssignment>, AppError> {
    let assignment = blocking(move || {
        Ok(dormitory
            .lifecycle
            .assign_room(TenantId(tenant_id), change.room_id)?)
    })
    .await?;
    Ok(Json(assignment))
}

async fn deactivate_tenant(
    State(dormitory): Shared,
    Path(tenant_id): Path<u64>,
) -> Result<Json<Deactivation>, AppError> {
    let deactivation =
        blocking(move || Ok(dormitory.lifecycle.deactivate(TenantId(tenant_id))?)).await?;
    Ok(Json(deactivation))
}

async fn reactivate_tenant(
    State(dormitory): Shared,
    Path(tenant_id): Path<u64>,
) -> Result<Json<Tenant>, AppError> {
    let tenant = blocking(move || Ok(dormitory.lifecycle.reactivate(TenantId(tenant_id))?)).await?;
    Ok(Json(tenant))
}

async fn payment_history(
    State(dormitory): Shared,
    Path(tenant_id): Path<u64>,
) -> Result<Json<Vec<Payment>>, AppError> {
    let history =
        blocking(move || Ok(dormitory.billing.payment_history(TenantId(tenant_id))?)).await?;
    Ok(Json(history))
}

async fn rent_due(
    State(dormitory): Shared,
    Path(tenant_id): Path<u64>,
    Query(query): Query<AsOfQuery>,
) -> Result<Json<RentDueResponse>, AppError> {
    let tenant_id = TenantId(tenant_id);
    let as_of = query.as_of.unwrap_or_else(|| Local::now().date_naive());
    let rent_due = blocking(move || Ok(dormitory.billing.is_rent_due(tenant_id, as_of)?)).await?;
    Ok(Json(RentDueResponse {
        tenant_id,
        as_of,
        rent_due,
    }))
}

async fn record_payment(
    State(dormitory): Shared,
    Json(payment): Json<NewPayment>,
) -> Result<(StatusCode, Json<RecordedPayment>), AppError> {
    let recorded = blocking(move || Ok(dormitory.billing.record_payment(payment)?)).await?;
    Ok((StatusCode::CREATED, Json(recorded)))
}

async fn revenue(
    State(dormitory): Shared,
    Query(RevenueQuery { start, end }): Query<RevenueQuery>,
) -> Result<Json<RevenueResponse>, AppError> {
    let total = blocking(move || Ok(dormitory.billing.sum_revenue(start, end)?)).await?;
    Ok(Json(RevenueResponse {
        start,
        end,
        total,
        label: format_currency(total),
    }))
}

async fn dashboard(
    State(dormitory): Shared,
    Query(query): Query<TodayQuery>,
) -> Result<Json<DashboardSummary>, AppError> {
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    let summary = blocking(move || Ok(dormitory.dashboard.summary(today)?)).await?;
    Ok(Json(summary))
}

async fn overdue(
    State(dormitory): Shared,
    Query(query): Query<TodayQuery>,
) -> Result<Json<Vec<OverdueEntry>>, AppError> {
    let today = query.today.unwrap_or_else(|| Local::now().date_naive());
    let overdue = blocking(move || Ok(dormitory.dashboard.overdue_list(today)?)).await?;
    Ok(Json(overdue))
}
