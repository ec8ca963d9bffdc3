use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::booking_controller::BookingController;
use crate::dto::booking_dto::{BookingFilters, BookingResponse, CreateBookingRequest};
use crate::dto::common::ApiResponse;
use crate::middleware::auth::{staff_only_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_booking_router() -> Router<AppState> {
    let staff_routes = Router::new()
        .route("/:id/confirm", post(confirm_booking))
        .route_layer(middleware::from_fn(staff_only_middleware));

    Router::new()
        .route("/", post(create_booking))
        .route("/", get(list_bookings))
        .route("/:id", get(get_booking))
        .route("/:id/cancel", post(cancel_booking))
        .merge(staff_routes)
}

async fn create_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Json(request): Json<CreateBookingRequest>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller =
        BookingController::new(state.pool.clone(), state.config.clone(), state.notifier.clone());
    let response = controller.create(&actor, request).await?;
    Ok(Json(response))
}

async fn list_bookings(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Query(filters): Query<BookingFilters>,
) -> Result<Json<Vec<BookingResponse>>, AppError> {
    let controller =
        BookingController::new(state.pool.clone(), state.config.clone(), state.notifier.clone());
    let response = controller.list(&actor, filters).await?;
    Ok(Json(response))
}

async fn get_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingResponse>, AppError> {
    let controller =
        BookingController::new(state.pool.clone(), state.config.clone(), state.notifier.clone());
    let response = controller.get_by_id(&actor, id).await?;
    Ok(Json(response))
}

async fn confirm_booking(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller =
        BookingController::new(state.pool.clone(), state.config.clone(), state.notifier.clone());
    let response = controller.confirm(id).await?;
    Ok(Json(response))
}

async fn cancel_booking(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<BookingResponse>>, AppError> {
    let controller =
        BookingController::new(state.pool.clone(), state.config.clone(), state.notifier.clone());
    let response = controller.cancel(&actor, id).await?;
    Ok(Json(response))
}
