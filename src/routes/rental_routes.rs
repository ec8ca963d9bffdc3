use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use uuid::Uuid;

use crate::controllers::rental_controller::RentalController;
use crate::dto::common::ApiResponse;
use crate::dto::rental_dto::{
    CompleteRentalRequest, CreateRentalRequest, RentalFilters, RentalResponse,
};
use crate::middleware::auth::{staff_only_middleware, AuthenticatedUser};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_rental_router() -> Router<AppState> {
    // Todo el ciclo de vida del alquiler lo opera el staff
    let staff_routes = Router::new()
        .route("/from-booking/:booking_id", post(create_rental_from_booking))
        .route("/:id/confirm", post(confirm_rental))
        .route("/:id/activate", post(activate_rental))
        .route("/:id/complete", post(complete_rental))
        .route("/:id/cancel", post(cancel_rental))
        .route_layer(middleware::from_fn(staff_only_middleware));

    Router::new()
        .route(
            "/",
            post(create_rental)
                .route_layer(middleware::from_fn(staff_only_middleware))
                .get(list_rentals),
        )
        .route("/:id", get(get_rental))
        .merge(staff_routes)
}

fn controller(state: &AppState) -> RentalController {
    RentalController::new(state.pool.clone(), state.config.clone(), state.notifier.clone())
}

async fn create_rental(
    State(state): State<AppState>,
    Json(request): Json<CreateRentalRequest>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let response = controller(&state).create(request).await?;
    Ok(Json(response))
}

async fn create_rental_from_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let response = controller(&state).create_from_booking(booking_id).await?;
    Ok(Json(response))
}

async fn list_rentals(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Query(filters): Query<RentalFilters>,
) -> Result<Json<Vec<RentalResponse>>, AppError> {
    let response = controller(&state).list(&actor, filters).await?;
    Ok(Json(response))
}

async fn get_rental(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<RentalResponse>, AppError> {
    let response = controller(&state).get_by_id(&actor, id).await?;
    Ok(Json(response))
}

async fn confirm_rental(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let response = controller(&state).confirm(id).await?;
    Ok(Json(response))
}

async fn activate_rental(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let response = controller(&state).activate(&actor, id).await?;
    Ok(Json(response))
}

async fn complete_rental(
    State(state): State<AppState>,
    Extension(actor): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(request): Json<CompleteRentalRequest>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let response = controller(&state).complete(&actor, id, request).await?;
    Ok(Json(response))
}

async fn cancel_rental(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<RentalResponse>>, AppError> {
    let response = controller(&state).cancel(id).await?;
    Ok(Json(response))
}
