use axum::{
    extract::{Path, Query, State},
    middleware,
    routing::{get, post, put},
    Json, Router,
};
use serde_json::json;
use uuid::Uuid;

use crate::controllers::car_controller::CarController;
use crate::dto::car_dto::{
    AvailabilityQuery, CarFilters, CarResponse, CheckAvailabilityQuery, CreateCarRequest,
    UpdateCarRequest,
};
use crate::dto::common::ApiResponse;
use crate::middleware::auth::staff_only_middleware;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_car_router() -> Router<AppState> {
    // Las mutaciones comparten path con las lecturas, así que el filtro
    // de staff se aplica por método y no sobre un router aparte
    Router::new()
        .route(
            "/",
            post(create_car)
                .route_layer(middleware::from_fn(staff_only_middleware))
                .get(list_cars),
        )
        .route("/available", get(list_available_cars))
        .route(
            "/:id",
            put(update_car)
                .delete(delete_car)
                .route_layer(middleware::from_fn(staff_only_middleware))
                .get(get_car),
        )
        .route("/:id/availability", get(check_availability))
}

async fn create_car(
    State(state): State<AppState>,
    Json(request): Json<CreateCarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.create(request).await?;
    Ok(Json(response))
}

async fn get_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CarResponse>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.get_by_id(id).await?;
    Ok(Json(response))
}

async fn list_cars(
    State(state): State<AppState>,
    Query(filters): Query<CarFilters>,
) -> Result<Json<Vec<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.list(filters).await?;
    Ok(Json(response))
}

async fn list_available_cars(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.list_available(query).await?;
    Ok(Json(response))
}

async fn check_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<CheckAvailabilityQuery>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let available = controller
        .check_availability(id, query.start, query.end)
        .await?;
    Ok(Json(json!({
        "car_id": id,
        "start": query.start,
        "end": query.end,
        "available": available,
    })))
}

async fn update_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateCarRequest>,
) -> Result<Json<ApiResponse<CarResponse>>, AppError> {
    let controller = CarController::new(state.pool.clone());
    let response = controller.update(id, request).await?;
    Ok(Json(response))
}

async fn delete_car(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    let controller = CarController::new(state.pool.clone());
    controller.delete(id).await?;
    Ok(Json(json!({
        "success": true,
        "message": "Vehículo eliminado exitosamente"
    })))
}
