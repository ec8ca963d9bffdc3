//! Rutas de la API
//!
//! Routers de Axum por recurso. Las rutas de mutación de vehículos y
//! todo el ciclo de vida de rentals están reservadas al staff.

pub mod booking_routes;
pub mod car_routes;
pub mod driver_routes;
pub mod rental_routes;

use crate::middleware::auth::auth_middleware;
use crate::middleware::cors::{cors_middleware, cors_middleware_with_origins};
use crate::state::AppState;
use axum::{middleware, response::Json, routing::get, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

/// Router de la API completa, con autenticación JWT sobre /api
pub fn create_app(state: AppState) -> Router {
    let api = Router::new()
        .nest("/car", car_routes::create_car_router())
        .nest("/booking", booking_routes::create_booking_router())
        .nest("/rental", rental_routes::create_rental_router())
        .nest("/driver", driver_routes::create_driver_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    // CORS_ORIGINS="*" abre todo (desarrollo); cualquier otra lista
    // restringe a esos orígenes
    let cors = if state.config.cors_origins.iter().any(|origin| origin == "*") {
        cors_middleware()
    } else {
        cors_middleware_with_origins(state.config.cors_origins.clone())
    };

    Router::new()
        .route("/health", get(health_endpoint))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check público
async fn health_endpoint() -> Json<serde_json::Value> {
    Json(json!({
        "service": "car-rental",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
