use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use car_rental_backend::config::environment::EnvironmentConfig;
use car_rental_backend::database::DatabaseConnection;
use car_rental_backend::routes::create_app;
use car_rental_backend::services::notification_service::LogNotifier;
use car_rental_backend::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚗 Car Rental Backend");
    info!("=====================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    if let Err(e) = db_connection.run_migrations().await {
        error!("❌ Error aplicando migraciones: {}", e);
        return Err(e);
    }

    let pool = db_connection.pool().clone();

    let config = EnvironmentConfig::default();
    let app_state = AppState::new(pool, config.clone(), Arc::new(LogNotifier));
    let app = create_app(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🚗 Endpoints - Car:");
    info!("   POST /api/car - Registrar vehículo (staff)");
    info!("   GET  /api/car - Listar vehículos");
    info!("   GET  /api/car/available - Vehículos disponibles por intervalo");
    info!("   GET  /api/car/:id - Obtener vehículo");
    info!("   GET  /api/car/:id/availability - Disponibilidad por intervalo");
    info!("   PUT  /api/car/:id - Actualizar vehículo (staff)");
    info!("   DELETE /api/car/:id - Borrado lógico (staff)");
    info!("📅 Endpoints - Booking:");
    info!("   POST /api/booking - Crear reserva");
    info!("   GET  /api/booking - Listar reservas");
    info!("   GET  /api/booking/:id - Obtener reserva");
    info!("   POST /api/booking/:id/confirm - Confirmar reserva (staff)");
    info!("   POST /api/booking/:id/cancel - Cancelar reserva");
    info!("🔑 Endpoints - Rental (staff):");
    info!("   POST /api/rental - Crear alquiler");
    info!("   POST /api/rental/from-booking/:booking_id - Convertir reserva");
    info!("   GET  /api/rental - Listar alquileres");
    info!("   GET  /api/rental/:id - Obtener alquiler");
    info!("   POST /api/rental/:id/confirm - Confirmar alquiler");
    info!("   POST /api/rental/:id/activate - Entregar vehículo");
    info!("   POST /api/rental/:id/complete - Devolución y multa");
    info!("   POST /api/rental/:id/cancel - Cancelar alquiler");
    info!("👤 Endpoints - Driver:");
    info!("   POST /api/driver - Registrar conductor (staff)");
    info!("   GET  /api/driver - Listar conductores");
    info!("   GET  /api/driver/:id - Obtener conductor");
    info!("   DELETE /api/driver/:id - Borrado lógico (staff)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            anyhow::anyhow!(e)
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
