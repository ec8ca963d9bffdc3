//! Ciclo de vida de Booking
//!
//! Máquina de estados PENDING → CONFIRMED → CANCELED (más CONVERTED al
//! promocionarse a Rental). Toda creación o confirmación ejecuta el
//! chequeo de solape y la mutación como una unidad atómica: transacción
//! con advisory lock por vehículo y re-chequeo dentro de ella.

use crate::config::EnvironmentConfig;
use crate::dto::booking_dto::{BookingFilters, BookingResponse, CreateBookingRequest};
use crate::dto::common::ApiResponse;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::BookingStatus;
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::car_repository::CarRepository;
use crate::repositories::driver_repository::DriverRepository;
use crate::services::availability_service;
use crate::services::notification_service::{self, NotificationEvent, Notifier};
use crate::utils::errors::{invalid_transition_error, AppError, AppResult};
use crate::utils::validation::validate_interval;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub struct BookingController {
    pool: PgPool,
    config: EnvironmentConfig,
    notifier: Arc<dyn Notifier>,
    repository: BookingRepository,
    car_repository: CarRepository,
    driver_repository: DriverRepository,
}

impl BookingController {
    pub fn new(pool: PgPool, config: EnvironmentConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository: BookingRepository::new(pool.clone()),
            car_repository: CarRepository::new(pool.clone()),
            driver_repository: DriverRepository::new(pool.clone()),
            pool,
            config,
            notifier,
        }
    }

    pub async fn create(
        &self,
        actor: &AuthenticatedUser,
        request: CreateBookingRequest,
    ) -> AppResult<ApiResponse<BookingResponse>> {
        validate_interval(request.start_date, request.end_date)
            .map_err(interval_validation_error)?;

        // Un staff puede reservar en nombre de otro usuario
        let user_id = match request.user_id {
            Some(other) if other != actor.user_id => {
                if !actor.role.is_staff() {
                    return Err(AppError::Forbidden(
                        "Solo el staff puede reservar en nombre de otro usuario".to_string(),
                    ));
                }
                other
            }
            _ => actor.user_id,
        };

        // Un vehículo inexistente o borrado no se puede reservar
        let car = self
            .car_repository
            .find_by_id(request.car_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Car with id '{}' not found", request.car_id))
            })?;

        if let Some(driver_id) = request.driver_id {
            self.driver_repository
                .find_by_id(driver_id)
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("Driver with id '{}' not found", driver_id))
                })?;
        }

        let initial_status = if actor.role.is_staff() && self.config.auto_confirm_staff_bookings {
            BookingStatus::Confirmed
        } else {
            BookingStatus::Pending
        };

        let mut tx = self.pool.begin().await?;
        lock_car(&mut tx, car.id).await?;

        // Re-chequeo de solape dentro de la transacción: dos creates
        // concurrentes para el mismo vehículo se serializan en el lock
        // y el perdedor ve la fila del ganador
        if let Some(conflict) =
            availability_service::find_conflict(&mut *tx, car.id, request.start_date, request.end_date, None, None)
                .await?
        {
            return Err(conflict_error(car.id, request.start_date, request.end_date, &conflict));
        }

        let booking = BookingRepository::create_in_tx(
            &mut *tx,
            user_id,
            car.id,
            request.driver_id,
            request.start_date,
            request.end_date,
            initial_status,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Reserva {} creada para el vehículo {} [{} - {}) con estado {}",
            booking.id,
            car.id,
            booking.start_date,
            booking.end_date,
            booking.status
        );

        if booking.status == BookingStatus::Confirmed {
            notification_service::dispatch(
                self.notifier.clone(),
                NotificationEvent::BookingConfirmed {
                    booking_id: booking.id,
                    user_id: booking.user_id,
                },
            );
        }

        Ok(ApiResponse::success_with_message(
            booking.into(),
            "Reserva creada exitosamente".to_string(),
        ))
    }

    /// Confirmar una reserva pendiente. La ventana entre creación y
    /// confirmación puede haber dejado entrar una reserva en conflicto,
    /// así que la disponibilidad se re-valida dentro de la transacción.
    pub async fn confirm(&self, id: Uuid) -> AppResult<ApiResponse<BookingResponse>> {
        let booking = self.require_booking(id).await?;

        let mut tx = self.pool.begin().await?;
        lock_car(&mut tx, booking.car_id).await?;

        let booking = BookingRepository::find_by_id_in_tx(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking with id '{}' not found", id)))?;

        if booking.status != BookingStatus::Pending {
            return Err(invalid_transition_error(
                "booking",
                booking.status.as_str(),
                "confirm",
            ));
        }

        // El propio registro pendiente se excluye del re-chequeo
        if let Some(conflict) = availability_service::find_conflict(
            &mut *tx,
            booking.car_id,
            booking.start_date,
            booking.end_date,
            Some(booking.id),
            None,
        )
        .await?
        {
            return Err(conflict_error(
                booking.car_id,
                booking.start_date,
                booking.end_date,
                &conflict,
            ));
        }

        let confirmed = BookingRepository::transition_in_tx(
            &mut *tx,
            id,
            BookingStatus::Pending,
            BookingStatus::Confirmed,
        )
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "Booking '{}' changed state concurrently; retry",
                id
            ))
        })?;

        tx.commit().await?;

        notification_service::dispatch(
            self.notifier.clone(),
            NotificationEvent::BookingConfirmed {
                booking_id: confirmed.id,
                user_id: confirmed.user_id,
            },
        );

        Ok(ApiResponse::success_with_message(
            confirmed.into(),
            "Reserva confirmada exitosamente".to_string(),
        ))
    }

    /// Cancelar una reserva. Legal desde PENDING o CONFIRMED; cancelar
    /// una reserva ya cancelada es un éxito sin cambios (idempotente).
    pub async fn cancel(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> AppResult<ApiResponse<BookingResponse>> {
        let booking = self.require_booking(id).await?;

        if !actor.role.is_staff() && booking.user_id != actor.user_id {
            return Err(AppError::Forbidden(
                "No tienes permiso para cancelar esta reserva".to_string(),
            ));
        }

        if booking.status == BookingStatus::Canceled {
            return Ok(ApiResponse::success_with_message(
                booking.into(),
                "La reserva ya estaba cancelada".to_string(),
            ));
        }

        if !booking.status.can_transition_to(BookingStatus::Canceled) {
            return Err(invalid_transition_error(
                "booking",
                booking.status.as_str(),
                "cancel",
            ));
        }

        let mut tx = self.pool.begin().await?;
        let canceled = BookingRepository::transition_in_tx(
            &mut *tx,
            id,
            booking.status,
            BookingStatus::Canceled,
        )
        .await?;
        tx.commit().await?;

        let canceled = match canceled {
            Some(b) => b,
            // Perdimos una carrera con otra transición; re-leer decide
            None => {
                let current = self.require_booking(id).await?;
                if current.status == BookingStatus::Canceled {
                    return Ok(ApiResponse::success_with_message(
                        current.into(),
                        "La reserva ya estaba cancelada".to_string(),
                    ));
                }
                return Err(invalid_transition_error(
                    "booking",
                    current.status.as_str(),
                    "cancel",
                ));
            }
        };

        notification_service::dispatch(
            self.notifier.clone(),
            NotificationEvent::BookingCanceled {
                booking_id: canceled.id,
                user_id: canceled.user_id,
            },
        );

        Ok(ApiResponse::success_with_message(
            canceled.into(),
            "Reserva cancelada exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> AppResult<BookingResponse> {
        let booking = self.require_booking(id).await?;

        if !actor.role.is_staff() && booking.user_id != actor.user_id {
            return Err(AppError::Forbidden(
                "No tienes permiso para ver esta reserva".to_string(),
            ));
        }

        Ok(booking.into())
    }

    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        mut filters: BookingFilters,
    ) -> AppResult<Vec<BookingResponse>> {
        // Un cliente solo ve sus propias reservas
        if !actor.role.is_staff() {
            filters.user_id = Some(actor.user_id);
        }

        let bookings = self.repository.list(&filters).await?;
        Ok(bookings.into_iter().map(Into::into).collect())
    }

    async fn require_booking(&self, id: Uuid) -> AppResult<crate::models::booking::Booking> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking with id '{}' not found", id)))
    }
}

/// Advisory lock transaccional por vehículo: serializa los chequeos de
/// solape concurrentes sobre el mismo coche. Se libera solo al terminar
/// la transacción.
pub(crate) async fn lock_car(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    car_id: Uuid,
) -> AppResult<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1::text))")
        .bind(car_id)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

pub(crate) fn conflict_error(
    car_id: Uuid,
    start: chrono::DateTime<chrono::Utc>,
    end: chrono::DateTime<chrono::Utc>,
    conflict: &availability_service::ReservationConflict,
) -> AppError {
    AppError::Conflict(format!(
        "Car '{}' is not available for [{}, {}): conflicting {} in status '{}' over [{}, {})",
        car_id, start, end, conflict.source, conflict.status, conflict.start_date, conflict.end_date
    ))
}

pub(crate) fn interval_validation_error(error: validator::ValidationError) -> AppError {
    let mut errors = validator::ValidationErrors::new();
    errors.add("interval", error);
    AppError::Validation(errors)
}
