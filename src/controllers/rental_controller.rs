//! Ciclo de vida de Rental
//!
//! Máquina de estados PENDING_CONFIRMATION → CONFIRMED → ACTIVE →
//! COMPLETED, con CANCELED alcanzable desde cualquier estado no terminal.
//! Las mutaciones del flag `available` del vehículo ocurren en la misma
//! transacción que la transición de estado del alquiler.

use crate::config::EnvironmentConfig;
use crate::controllers::booking_controller::{
    conflict_error, interval_validation_error, lock_car,
};
use crate::dto::common::ApiResponse;
use crate::dto::rental_dto::{
    CompleteRentalRequest, CreateRentalRequest, RentalFilters, RentalResponse,
};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::booking::BookingStatus;
use crate::models::rental::{Rental, RentalStatus};
use crate::repositories::booking_repository::BookingRepository;
use crate::repositories::car_repository::CarRepository;
use crate::repositories::driver_repository::DriverRepository;
use crate::repositories::rental_repository::RentalRepository;
use crate::services::availability_service;
use crate::services::fine_calculator::compute_fine;
use crate::services::notification_service::{self, NotificationEvent, Notifier};
use crate::utils::errors::{invalid_transition_error, AppError, AppResult};
use crate::utils::validation::{validate_interval, validate_non_negative};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub struct RentalController {
    pool: PgPool,
    config: EnvironmentConfig,
    notifier: Arc<dyn Notifier>,
    repository: RentalRepository,
    car_repository: CarRepository,
    driver_repository: DriverRepository,
}

impl RentalController {
    pub fn new(pool: PgPool, config: EnvironmentConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            repository: RentalRepository::new(pool.clone()),
            car_repository: CarRepository::new(pool.clone()),
            driver_repository: DriverRepository::new(pool.clone()),
            pool,
            config,
            notifier,
        }
    }

    /// Crear un alquiler directo (sin reserva previa). Misma precondición
    /// de disponibilidad que la creación de reservas.
    pub async fn create(
        &self,
        request: CreateRentalRequest,
    ) -> AppResult<ApiResponse<RentalResponse>> {
        validate_interval(request.issued_date, request.expected_return_date)
            .map_err(interval_validation_error)?;

        let initial_status = request
            .initial_status
            .unwrap_or(RentalStatus::PendingConfirmation);
        if !matches!(
            initial_status,
            RentalStatus::PendingConfirmation | RentalStatus::Confirmed
        ) {
            return Err(AppError::BadRequest(format!(
                "A rental cannot be created directly in status '{}'",
                initial_status
            )));
        }

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

        let mut tx = self.pool.begin().await?;
        lock_car(&mut tx, car.id).await?;

        if let Some(conflict) = availability_service::find_conflict(
            &mut *tx,
            car.id,
            request.issued_date,
            request.expected_return_date,
            None,
            None,
        )
        .await?
        {
            return Err(conflict_error(
                car.id,
                request.issued_date,
                request.expected_return_date,
                &conflict,
            ));
        }

        let rental = RentalRepository::create_in_tx(
            &mut *tx,
            None,
            request.user_id,
            car.id,
            request.driver_id,
            request.issued_date,
            request.expected_return_date,
            initial_status,
        )
        .await?;

        tx.commit().await?;

        tracing::info!(
            "Alquiler {} creado para el vehículo {} [{} - {})",
            rental.id,
            car.id,
            rental.issued_date,
            rental.expected_return_date
        );

        Ok(ApiResponse::success_with_message(
            rental.into(),
            "Alquiler creado exitosamente".to_string(),
        ))
    }

    /// Convertir una reserva confirmada en un alquiler. La reserva pasa a
    /// CONVERTED y el alquiler hereda usuario, vehículo, conductor e
    /// intervalo; la propia reserva se excluye del re-chequeo de solape.
    pub async fn create_from_booking(
        &self,
        booking_id: Uuid,
    ) -> AppResult<ApiResponse<RentalResponse>> {
        let booking = BookingRepository::new(self.pool.clone())
            .find_by_id(booking_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Booking with id '{}' not found", booking_id))
            })?;

        let mut tx = self.pool.begin().await?;
        lock_car(&mut tx, booking.car_id).await?;

        let booking = BookingRepository::find_by_id_in_tx(&mut *tx, booking_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Booking with id '{}' not found", booking_id))
            })?;

        if booking.status != BookingStatus::Confirmed {
            return Err(invalid_transition_error(
                "booking",
                booking.status.as_str(),
                "convert to rental",
            ));
        }

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

        let rental = RentalRepository::create_in_tx(
            &mut *tx,
            Some(booking.id),
            booking.user_id,
            booking.car_id,
            booking.driver_id,
            booking.start_date,
            booking.end_date,
            RentalStatus::PendingConfirmation,
        )
        .await?;

        BookingRepository::transition_in_tx(
            &mut *tx,
            booking.id,
            BookingStatus::Confirmed,
            BookingStatus::Converted,
        )
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!(
                "Booking '{}' changed state concurrently; retry",
                booking.id
            ))
        })?;

        tx.commit().await?;

        tracing::info!(
            "Reserva {} convertida en alquiler {}",
            booking.id,
            rental.id
        );

        Ok(ApiResponse::success_with_message(
            rental.into(),
            "Reserva convertida en alquiler exitosamente".to_string(),
        ))
    }

    /// PENDING_CONFIRMATION → CONFIRMED, re-validando disponibilidad
    pub async fn confirm(&self, id: Uuid) -> AppResult<ApiResponse<RentalResponse>> {
        let rental = self.require_rental(id).await?;

        let mut tx = self.pool.begin().await?;
        lock_car(&mut tx, rental.car_id).await?;

        let rental = self.require_rental_in_tx(&mut tx, id).await?;
        if rental.status != RentalStatus::PendingConfirmation {
            return Err(invalid_transition_error(
                "rental",
                rental.status.as_str(),
                "confirm",
            ));
        }

        // El propio alquiler pendiente se excluye del re-chequeo
        if let Some(conflict) = availability_service::find_conflict(
            &mut *tx,
            rental.car_id,
            rental.issued_date,
            rental.expected_return_date,
            rental.booking_id,
            Some(rental.id),
        )
        .await?
        {
            return Err(conflict_error(
                rental.car_id,
                rental.issued_date,
                rental.expected_return_date,
                &conflict,
            ));
        }

        let confirmed = RentalRepository::transition_in_tx(
            &mut *tx,
            id,
            RentalStatus::PendingConfirmation,
            RentalStatus::Confirmed,
        )
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!("Rental '{}' changed state concurrently; retry", id))
        })?;

        tx.commit().await?;

        notification_service::dispatch(
            self.notifier.clone(),
            NotificationEvent::RentalConfirmed {
                rental_id: confirmed.id,
                user_id: confirmed.user_id,
            },
        );

        Ok(ApiResponse::success_with_message(
            confirmed.into(),
            "Alquiler confirmado exitosamente".to_string(),
        ))
    }

    /// CONFIRMED → ACTIVE: el vehículo se entrega al cliente. El flag
    /// `available` del vehículo baja en la misma transacción.
    pub async fn activate(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> AppResult<ApiResponse<RentalResponse>> {
        let rental = self.require_rental(id).await?;

        let mut tx = self.pool.begin().await?;
        lock_car(&mut tx, rental.car_id).await?;

        let rental = self.require_rental_in_tx(&mut tx, id).await?;
        if rental.status != RentalStatus::Confirmed {
            return Err(invalid_transition_error(
                "rental",
                rental.status.as_str(),
                "activate",
            ));
        }

        let activated = RentalRepository::activate_in_tx(&mut *tx, id, actor.user_id)
            .await?
            .ok_or_else(|| {
                AppError::Conflict(format!("Rental '{}' changed state concurrently; retry", id))
            })?;

        CarRepository::set_available_in_tx(&mut *tx, rental.car_id, false).await?;

        tx.commit().await?;

        tracing::info!(
            "Alquiler {} activado: vehículo {} entregado por {}",
            activated.id,
            activated.car_id,
            actor.user_id
        );

        notification_service::dispatch(
            self.notifier.clone(),
            NotificationEvent::RentalActivated {
                rental_id: activated.id,
                user_id: activated.user_id,
            },
        );

        Ok(ApiResponse::success_with_message(
            activated.into(),
            "Vehículo entregado exitosamente".to_string(),
        ))
    }

    /// ACTIVE → COMPLETED: devolución del vehículo. La multa la fija el
    /// override del staff si está presente; si no, la calculadora. El
    /// vehículo vuelve a estar disponible salvo que esté borrado
    /// (el borrado tiene precedencia y lo aplica el propio UPDATE).
    pub async fn complete(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
        request: CompleteRentalRequest,
    ) -> AppResult<ApiResponse<RentalResponse>> {
        let rental = self.require_rental(id).await?;

        let returned_date = request.returned_date.unwrap_or_else(Utc::now);

        let fine = match request.fine_override {
            Some(override_fine) => {
                validate_non_negative(override_fine).map_err(|error| {
                    let mut errors = validator::ValidationErrors::new();
                    errors.add("fine_override", error);
                    AppError::Validation(errors)
                })?;
                override_fine
            }
            None => compute_fine(
                rental.expected_return_date,
                returned_date,
                self.config.daily_late_fee_rate,
            )?,
        };

        let mut tx = self.pool.begin().await?;
        lock_car(&mut tx, rental.car_id).await?;

        let rental = self.require_rental_in_tx(&mut tx, id).await?;
        if rental.status != RentalStatus::Active {
            return Err(invalid_transition_error(
                "rental",
                rental.status.as_str(),
                "complete",
            ));
        }

        let completed =
            RentalRepository::complete_in_tx(&mut *tx, id, actor.user_id, returned_date, fine)
                .await?
                .ok_or_else(|| {
                    AppError::Conflict(format!(
                        "Rental '{}' changed state concurrently; retry",
                        id
                    ))
                })?;

        CarRepository::set_available_in_tx(&mut *tx, rental.car_id, true).await?;

        tx.commit().await?;

        tracing::info!(
            "Alquiler {} completado: devuelto el {}, multa {}",
            completed.id,
            returned_date,
            completed.fine
        );

        notification_service::dispatch(
            self.notifier.clone(),
            NotificationEvent::RentalCompleted {
                rental_id: completed.id,
                user_id: completed.user_id,
            },
        );

        Ok(ApiResponse::success_with_message(
            completed.into(),
            "Alquiler completado exitosamente".to_string(),
        ))
    }

    /// Cancelar un alquiler no terminal. Si estaba ACTIVE, el vehículo
    /// vuelve a estar disponible igual que en complete. Cancelar un
    /// alquiler ya cancelado es un éxito sin cambios.
    pub async fn cancel(&self, id: Uuid) -> AppResult<ApiResponse<RentalResponse>> {
        let rental = self.require_rental(id).await?;

        if rental.status == RentalStatus::Canceled {
            return Ok(ApiResponse::success_with_message(
                rental.into(),
                "El alquiler ya estaba cancelado".to_string(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        lock_car(&mut tx, rental.car_id).await?;

        let rental = self.require_rental_in_tx(&mut tx, id).await?;
        match rental.status {
            RentalStatus::Canceled => {
                return Ok(ApiResponse::success_with_message(
                    rental.into(),
                    "El alquiler ya estaba cancelado".to_string(),
                ));
            }
            status if !status.can_transition_to(RentalStatus::Canceled) => {
                return Err(invalid_transition_error(
                    "rental",
                    status.as_str(),
                    "cancel",
                ));
            }
            _ => {}
        }

        let was_active = rental.status == RentalStatus::Active;

        let canceled = RentalRepository::transition_in_tx(
            &mut *tx,
            id,
            rental.status,
            RentalStatus::Canceled,
        )
        .await?
        .ok_or_else(|| {
            AppError::Conflict(format!("Rental '{}' changed state concurrently; retry", id))
        })?;

        if was_active {
            CarRepository::set_available_in_tx(&mut *tx, rental.car_id, true).await?;
        }

        tx.commit().await?;

        notification_service::dispatch(
            self.notifier.clone(),
            NotificationEvent::RentalCanceled {
                rental_id: canceled.id,
                user_id: canceled.user_id,
            },
        );

        Ok(ApiResponse::success_with_message(
            canceled.into(),
            "Alquiler cancelado exitosamente".to_string(),
        ))
    }

    pub async fn get_by_id(
        &self,
        actor: &AuthenticatedUser,
        id: Uuid,
    ) -> AppResult<RentalResponse> {
        let rental = self.require_rental(id).await?;

        if !actor.role.is_staff() && rental.user_id != actor.user_id {
            return Err(AppError::Forbidden(
                "No tienes permiso para ver este alquiler".to_string(),
            ));
        }

        Ok(rental.into())
    }

    pub async fn list(
        &self,
        actor: &AuthenticatedUser,
        mut filters: RentalFilters,
    ) -> AppResult<Vec<RentalResponse>> {
        // Un cliente solo ve sus propios alquileres
        if !actor.role.is_staff() {
            filters.user_id = Some(actor.user_id);
        }

        let rentals = self.repository.list(&filters).await?;
        Ok(rentals.into_iter().map(Into::into).collect())
    }

    async fn require_rental(&self, id: Uuid) -> AppResult<Rental> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rental with id '{}' not found", id)))
    }

    async fn require_rental_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> AppResult<Rental> {
        RentalRepository::find_by_id_in_tx(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Rental with id '{}' not found", id)))
    }
}
