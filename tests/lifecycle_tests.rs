//! Tests de ciclo de vida contra PostgreSQL
//!
//! Ejercitan las máquinas de estados completas y el chequeo de conflictos
//! sobre una base de datos real: `#[sqlx::test]` crea una base efímera por
//! test y aplica las migraciones de ./migrations. Requieren DATABASE_URL.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use car_rental_backend::config::environment::EnvironmentConfig;
use car_rental_backend::controllers::booking_controller::BookingController;
use car_rental_backend::controllers::rental_controller::RentalController;
use car_rental_backend::dto::booking_dto::CreateBookingRequest;
use car_rental_backend::dto::car_dto::CreateCarRequest;
use car_rental_backend::dto::rental_dto::{CompleteRentalRequest, CreateRentalRequest};
use car_rental_backend::middleware::auth::AuthenticatedUser;
use car_rental_backend::models::booking::BookingStatus;
use car_rental_backend::models::car::{Car, CarCategory, PriceGroup};
use car_rental_backend::models::rental::RentalStatus;
use car_rental_backend::models::user::UserRole;
use car_rental_backend::repositories::booking_repository::BookingRepository;
use car_rental_backend::repositories::car_repository::CarRepository;
use car_rental_backend::repositories::rental_repository::RentalRepository;
use car_rental_backend::services::notification_service::LogNotifier;
use car_rental_backend::utils::errors::AppError;

fn test_config() -> EnvironmentConfig {
    EnvironmentConfig {
        environment: "test".to_string(),
        port: 3000,
        host: "127.0.0.1".to_string(),
        jwt_secret: "test-secret".to_string(),
        cors_origins: vec!["*".to_string()],
        daily_late_fee_rate: Decimal::from(50),
        auto_confirm_staff_bookings: true,
    }
}

fn staff() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::new_v4(),
        role: UserRole::Staff,
    }
}

fn customer() -> AuthenticatedUser {
    AuthenticatedUser {
        user_id: Uuid::new_v4(),
        role: UserRole::Customer,
    }
}

fn booking_controller(pool: &PgPool) -> BookingController {
    BookingController::new(pool.clone(), test_config(), Arc::new(LogNotifier))
}

fn rental_controller(pool: &PgPool) -> RentalController {
    RentalController::new(pool.clone(), test_config(), Arc::new(LogNotifier))
}

async fn seed_car(pool: &PgPool) -> Car {
    CarRepository::new(pool.clone())
        .create(CreateCarRequest {
            make: "Toyota".to_string(),
            model: "Corolla".to_string(),
            year: 2022,
            category: CarCategory::Sedan,
            price_group: PriceGroup::Standard,
            license_plate: format!("TB-{}", &Uuid::new_v4().simple().to_string()[..6]),
            daily_rate: Decimal::from(45),
        })
        .await
        .unwrap()
}

fn window(day: u32) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc.with_ymd_and_hms(2026, 10, day, 10, 0, 0).unwrap();
    (start, start + Duration::days(2))
}

#[sqlx::test(migrations = "./migrations")]
async fn booking_cancel_is_idempotent(pool: PgPool) {
    let car = seed_car(&pool).await;
    let controller = booking_controller(&pool);
    let actor = customer();
    let (start, end) = window(1);

    let booking = controller
        .create(
            &actor,
            CreateBookingRequest {
                car_id: car.id,
                driver_id: None,
                user_id: None,
                start_date: start,
                end_date: end,
            },
        )
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);

    let canceled = controller.cancel(&actor, booking.id).await.unwrap().data.unwrap();
    assert_eq!(canceled.status, BookingStatus::Canceled);

    // Segunda cancelación: éxito sin cambios
    let again = controller.cancel(&actor, booking.id).await.unwrap().data.unwrap();
    assert_eq!(again.status, BookingStatus::Canceled);
    assert_eq!(again.updated_at, canceled.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn rental_cancel_is_idempotent(pool: PgPool) {
    let car = seed_car(&pool).await;
    let controller = rental_controller(&pool);
    let (start, end) = window(5);

    let rental = controller
        .create(CreateRentalRequest {
            user_id: Uuid::new_v4(),
            car_id: car.id,
            driver_id: None,
            issued_date: start,
            expected_return_date: end,
            initial_status: None,
        })
        .await
        .unwrap()
        .data
        .unwrap();

    let canceled = controller.cancel(rental.id).await.unwrap().data.unwrap();
    assert_eq!(canceled.status, RentalStatus::Canceled);

    let again = controller.cancel(rental.id).await.unwrap().data.unwrap();
    assert_eq!(again.status, RentalStatus::Canceled);
    assert_eq!(again.updated_at, canceled.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn complete_from_non_active_rental_mutates_nothing(pool: PgPool) {
    let car = seed_car(&pool).await;
    let controller = rental_controller(&pool);
    let (start, end) = window(9);

    let rental = controller
        .create(CreateRentalRequest {
            user_id: Uuid::new_v4(),
            car_id: car.id,
            driver_id: None,
            issued_date: start,
            expected_return_date: end,
            initial_status: Some(RentalStatus::Confirmed),
        })
        .await
        .unwrap()
        .data
        .unwrap();

    let result = controller
        .complete(
            &staff(),
            rental.id,
            CompleteRentalRequest {
                returned_date: Some(end + Duration::hours(3)),
                fine_override: None,
            },
        )
        .await;
    assert!(matches!(result, Err(AppError::InvalidStateTransition(_))));

    // La transición ilegal no toca ningún campo
    let unchanged = RentalRepository::new(pool.clone())
        .find_by_id(rental.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.status, RentalStatus::Confirmed);
    assert_eq!(unchanged.returned_date, None);
    assert_eq!(unchanged.fine, Decimal::ZERO);
    assert_eq!(unchanged.receiver_id, None);
}

#[sqlx::test(migrations = "./migrations")]
async fn concurrent_overlapping_creates_yield_exactly_one_conflict(pool: PgPool) {
    let car = seed_car(&pool).await;
    let first = booking_controller(&pool);
    let second = booking_controller(&pool);
    let (start, end) = window(13);

    let request = |offset_hours: i64| CreateBookingRequest {
        car_id: car.id,
        driver_id: None,
        user_id: None,
        start_date: start + Duration::hours(offset_hours),
        end_date: end + Duration::hours(offset_hours),
    };

    let actor_a = customer();
    let actor_b = customer();
    let (a, b) = tokio::join!(
        first.create(&actor_a, request(0)),
        second.create(&actor_b, request(12)),
    );

    // El lock serializa los dos creates: uno gana, el otro ve la fila
    // del ganador y recibe Conflict
    let successes = [a.is_ok(), b.is_ok()].iter().filter(|ok| **ok).count();
    assert_eq!(successes, 1);
    let loser = if a.is_err() { a } else { b };
    assert!(matches!(loser, Err(AppError::Conflict(_))));
}

#[sqlx::test(migrations = "./migrations")]
async fn full_lifecycle_from_booking_to_completed_rental(pool: PgPool) {
    let car = seed_car(&pool).await;
    let bookings = booking_controller(&pool);
    let rentals = rental_controller(&pool);
    let car_repository = CarRepository::new(pool.clone());
    let actor = customer();
    let operator = staff();
    let (start, end) = window(17);

    // Reserva del cliente: nace pendiente
    let booking = bookings
        .create(
            &actor,
            CreateBookingRequest {
                car_id: car.id,
                driver_id: None,
                user_id: None,
                start_date: start,
                end_date: end,
            },
        )
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(booking.status, BookingStatus::Pending);

    let confirmed = bookings.confirm(booking.id).await.unwrap().data.unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);

    // Conversión: el rental hereda el intervalo y la reserva queda converted
    let rental = rentals
        .create_from_booking(booking.id)
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(rental.status, RentalStatus::PendingConfirmation);
    assert_eq!(rental.booking_id, Some(booking.id));
    assert_eq!(rental.issued_date, start);
    assert_eq!(rental.expected_return_date, end);

    let source = BookingRepository::new(pool.clone())
        .find_by_id(booking.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(source.status, BookingStatus::Converted);

    let rental = rentals.confirm(rental.id).await.unwrap().data.unwrap();
    assert_eq!(rental.status, RentalStatus::Confirmed);

    // Entrega: el flag available baja en la misma transacción
    let rental = rentals.activate(&operator, rental.id).await.unwrap().data.unwrap();
    assert_eq!(rental.status, RentalStatus::Active);
    assert_eq!(rental.issuer_id, Some(operator.user_id));
    let delivered = car_repository.find_by_id(car.id).await.unwrap().unwrap();
    assert!(!delivered.available);

    // Devolución puntual: multa cero y vehículo disponible de nuevo
    let rental = rentals
        .complete(
            &operator,
            rental.id,
            CompleteRentalRequest {
                returned_date: Some(end),
                fine_override: None,
            },
        )
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(rental.status, RentalStatus::Completed);
    assert_eq!(rental.fine, Decimal::ZERO);
    assert_eq!(rental.receiver_id, Some(operator.user_id));
    assert_eq!(rental.returned_date, Some(end));

    let returned = car_repository.find_by_id(car.id).await.unwrap().unwrap();
    assert!(returned.available);
}

#[sqlx::test(migrations = "./migrations")]
async fn late_return_fine_lands_on_the_rental_row(pool: PgPool) {
    let car = seed_car(&pool).await;
    let rentals = rental_controller(&pool);
    let operator = staff();
    let (start, end) = window(21);

    let rental = rentals
        .create(CreateRentalRequest {
            user_id: Uuid::new_v4(),
            car_id: car.id,
            driver_id: None,
            issued_date: start,
            expected_return_date: end,
            initial_status: Some(RentalStatus::Confirmed),
        })
        .await
        .unwrap()
        .data
        .unwrap();

    let rental = rentals.activate(&operator, rental.id).await.unwrap().data.unwrap();

    // 25 horas tarde: dos días de tarifa (50/día en la config de test)
    let completed = rentals
        .complete(
            &operator,
            rental.id,
            CompleteRentalRequest {
                returned_date: Some(end + Duration::hours(25)),
                fine_override: None,
            },
        )
        .await
        .unwrap()
        .data
        .unwrap();
    assert_eq!(completed.fine, Decimal::from(100));
}
