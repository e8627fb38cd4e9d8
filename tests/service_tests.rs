//! Tests de integración de los servicios contra un API en memoria
//!
//! El doble de test implementa la misma superficie de capacidades que el
//! cliente HTTP, de modo que los servicios se ejercitan completos sin
//! colaboradores vivos.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use vehicle_rental::client::RentalApi;
use vehicle_rental::config::environment::EnvironmentConfig;
use vehicle_rental::dto::booking_dto::CreateBookingRequest;
use vehicle_rental::dto::vehicle_dto::CreateVehicleRequest;
use vehicle_rental::models::booking::{Booking, BookingStatus, StatusFilter};
use vehicle_rental::models::user::{User, UserRole};
use vehicle_rental::models::vehicle::{Vehicle, VehicleSpecifications};
use vehicle_rental::notifications::{NotificationCenter, NotificationLevel};
use vehicle_rental::services::booking_service::BookingService;
use vehicle_rental::services::pricing_service::{total_price, RateCard};
use vehicle_rental::services::vehicle_service::{VehicleService, VehicleScope};
use vehicle_rental::state::{AuthCredential, SessionState};
use vehicle_rental::utils::errors::{AppError, AppResult};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn test_user(role: UserRole) -> User {
    User {
        id: Uuid::new_v4(),
        first_name: "Asha".to_string(),
        last_name: "Verma".to_string(),
        email: "asha@example.com".to_string(),
        role,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        name: None,
        phone: None,
        profile_image: None,
    }
}

fn test_vehicle(owner_id: Uuid, name: &str, brand: &str, location: &str) -> Vehicle {
    Vehicle {
        id: Uuid::new_v4(),
        name: name.to_string(),
        brand: brand.to_string(),
        model: "Corolla".to_string(),
        year: 2022,
        category: "sedan".to_string(),
        description: String::new(),
        price_per_day: Decimal::from(1500),
        price_per_week: Some(Decimal::from(9000)),
        price_per_month: None,
        location: location.to_string(),
        features: Vec::new(),
        specifications: VehicleSpecifications::default(),
        image: String::new(),
        owner_id,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        images: None,
        rating: Some(4.0),
        availability: true,
        owner: None,
    }
}

fn test_booking(
    renter_id: Uuid,
    owner_id: Uuid,
    vehicle_id: Uuid,
    status: BookingStatus,
    total_amount: i64,
) -> Booking {
    Booking {
        id: Uuid::new_v4(),
        vehicle_id,
        renter_id,
        start_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        end_date: NaiveDate::from_ymd_opt(2025, 3, 4).unwrap(),
        status,
        total_amount: Decimal::from(total_amount),
        created_at: Utc::now(),
        updated_at: Utc::now(),
        payment_status: None,
        owner_id: Some(owner_id),
        vehicle: None,
        renter: None,
    }
}

/// API en memoria con la misma superficie que el cliente HTTP
struct InMemoryApi {
    renter_id: Uuid,
    vehicles: RwLock<Vec<Vehicle>>,
    bookings: RwLock<Vec<Booking>>,
    fail_booking_updates: AtomicBool,
    calls: AtomicUsize,
}

impl InMemoryApi {
    fn new(renter_id: Uuid, vehicles: Vec<Vehicle>, bookings: Vec<Booking>) -> Arc<Self> {
        Arc::new(Self {
            renter_id,
            vehicles: RwLock::new(vehicles),
            bookings: RwLock::new(bookings),
            fail_booking_updates: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn fail_booking_updates(&self) {
        self.fail_booking_updates.store(true, Ordering::SeqCst);
    }

    async fn set_server_booking(&self, booking: Booking) {
        let mut bookings = self.bookings.write().await;
        match bookings.iter_mut().find(|b| b.id == booking.id) {
            Some(existing) => *existing = booking,
            None => bookings.push(booking),
        }
    }
}

#[async_trait::async_trait]
impl RentalApi for InMemoryApi {
    async fn fetch_vehicles(&self, _token: &str) -> AppResult<Vec<Vehicle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vehicles.read().await.clone())
    }

    async fn fetch_owner_vehicles(&self, _token: &str) -> AppResult<Vec<Vehicle>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.vehicles.read().await.clone())
    }

    async fn fetch_vehicle(&self, _token: &str, vehicle_id: Uuid) -> AppResult<Vehicle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.vehicles
            .read()
            .await
            .iter()
            .find(|vehicle| vehicle.id == vehicle_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("vehicle {}", vehicle_id)))
    }

    async fn create_vehicle(
        &self,
        _token: &str,
        request: &CreateVehicleRequest,
    ) -> AppResult<Vehicle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vehicle = test_vehicle(Uuid::new_v4(), &request.name, &request.brand, &request.location);
        vehicle.model = request.model.clone();
        vehicle.price_per_day = request.price_per_day;
        vehicle.price_per_week = request.price_per_week;
        vehicle.price_per_month = request.price_per_month;
        self.vehicles.write().await.push(vehicle.clone());
        Ok(vehicle)
    }

    async fn delete_vehicle(&self, _token: &str, vehicle_id: Uuid) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vehicles = self.vehicles.write().await;
        let before = vehicles.len();
        vehicles.retain(|vehicle| vehicle.id != vehicle_id);
        if vehicles.len() == before {
            return Err(AppError::NotFound(format!("vehicle {}", vehicle_id)));
        }
        Ok(())
    }

    async fn set_vehicle_availability(
        &self,
        _token: &str,
        vehicle_id: Uuid,
        availability: bool,
    ) -> AppResult<Vehicle> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vehicles = self.vehicles.write().await;
        match vehicles.iter_mut().find(|vehicle| vehicle.id == vehicle_id) {
            Some(vehicle) => {
                vehicle.availability = availability;
                vehicle.updated_at = Utc::now();
                Ok(vehicle.clone())
            }
            None => Err(AppError::NotFound(format!("vehicle {}", vehicle_id))),
        }
    }

    async fn fetch_bookings(
        &self,
        _token: &str,
        status: Option<BookingStatus>,
    ) -> AppResult<Vec<Booking>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let bookings = self.bookings.read().await;
        Ok(bookings
            .iter()
            .filter(|booking| status.map_or(true, |status| booking.status == status))
            .cloned()
            .collect())
    }

    async fn create_booking(
        &self,
        _token: &str,
        request: &CreateBookingRequest,
    ) -> AppResult<Booking> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let (start_date, end_date) = request.parsed_dates()?;
        let vehicles = self.vehicles.read().await;
        let vehicle = vehicles
            .iter()
            .find(|vehicle| vehicle.id == request.vehicle_id)
            .ok_or_else(|| AppError::NotFound(format!("vehicle {}", request.vehicle_id)))?;

        let booking = Booking {
            id: Uuid::new_v4(),
            vehicle_id: vehicle.id,
            renter_id: self.renter_id,
            start_date,
            end_date,
            status: BookingStatus::Pending,
            total_amount: total_price(start_date, end_date, &RateCard::from(vehicle)),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            payment_status: None,
            owner_id: Some(vehicle.owner_id),
            vehicle: None,
            renter: None,
        };
        drop(vehicles);

        self.bookings.write().await.push(booking.clone());
        Ok(booking)
    }

    async fn update_booking_status(
        &self,
        _token: &str,
        booking_id: Uuid,
        status: BookingStatus,
    ) -> AppResult<Booking> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_booking_updates.load(Ordering::SeqCst) {
            return Err(AppError::ExternalApi("injected failure".to_string()));
        }

        let mut bookings = self.bookings.write().await;
        match bookings.iter_mut().find(|booking| booking.id == booking_id) {
            Some(booking) => {
                booking.status = status;
                booking.updated_at = Utc::now();
                Ok(booking.clone())
            }
            None => Err(AppError::NotFound(format!("booking {}", booking_id))),
        }
    }
}

struct Harness {
    api: Arc<InMemoryApi>,
    session: SessionState,
    notifications: NotificationCenter,
    vehicles: VehicleService,
    bookings: BookingService,
}

fn harness(api: Arc<InMemoryApi>) -> Harness {
    let session = SessionState::new(EnvironmentConfig::default());
    let notifications = NotificationCenter::new();
    let vehicles = VehicleService::new(api.clone(), session.clone(), notifications.clone());
    let bookings = BookingService::new(api.clone(), session.clone(), notifications.clone());
    Harness {
        api,
        session,
        notifications,
        vehicles,
        bookings,
    }
}

async fn login(harness: &Harness, user: User) {
    harness
        .session
        .store_credential(AuthCredential::new("test-token".to_string(), user, 1))
        .await;
}

async fn has_error_notification(harness: &Harness) -> bool {
    harness
        .notifications
        .active()
        .await
        .iter()
        .any(|notification| notification.level == NotificationLevel::Error)
}

#[tokio::test]
async fn test_no_credential_fetches_resolve_empty_without_network_call() {
    init_tracing();
    let owner = test_user(UserRole::Owner);
    let vehicle = test_vehicle(owner.id, "Red Sedan", "Toyota", "Mumbai");
    let api = InMemoryApi::new(Uuid::new_v4(), vec![vehicle], Vec::new());
    let harness = harness(api);

    let vehicles = harness.vehicles.refresh(VehicleScope::All).await.unwrap();
    let bookings = harness.bookings.refresh().await.unwrap();

    assert!(vehicles.is_empty());
    assert!(bookings.is_empty());
    assert_eq!(harness.api.call_count(), 0);
}

#[tokio::test]
async fn test_owner_scope_requires_owner_role() {
    init_tracing();
    let renter = test_user(UserRole::Renter);
    let api = InMemoryApi::new(renter.id, Vec::new(), Vec::new());
    let harness = harness(api);
    login(&harness, renter).await;

    let result = harness.vehicles.refresh(VehicleScope::Owner).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(harness.api.call_count(), 0);
}

#[tokio::test]
async fn test_successful_status_update_mutates_only_target_booking() {
    init_tracing();
    let renter = test_user(UserRole::Renter);
    let owner_id = Uuid::new_v4();
    let vehicle_id = Uuid::new_v4();
    let target = test_booking(renter.id, owner_id, vehicle_id, BookingStatus::Pending, 300);
    let other = test_booking(renter.id, owner_id, vehicle_id, BookingStatus::Confirmed, 500);
    let api = InMemoryApi::new(renter.id, Vec::new(), vec![target.clone(), other.clone()]);
    let harness = harness(api);
    login(&harness, renter).await;

    harness.bookings.refresh().await.unwrap();
    let updated = harness.bookings.cancel_booking(target.id).await.unwrap();

    assert_eq!(updated.status, BookingStatus::Cancelled);
    assert_eq!(
        harness.bookings.booking(target.id).await.unwrap().status,
        BookingStatus::Cancelled
    );
    assert_eq!(
        harness.bookings.booking(other.id).await.unwrap().status,
        BookingStatus::Confirmed
    );
}

#[tokio::test]
async fn test_failed_status_update_leaves_local_state_unchanged() {
    init_tracing();
    let renter = test_user(UserRole::Renter);
    let owner_id = Uuid::new_v4();
    let booking = test_booking(renter.id, owner_id, Uuid::new_v4(), BookingStatus::Pending, 300);
    let api = InMemoryApi::new(renter.id, Vec::new(), vec![booking.clone()]);
    let harness = harness(api);
    login(&harness, renter).await;

    harness.bookings.refresh().await.unwrap();
    harness.api.fail_booking_updates();

    let result = harness.bookings.cancel_booking(booking.id).await;
    assert!(matches!(result, Err(AppError::ExternalApi(_))));
    assert_eq!(
        harness.bookings.booking(booking.id).await.unwrap().status,
        BookingStatus::Pending
    );
    assert!(has_error_notification(&harness).await);
}

#[tokio::test]
async fn test_owner_accepts_pending_and_dashboard_reflects_it() {
    init_tracing();
    let owner = test_user(UserRole::Owner);
    let renter_id = Uuid::new_v4();
    let vehicle = test_vehicle(owner.id, "Red Sedan", "Toyota", "Mumbai");
    let pending = test_booking(renter_id, owner.id, vehicle.id, BookingStatus::Pending, 500);
    let completed = test_booking(renter_id, owner.id, vehicle.id, BookingStatus::Completed, 200);
    let api = InMemoryApi::new(
        renter_id,
        vec![vehicle.clone()],
        vec![pending.clone(), completed],
    );
    let harness = harness(api);
    login(&harness, owner).await;

    harness.bookings.refresh().await.unwrap();
    let vehicles = harness.vehicles.refresh(VehicleScope::Owner).await.unwrap();

    harness.bookings.accept_booking(pending.id).await.unwrap();

    let stats = harness.bookings.dashboard_stats(&vehicles).await;
    assert_eq!(stats.total_earnings, Decimal::from(700));
    assert_eq!(stats.active_bookings, 1);
    assert_eq!(stats.pending_requests, 0);
    assert_eq!(stats.average_rating, 4.0);
}

#[tokio::test]
async fn test_renter_cannot_accept_a_booking() {
    init_tracing();
    let renter = test_user(UserRole::Renter);
    let booking = test_booking(
        renter.id,
        Uuid::new_v4(),
        Uuid::new_v4(),
        BookingStatus::Pending,
        300,
    );
    let api = InMemoryApi::new(renter.id, Vec::new(), vec![booking.clone()]);
    let harness = harness(api);
    login(&harness, renter).await;

    harness.bookings.refresh().await.unwrap();
    let calls_before = harness.api.call_count();

    let result = harness.bookings.accept_booking(booking.id).await;
    assert!(matches!(result, Err(AppError::Forbidden(_))));
    assert_eq!(harness.api.call_count(), calls_before);
}

#[tokio::test]
async fn test_invalid_transition_is_rejected_before_network() {
    init_tracing();
    let renter = test_user(UserRole::Renter);
    let booking = test_booking(
        renter.id,
        Uuid::new_v4(),
        Uuid::new_v4(),
        BookingStatus::Completed,
        300,
    );
    let api = InMemoryApi::new(renter.id, Vec::new(), vec![booking.clone()]);
    let harness = harness(api);
    login(&harness, renter).await;

    harness.bookings.refresh().await.unwrap();
    let calls_before = harness.api.call_count();

    let result = harness.bookings.cancel_booking(booking.id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(harness.api.call_count(), calls_before);
    assert_eq!(
        harness.bookings.booking(booking.id).await.unwrap().status,
        BookingStatus::Completed
    );
}

#[tokio::test]
async fn test_create_booking_rejects_inverted_range_before_network() {
    init_tracing();
    let renter = test_user(UserRole::Renter);
    let vehicle = test_vehicle(Uuid::new_v4(), "Red Sedan", "Toyota", "Mumbai");
    let api = InMemoryApi::new(renter.id, vec![vehicle.clone()], Vec::new());
    let harness = harness(api);
    login(&harness, renter).await;

    let request = CreateBookingRequest::new(
        vehicle.id,
        NaiveDate::from_ymd_opt(2025, 3, 10).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
    );
    let result = harness.bookings.create_booking(&request).await;

    assert!(matches!(result, Err(AppError::BadRequest(_))));
    assert_eq!(harness.api.call_count(), 0);
    assert!(has_error_notification(&harness).await);
}

#[tokio::test]
async fn test_create_booking_bills_weekly_tier() {
    init_tracing();
    let renter = test_user(UserRole::Renter);
    let vehicle = test_vehicle(Uuid::new_v4(), "Red Sedan", "Toyota", "Mumbai");
    let api = InMemoryApi::new(renter.id, vec![vehicle.clone()], Vec::new());
    let harness = harness(api);
    login(&harness, renter).await;

    // 10 días: una semana a 9000 más 3 días a 1500
    let request = CreateBookingRequest::new(
        vehicle.id,
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 3, 11).unwrap(),
    );
    let booking = harness.bookings.create_booking(&request).await.unwrap();

    assert_eq!(booking.total_amount, Decimal::from(9000 + 3 * 1500));
    assert_eq!(booking.status, BookingStatus::Pending);
    assert!(harness.bookings.booking(booking.id).await.is_some());
}

#[tokio::test]
async fn test_stale_refresh_does_not_clobber_acknowledged_update() {
    init_tracing();
    let renter = test_user(UserRole::Renter);
    let booking = test_booking(
        renter.id,
        Uuid::new_v4(),
        Uuid::new_v4(),
        BookingStatus::Pending,
        300,
    );
    let api = InMemoryApi::new(renter.id, Vec::new(), vec![booking.clone()]);
    let harness = harness(api);
    login(&harness, renter).await;

    harness.bookings.refresh().await.unwrap();
    harness.bookings.cancel_booking(booking.id).await.unwrap();

    // el servidor devuelve una copia vieja, como si el refresh se hubiera
    // emitido antes del ack
    let mut stale = booking.clone();
    stale.updated_at = Utc::now() - Duration::minutes(5);
    harness.api.set_server_booking(stale).await;

    harness.bookings.refresh().await.unwrap();
    assert_eq!(
        harness.bookings.booking(booking.id).await.unwrap().status,
        BookingStatus::Cancelled
    );
}

#[tokio::test]
async fn test_status_filter_view_preserves_order() {
    init_tracing();
    let renter = test_user(UserRole::Renter);
    let owner_id = Uuid::new_v4();
    let vehicle_id = Uuid::new_v4();
    let first = test_booking(renter.id, owner_id, vehicle_id, BookingStatus::Pending, 100);
    let second = test_booking(renter.id, owner_id, vehicle_id, BookingStatus::Confirmed, 200);
    let third = test_booking(renter.id, owner_id, vehicle_id, BookingStatus::Pending, 300);
    let api = InMemoryApi::new(
        renter.id,
        Vec::new(),
        vec![first.clone(), second, third.clone()],
    );
    let harness = harness(api);
    login(&harness, renter).await;

    harness.bookings.refresh().await.unwrap();
    let pending = harness
        .bookings
        .bookings(StatusFilter::Status(BookingStatus::Pending))
        .await;

    let ids: Vec<Uuid> = pending.iter().map(|booking| booking.id).collect();
    assert_eq!(ids, vec![first.id, third.id]);

    let counts = harness.bookings.counts().await;
    assert_eq!(counts.pending, 2);
    assert_eq!(counts.confirmed, 1);
}

#[tokio::test]
async fn test_toggle_availability_round_trip() {
    init_tracing();
    let owner = test_user(UserRole::Owner);
    let vehicle = test_vehicle(owner.id, "Red Sedan", "Toyota", "Mumbai");
    let api = InMemoryApi::new(Uuid::new_v4(), vec![vehicle.clone()], Vec::new());
    let harness = harness(api);
    login(&harness, owner).await;

    harness.vehicles.refresh(VehicleScope::Owner).await.unwrap();

    let now_available = harness.vehicles.toggle_availability(vehicle.id).await.unwrap();
    assert!(!now_available);
    assert!(!harness.vehicles.vehicle(vehicle.id).await.unwrap().availability);

    let now_available = harness.vehicles.toggle_availability(vehicle.id).await.unwrap();
    assert!(now_available);
}

#[tokio::test]
async fn test_delete_vehicle_removes_local_copy() {
    init_tracing();
    let owner = test_user(UserRole::Owner);
    let vehicle = test_vehicle(owner.id, "Red Sedan", "Toyota", "Mumbai");
    let api = InMemoryApi::new(Uuid::new_v4(), vec![vehicle.clone()], Vec::new());
    let harness = harness(api);
    login(&harness, owner).await;

    harness.vehicles.refresh(VehicleScope::Owner).await.unwrap();
    harness.vehicles.delete_vehicle(vehicle.id).await.unwrap();

    assert!(harness.vehicles.vehicle(vehicle.id).await.is_none());
    assert!(harness.vehicles.all_vehicles().await.is_empty());
}

#[tokio::test]
async fn test_search_view_over_local_catalog() {
    init_tracing();
    let renter = test_user(UserRole::Renter);
    let owner_id = Uuid::new_v4();
    let sedan = test_vehicle(owner_id, "Red Sedan", "Toyota", "Mumbai");
    let hatch = test_vehicle(owner_id, "Blue Hatch", "Honda", "Pune");
    let api = InMemoryApi::new(renter.id, vec![sedan.clone(), hatch], Vec::new());
    let harness = harness(api);
    login(&harness, renter).await;

    harness.vehicles.refresh(VehicleScope::All).await.unwrap();

    let results = harness.vehicles.search("red toyota").await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, sedan.id);

    assert!(harness.vehicles.search("blue toyota").await.is_empty());
    assert_eq!(harness.vehicles.search("  ").await.len(), 2);
}

#[tokio::test]
async fn test_hydrate_fills_missing_embedded_vehicles() {
    init_tracing();
    let renter = test_user(UserRole::Renter);
    let vehicle = test_vehicle(Uuid::new_v4(), "Red Sedan", "Toyota", "Mumbai");
    let booking = test_booking(
        renter.id,
        vehicle.owner_id,
        vehicle.id,
        BookingStatus::Pending,
        300,
    );
    let api = InMemoryApi::new(renter.id, vec![vehicle.clone()], vec![booking.clone()]);
    let harness = harness(api);
    login(&harness, renter).await;

    harness.bookings.refresh().await.unwrap();
    assert!(harness.bookings.booking(booking.id).await.unwrap().vehicle.is_none());

    harness.bookings.hydrate_vehicles().await.unwrap();
    let hydrated = harness.bookings.booking(booking.id).await.unwrap();
    assert_eq!(hydrated.vehicle.map(|v| v.id), Some(vehicle.id));
}
