//! End-to-end workflow tests over a mock transport
//!
//! These exercise the service facade the way the CLI tools do: login via
//! OTP, stands + search with recent-search recording, bus inventory CRUD
//! with schedule invalidation, favorites, and feedback.

use std::sync::Arc;

use libgobus::api::{BusApi, MockApi};
use libgobus::service::{GobusService, LoginOutcome};
use libgobus::types::{
    Bus, BusSchedule, RecentSearch, Role, ScheduleStop, SearchSchedule, Stand, StopStand,
    UserProfile, VerifiedUser,
};
use libgobus::{Config, Database, GobusError, SessionStore};
use tempfile::TempDir;

async fn test_service() -> (TempDir, Arc<MockApi>, GobusService) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("state.db");

    let mut config = Config::default_config();
    config.database.path = db_path.to_string_lossy().to_string();

    let db = Arc::new(Database::new(&config.database.path).await.unwrap());
    let session = Arc::new(SessionStore::new(Arc::clone(&db)));
    session.hydrate().await.unwrap();

    let api = Arc::new(MockApi::new());
    let api_dyn: Arc<dyn BusApi> = api.clone();

    let service = GobusService::from_parts(Arc::new(config), db, api_dyn, session)
        .await
        .unwrap();
    (temp_dir, api, service)
}

fn stand(id: &str, name: &str) -> Stand {
    Stand {
        id: id.to_string(),
        name: name.to_string(),
    }
}

fn bus(id: &str, name: &str) -> Bus {
    Bus {
        id: Some(id.to_string()),
        name: name.to_string(),
        registration_number: format!("KA-01-{}", id),
        bus_number: id.to_string(),
        bus_type: "deluxe".to_string(),
        seat_capacity: 44,
        is_ac: true,
        is_express: false,
        owner: None,
    }
}

fn search_hit(bus_id: &str, last_price: f64) -> SearchSchedule {
    SearchSchedule {
        id: format!("hit-{}", bus_id),
        bus: bus(bus_id, "Morning Express"),
        stops: vec![
            ScheduleStop {
                id: "st1".to_string(),
                arrival_time: "09:00".to_string(),
                stand: StopStand {
                    id: "s1".to_string(),
                    name: "Central".to_string(),
                    distance: 0.0,
                    price: 0.0,
                },
            },
            ScheduleStop {
                id: "st2".to_string(),
                arrival_time: "11:15".to_string(),
                stand: StopStand {
                    id: "s2".to_string(),
                    name: "Airport".to_string(),
                    distance: 38.5,
                    price: last_price,
                },
            },
        ],
        source_time: Some("09:00".to_string()),
        destination_time: Some("11:15".to_string()),
        duration: Some("2h 15m".to_string()),
    }
}

#[tokio::test]
async fn test_existing_user_login_flow() {
    let (_tmp, api, service) = test_service().await;

    service.request_otp("asha@example.com").await.unwrap();
    assert_eq!(api.lock().otp_emails, vec!["asha@example.com"]);

    let outcome = service.verify_otp(123456).await.unwrap();
    match outcome {
        LoginOutcome::Existing(user) => assert_eq!(user.name, "Test User"),
        LoginOutcome::NeedsProfile => panic!("expected an existing account"),
    }

    assert!(service.session().is_logged_in());

    service.logout().await.unwrap();
    assert!(!service.session().is_logged_in());
}

#[tokio::test]
async fn test_new_user_needs_profile_then_registers() {
    let (_tmp, api, service) = test_service().await;

    // First login: the backend knows nothing about this account yet
    api.lock().verified_user = VerifiedUser {
        email: Some("new@example.com".to_string()),
        token: Some("fresh-token".to_string()),
        ..Default::default()
    };

    let outcome = service.verify_otp(654321).await.unwrap();
    assert!(matches!(outcome, LoginOutcome::NeedsProfile));
    assert!(!service.session().is_logged_in());

    let profile = UserProfile {
        name: "Ravi".to_string(),
        email: "new@example.com".to_string(),
        phone: "9999999999".to_string(),
        role: Role::Driver,
        address: None,
    };
    let user = service.complete_profile(&profile).await.unwrap();
    assert_eq!(user.name, "Ravi");
    assert_eq!(user.role.as_deref(), Some("driver"));
    assert!(service.session().is_logged_in());
    assert_eq!(api.calls("register_user"), 1);
}

#[tokio::test]
async fn test_invalid_email_never_reaches_network() {
    let (_tmp, api, service) = test_service().await;

    let result = service.request_otp("   ").await;
    assert!(matches!(result, Err(GobusError::InvalidInput(_))));

    let result = service.request_otp("not-an-email").await;
    assert!(matches!(result, Err(GobusError::InvalidInput(_))));

    assert_eq!(api.calls("send_otp"), 0);
}

#[tokio::test]
async fn test_search_flow_records_recent_and_reads_fare() {
    let (_tmp, api, service) = test_service().await;

    api.lock().stands = vec![stand("s1", "Central"), stand("s2", "Airport")];
    api.lock().search_results = vec![search_hit("b1", 120.0)];

    service.search().fetch_stands().await.unwrap();
    let from = service.search().stand_by_name("central").unwrap();
    let to = service.search().stand_by_name("Airport").unwrap();

    let hits = service.search().search(&from.id, &to.id).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].fare(), Some(120.0));

    service
        .search()
        .add_recent(RecentSearch::new(from.name, to.name, from.id, to.id))
        .await
        .unwrap();

    let recent = service.search().recent();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].from, "Central");
    assert_eq!(recent[0].to, "Airport");
}

#[tokio::test]
async fn test_bus_crud_with_schedule_invalidation() {
    let (_tmp, api, service) = test_service().await;

    api.lock().buses = vec![bus("b1", "Morning Express")];
    api.lock().schedules_by_bus.insert(
        "b1".to_string(),
        BusSchedule {
            id: "sch-1".to_string(),
            departure_time: Some("09:00".to_string()),
            arrival_time: Some("11:15".to_string()),
            fare: Some(120.0),
            stops: vec![],
        },
    );

    service.buses().fetch().await.unwrap();
    service.schedules().fetch("b1").await.unwrap();
    assert!(service.schedules().entry("b1").unwrap().is_some());

    service.buses().delete("b1").await.unwrap();

    assert_eq!(service.buses().my_buses(), Some(vec![]));
    assert!(service.schedules().entry("b1").is_none());
}

#[tokio::test]
async fn test_favorites_round_trip() {
    let (_tmp, api, service) = test_service().await;

    api.lock().buses = vec![bus("b1", "Morning Express"), bus("b2", "Night Rider")];

    service.add_favorite("b2").await.unwrap();
    let favorites = service.favorites().await.unwrap();
    assert_eq!(favorites.len(), 1);
    assert_eq!(favorites[0].id.as_deref(), Some("b2"));

    service.remove_favorite("b2").await.unwrap();
    assert!(service.favorites().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_feedback_validation_and_delivery() {
    let (_tmp, api, service) = test_service().await;

    let result = service.send_feedback("   ").await;
    assert!(matches!(result, Err(GobusError::InvalidInput(_))));
    assert_eq!(api.calls("send_feedback"), 0);

    service.send_feedback("The 9am bus was missing").await.unwrap();
    assert_eq!(api.lock().feedback, vec!["The 9am bus was missing"]);
}

#[tokio::test]
async fn test_session_and_recents_survive_restart() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("state.db");

    let mut config = Config::default_config();
    config.database.path = db_path.to_string_lossy().to_string();
    let config = Arc::new(config);

    // First "process"
    {
        let db = Arc::new(Database::new(&config.database.path).await.unwrap());
        let session = Arc::new(SessionStore::new(Arc::clone(&db)));
        session.hydrate().await.unwrap();
        let api: Arc<dyn BusApi> = Arc::new(MockApi::new());
        let service = GobusService::from_parts(Arc::clone(&config), db, api, session)
            .await
            .unwrap();

        service.verify_otp(123456).await.unwrap();
        service
            .search()
            .add_recent(RecentSearch::new(
                "Central".to_string(),
                "Airport".to_string(),
                "s1".to_string(),
                "s2".to_string(),
            ))
            .await
            .unwrap();
    }

    // Second "process" over the same database
    {
        let db = Arc::new(Database::new(&config.database.path).await.unwrap());
        let session = Arc::new(SessionStore::new(Arc::clone(&db)));
        session.hydrate().await.unwrap();
        let api: Arc<dyn BusApi> = Arc::new(MockApi::new());
        let service = GobusService::from_parts(Arc::clone(&config), db, api, session)
            .await
            .unwrap();

        assert!(service.session().is_logged_in());
        let recent = service.search().recent();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].from_id, "s1");
    }
}
