#![allow(dead_code)]

use axum_test::TestServer;
use polymorphic_admin::admin::{ParentAdminConfig, SiteManifest};
use polymorphic_admin::infrastructure::persistence::InMemoryRecordRepository;
use polymorphic_admin::routes::admin_router;
use polymorphic_admin::state::AppState;
use std::sync::Arc;

/// Seeded primary keys of the built-in manifest.
pub const CAR_PK: &str = "1";
pub const BOAT_PK: &str = "2";
pub const PLANE_PK: &str = "3";

/// The vehicles site over an in-memory store holding its seed records:
/// a Car, a Boat and a Plane whose type has no admin.
pub fn create_test_state() -> AppState {
    create_test_state_with(&ParentAdminConfig::default())
}

pub fn create_test_state_with(defaults: &ParentAdminConfig) -> AppState {
    let loaded = SiteManifest::builtin()
        .unwrap()
        .build(defaults)
        .unwrap();
    let records = Arc::new(InMemoryRecordRepository::seeded(loaded.seed));
    AppState::new(loaded.site, records)
}

pub fn make_server() -> TestServer {
    TestServer::new(admin_router(create_test_state())).unwrap()
}
