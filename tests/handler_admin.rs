mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum_test::TestServer;
use common::{BOAT_PK, CAR_PK, PLANE_PK};
use polymorphic_admin::admin::ParentAdminConfig;
use polymorphic_admin::routes::{admin_router, app_router};
use tower::ServiceExt;

// ─── INDEX ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_index_lists_parent_and_visible_children() {
    let server = common::make_server();

    let response = server.get("/admin").await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Vehicles"));
    assert!(html.contains("Boats"));
    assert!(!html.contains("Cars"));
}

#[tokio::test]
async fn test_trailing_slash_is_trimmed() {
    let app = app_router(common::create_test_state());
    let request = Request::builder()
        .uri("/admin/shop/vehicle/")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

// ─── CHANGE LIST ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_changelist_shows_all_types_with_base_fields() {
    let server = common::make_server();

    let response = server.get("/admin/shop/vehicle").await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Beetle"));
    assert!(html.contains("Ferry"));
    assert!(html.contains("Glider"));
    assert!(html.contains("By type"));
    assert!(!html.contains("Hull length"));
}

#[tokio::test]
async fn test_changelist_polymorphic_shows_subtype_fields() {
    let defaults = ParentAdminConfig {
        polymorphic_list: true,
        ..Default::default()
    };
    let server =
        TestServer::new(admin_router(common::create_test_state_with(&defaults))).unwrap();

    let response = server.get("/admin/shop/vehicle").await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Details"));
    assert!(html.contains("Hull length: 30.5"));
}

#[tokio::test]
async fn test_changelist_type_filter() {
    let server = common::make_server();

    let response = server.get("/admin/shop/vehicle?ctype=shop.boat").await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Ferry"));
    assert!(!html.contains("Beetle"));
}

#[tokio::test]
async fn test_changelist_filter_rejects_unregistered_type() {
    let server = common::make_server();

    let response = server.get("/admin/shop/vehicle?ctype=shop.plane").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_child_changelist_redirects_to_parent() {
    let server = common::make_server();

    let response = server.get("/admin/shop/car").await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/admin/shop/vehicle");
}

#[tokio::test]
async fn test_unknown_model_not_found() {
    let server = common::make_server();

    let response = server.get("/admin/shop/plane").await;

    response.assert_status_not_found();
}

// ─── ADD ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_add_shows_type_selection() {
    let server = common::make_server();

    let response = server.get("/admin/shop/vehicle/add").await;

    response.assert_status_ok();
    let html = response.text();
    let car = html.find("shop.car").unwrap();
    let boat = html.find("shop.boat").unwrap();
    assert!(car < boat);
    assert!(!html.contains("shop.plane"));
}

#[tokio::test]
async fn test_add_with_choice_redirects_to_child() {
    let server = common::make_server();

    let response = server
        .post("/admin/shop/vehicle/add")
        .form(&[("ct", "shop.boat")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/admin/shop/boat/add");
}

#[tokio::test]
async fn test_add_with_unknown_choice_is_bad_request() {
    let server = common::make_server();

    let response = server.get("/admin/shop/vehicle/add?ct=shop.plane").await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_child_add_creates_record() {
    let server = common::make_server();

    let response = server
        .post("/admin/shop/car/add")
        .form(&[("name", "Mini"), ("doors", "3")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/admin/shop/vehicle");

    let list = server.get("/admin/shop/vehicle?ctype=shop.car").await;
    assert!(list.text().contains("Mini"));
}

// ─── CHANGE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_change_car_shows_car_fields() {
    let server = common::make_server();

    let response = server
        .get(&format!("/admin/shop/vehicle/{CAR_PK}/change"))
        .await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains(r#"name="name""#));
    assert!(html.contains(r#"name="doors""#));
    assert!(!html.contains(r#"name="hull_length""#));
    assert!(html.contains("Car fields"));
    assert!(html.contains("Vehicles"));
    assert!(!html.contains(r#"class="tabular"#));
}

#[tokio::test]
async fn test_change_boat_uses_its_template() {
    let server = common::make_server();

    let response = server
        .get(&format!("/admin/shop/vehicle/{BOAT_PK}/change"))
        .await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains(r#"name="hull_length""#));
    assert!(!html.contains(r#"name="doors""#));
    assert!(html.contains(r#"class="tabular"#));
}

#[tokio::test]
async fn test_change_post_updates_and_redirects() {
    let server = common::make_server();

    let response = server
        .post(&format!("/admin/shop/vehicle/{CAR_PK}/change"))
        .form(&[("name", "Golf"), ("color", "blue"), ("doors", "4")])
        .await;

    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(response.header("location"), "/admin/shop/vehicle");

    let list = server.get("/admin/shop/vehicle").await;
    let html = list.text();
    assert!(html.contains("Golf"));
    assert!(!html.contains("Beetle"));
}

#[tokio::test]
async fn test_change_post_invalid_redisplays_errors() {
    let server = common::make_server();

    let response = server
        .post(&format!("/admin/shop/vehicle/{CAR_PK}/change"))
        .form(&[("name", ""), ("doors", "many")])
        .await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Please correct the errors below."));
    assert!(html.contains("This field is required."));
    assert!(html.contains("Enter a whole number."));
}

#[tokio::test]
async fn test_child_url_rejects_record_of_other_type() {
    let server = common::make_server();

    let response = server
        .get(&format!("/admin/shop/car/{BOAT_PK}/change"))
        .await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_change_unknown_record_not_found() {
    let server = common::make_server();

    let response = server.get("/admin/shop/vehicle/99/change").await;

    response.assert_status_not_found();
}

#[tokio::test]
async fn test_non_integer_pk_does_not_route() {
    let server = common::make_server();

    let response = server.get("/admin/shop/vehicle/abc/change").await;

    response.assert_status_not_found();
}

// ─── DELETE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_delete_confirmation_then_delete() {
    let server = common::make_server();
    let url = format!("/admin/shop/vehicle/{BOAT_PK}/delete");

    let confirm = server.get(&url).await;
    confirm.assert_status_ok();
    assert!(confirm.text().contains("Are you sure?"));
    assert!(confirm.text().contains("Ferry"));

    let response = server.post(&url).form(&[("post", "yes")]).await;
    response.assert_status(StatusCode::SEE_OTHER);

    let gone = server
        .get(&format!("/admin/shop/vehicle/{BOAT_PK}/change"))
        .await;
    gone.assert_status_not_found();
}

#[tokio::test]
async fn test_unregistered_type_is_visible_error() {
    let server = common::make_server();

    let response = server
        .post(&format!("/admin/shop/vehicle/{PLANE_PK}/delete"))
        .form(&[("post", "yes")])
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.text().contains("shop.plane"));

    let list = server.get("/admin/shop/vehicle").await;
    assert!(list.text().contains("Glider"));
}
