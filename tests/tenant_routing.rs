//! Host-based tenant resolution through the full router with the database
//! lookup.

mod test_utils;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::json;
use test_utils::*;
use tower::ServiceExt;
use wedsite::auth::Session;
use wedsite::models::{tenant::DomainStatus, user::Role};

fn get(host: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, host)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn subdomain_host_serves_tenant_site() {
    let db = setup_test_db().await.unwrap();
    create_site(&db, "ana-and-ben").await.unwrap();
    let app = test_app(db, test_config());

    let (status, body) = send(&app, get(&format!("ana-and-ben.{ROOT_DOMAIN}"), "/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subdomain"], "ana-and-ben");
    assert_eq!(body["wedding"]["partner_one"], "Ana");

    // Port and case do not matter
    let (status, body) = send(
        &app,
        get(&format!("Ana-And-Ben.{}:8080", ROOT_DOMAIN.to_uppercase()), "/"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subdomain"], "ana-and-ben");
}

#[tokio::test]
async fn unknown_subdomain_is_site_not_found() {
    let db = setup_test_db().await.unwrap();
    let app = test_app(db, test_config());

    let (status, body) = send(&app, get(&format!("nobody.{ROOT_DOMAIN}"), "/")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "SITE_NOT_FOUND");
}

#[tokio::test]
async fn platform_hosts_serve_platform_routes() {
    let db = setup_test_db().await.unwrap();
    create_site(&db, "ana-and-ben").await.unwrap();
    let app = test_app(db, test_config());

    for host in [ROOT_DOMAIN.to_string(), format!("www.{ROOT_DOMAIN}")] {
        let (status, body) = send(&app, get(&host, "/")).await;
        assert_eq!(status, StatusCode::OK, "host={host}");
        assert_eq!(body["service"], "wedsite");
    }
}

#[tokio::test]
async fn api_paths_are_never_rewritten() {
    let db = setup_test_db().await.unwrap();
    create_site(&db, "ana-and-ben").await.unwrap();
    let app = test_app(db, test_config());

    let (status, body) = send(&app, get(&format!("ana-and-ben.{ROOT_DOMAIN}"), "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");

    let response = app
        .clone()
        .oneshot(get(&format!("ana-and-ben.{ROOT_DOMAIN}"), "/openapi.json"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn verified_custom_domain_serves_tenant_site() {
    let db = setup_test_db().await.unwrap();
    let mut site = create_site(&db, "ana-and-ben").await.unwrap();
    attach_domain(&db, &mut site, "anaandben.com", DomainStatus::Verified)
        .await
        .unwrap();
    let app = test_app(db, test_config());

    let (status, body) = send(&app, get("anaandben.com", "/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subdomain"], "ana-and-ben");
    assert_eq!(body["custom_domain"], "anaandben.com");
}

#[tokio::test]
async fn unverified_custom_domains_fail_closed() {
    let db = setup_test_db().await.unwrap();
    let mut site = create_site(&db, "ana-and-ben").await.unwrap();
    attach_domain(&db, &mut site, "anaandben.com", DomainStatus::Pending)
        .await
        .unwrap();
    let app = test_app(db, test_config());

    for host in ["anaandben.com", "unknown-couple.org"] {
        let (status, body) = send(&app, get(host, "/")).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "host={host}");
        assert_eq!(body["code"], "SITE_NOT_FOUND");
    }
}

#[tokio::test]
async fn gated_pages_redirect_by_role() {
    let db = setup_test_db().await.unwrap();
    let site = create_site(&db, "ana-and-ben").await.unwrap();
    let config = test_config();
    let app = test_app(db, config.clone());

    let response = app
        .clone()
        .oneshot(get(ROOT_DOMAIN, "/dashboard"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.headers()[header::LOCATION],
        "/login?next=%2Fdashboard"
    );

    let mut couple_to_admin = get(ROOT_DOMAIN, "/admin");
    couple_to_admin.headers_mut().insert(
        header::AUTHORIZATION,
        bearer(&config, &site.session()).parse().unwrap(),
    );
    let response = app.clone().oneshot(couple_to_admin).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");

    let admin = Session {
        user_id: uuid::Uuid::new_v4(),
        role: Role::Admin,
        tenant_id: None,
    };
    let mut admin_to_dashboard = get(ROOT_DOMAIN, "/dashboard");
    admin_to_dashboard.headers_mut().insert(
        header::AUTHORIZATION,
        bearer(&config, &admin).parse().unwrap(),
    );
    let response = app.clone().oneshot(admin_to_dashboard).await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/admin");

    let mut couple_home = get(ROOT_DOMAIN, "/dashboard");
    couple_home.headers_mut().insert(
        header::AUTHORIZATION,
        bearer(&config, &site.session()).parse().unwrap(),
    );
    let (status, body) = send(&app, couple_home).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tenant"]["subdomain"], "ana-and-ben");
    assert_eq!(body["rsvp"]["total_invited"], 0);
}

#[tokio::test]
async fn dashboard_data_is_scoped_to_the_session_tenant() {
    let db = setup_test_db().await.unwrap();
    let ours = create_site(&db, "ana-and-ben").await.unwrap();
    let theirs = create_site(&db, "cara-and-dan").await.unwrap();
    let foreign_guest = create_guest(&db, &theirs, "Eva Sousa").await.unwrap();
    create_guest(&db, &ours, "Carla Dias").await.unwrap();
    let config = test_config();
    let app = test_app(db, config.clone());
    let auth = bearer(&config, &ours.session());

    let mut list = json_request("GET", "/api/dashboard/guests", &json!(null));
    list.headers_mut()
        .insert(header::AUTHORIZATION, auth.parse().unwrap());
    let (status, body) = send(&app, list).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Carla Dias"]);

    let mut delete = json_request(
        "DELETE",
        &format!("/api/dashboard/guests/{}", foreign_guest.id),
        &json!(null),
    );
    delete
        .headers_mut()
        .insert(header::AUTHORIZATION, auth.parse().unwrap());
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn signup_creates_a_reachable_site() {
    let db = setup_test_db().await.unwrap();
    let app = test_app(db, test_config());

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            &json!({
                "email": "ana@example.com",
                "password": "correct horse battery",
                "subdomain": "ana-and-ben",
                "partner_one": "Ana",
                "partner_two": "Ben"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "couple");

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/signup",
            &json!({
                "email": "other@example.com",
                "password": "correct horse battery",
                "subdomain": "ana-and-ben",
                "partner_one": "Ana",
                "partner_two": "Ben"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, get(&format!("ana-and-ben.{ROOT_DOMAIN}"), "/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["wedding"]["partner_two"], "Ben");

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": "ana@example.com", "password": "wrong password!" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/auth/login",
            &json!({ "email": "ANA@example.com", "password": "correct horse battery" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some_and(|t| !t.is_empty()));
}
