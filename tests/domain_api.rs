//! Custom domain management through the dashboard API against a mocked
//! domain provider.

mod test_utils;

use axum::http::{StatusCode, header};
use serde_json::{Value, json};
use test_utils::*;
use wedsite::config::AppConfig;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{bearer_token, body_json, method, path},
};

const PROJECT: &str = "prj_wedsite";
const TOKEN: &str = "provider-token";

fn provider_config(server: &MockServer) -> AppConfig {
    AppConfig {
        domain_provider_api_base: server.uri(),
        domain_provider_token: Some(TOKEN.to_string()),
        domain_provider_project_id: Some(PROJECT.to_string()),
        ..test_config()
    }
}

fn provider_domain(name: &str, apex: &str, verified: bool) -> Value {
    let verification = if verified {
        json!([])
    } else {
        json!([{
            "type": "TXT",
            "domain": format!("_vercel.{apex}"),
            "value": "vc-domain-verify=abc123",
            "reason": "pending_domain_verification"
        }])
    };
    json!({
        "name": name,
        "apexName": apex,
        "verified": verified,
        "verification": verification
    })
}

async fn call(
    app: &axum::Router,
    config: &AppConfig,
    site: &TestSite,
    method: &str,
    uri: &str,
    body: Value,
) -> (StatusCode, Value) {
    let mut request = json_request(method, uri, &body);
    request.headers_mut().insert(
        header::AUTHORIZATION,
        bearer(config, &site.session()).parse().unwrap(),
    );
    send(app, request).await
}

#[tokio::test]
async fn attach_verify_and_serve_custom_domain() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v10/projects/{PROJECT}/domains")))
        .and(bearer_token(TOKEN))
        .and(body_json(json!({ "name": "anaandben.com" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_domain("anaandben.com", "anaandben.com", false)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/v9/projects/{PROJECT}/domains/anaandben.com/verify"
        )))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_domain("anaandben.com", "anaandben.com", true)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let db = setup_test_db().await.unwrap();
    let site = create_site(&db, "ana-and-ben").await.unwrap();
    let config = provider_config(&server);
    let app = test_app(db, config.clone());

    let (status, body) = call(
        &app,
        &config,
        &site,
        "POST",
        "/api/dashboard/domain",
        json!({ "domain": " AnaAndBen.com. " }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["domain"], "anaandben.com");
    assert_eq!(body["status"], "pending");
    assert_eq!(body["dns_records"][0]["type"], "A");
    assert_eq!(body["dns_records"][0]["name"], "@");
    assert_eq!(body["dns_records"][0]["value"], config.domain_apex_a_record);
    assert_eq!(body["dns_records"][1]["type"], "TXT");

    // Pending domains do not route yet
    let (status, _) = send(
        &app,
        axum::http::Request::builder()
            .uri("/")
            .header(header::HOST, "anaandben.com")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(
        &app,
        &config,
        &site,
        "POST",
        "/api/dashboard/domain/verify",
        json!(null),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "verified");

    let (status, body) = send(
        &app,
        axum::http::Request::builder()
            .uri("/")
            .header(header::HOST, "anaandben.com")
            .body(axum::body::Body::empty())
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subdomain"], "ana-and-ben");
}

#[tokio::test]
async fn subdomain_records_use_cname() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v10/projects/{PROJECT}/domains")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_domain("www.anaandben.com", "anaandben.com", true)),
        )
        .mount(&server)
        .await;

    let db = setup_test_db().await.unwrap();
    let site = create_site(&db, "ana-and-ben").await.unwrap();
    let config = provider_config(&server);
    let app = test_app(db, config.clone());

    let (status, body) = call(
        &app,
        &config,
        &site,
        "POST",
        "/api/dashboard/domain",
        json!({ "domain": "www.anaandben.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "verified");
    assert_eq!(
        body["dns_records"],
        json!([{ "type": "CNAME", "name": "www", "value": config.domain_cname_target }])
    );
}

#[tokio::test]
async fn failed_verification_and_removal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v10/projects/{PROJECT}/domains")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_domain("anaandben.com", "anaandben.com", false)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(format!(
            "/v9/projects/{PROJECT}/domains/anaandben.com/verify"
        )))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(provider_domain("anaandben.com", "anaandben.com", false)),
        )
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path(format!("/v9/projects/{PROJECT}/domains/anaandben.com")))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let db = setup_test_db().await.unwrap();
    let site = create_site(&db, "ana-and-ben").await.unwrap();
    let config = provider_config(&server);
    let app = test_app(db, config.clone());

    call(
        &app,
        &config,
        &site,
        "POST",
        "/api/dashboard/domain",
        json!({ "domain": "anaandben.com" }),
    )
    .await;
    let (status, body) = call(
        &app,
        &config,
        &site,
        "POST",
        "/api/dashboard/domain/verify",
        json!(null),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "failed");

    // The provider no longer knowing the domain still counts as removed
    let (status, body) = call(
        &app,
        &config,
        &site,
        "DELETE",
        "/api/dashboard/domain",
        json!(null),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["domain"], Value::Null);
    assert_eq!(body["status"], "unverified");
}

#[tokio::test]
async fn provider_errors_and_bad_input() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/v10/projects/{PROJECT}/domains")))
        .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
        .mount(&server)
        .await;

    let db = setup_test_db().await.unwrap();
    let site = create_site(&db, "ana-and-ben").await.unwrap();
    let config = provider_config(&server);
    let app = test_app(db, config.clone());

    let (status, body) = call(
        &app,
        &config,
        &site,
        "POST",
        "/api/dashboard/domain",
        json!({ "domain": "anaandben.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "PROVIDER_ERROR");

    for bad in ["not a domain", "ana-and-ben.wedsite.test"] {
        let (status, body) = call(
            &app,
            &config,
            &site,
            "POST",
            "/api/dashboard/domain",
            json!({ "domain": bad }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "domain={bad}");
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }
}

#[tokio::test]
async fn unconfigured_provider_is_503() {
    let db = setup_test_db().await.unwrap();
    let site = create_site(&db, "ana-and-ben").await.unwrap();
    let config = test_config();
    let app = test_app(db, config.clone());

    let (status, _) = call(
        &app,
        &config,
        &site,
        "POST",
        "/api/dashboard/domain",
        json!({ "domain": "anaandben.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    // Reading the state still works without a provider
    let (status, body) = call(&app, &config, &site, "GET", "/api/dashboard/domain", json!(null)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "unverified");
}
