//! Tests for the login handler.

use super::*;
use crate::domain::UserId;
use crate::domain::ports::{
    FixtureLoginService, LoginService, MockFactoriesQuery, MockFactoryRegistration,
    MockLoginService,
};
use crate::inbound::http::state::HttpStatePorts;
use crate::inbound::http::test_utils::test_session_middleware;
use actix_web::http::StatusCode;
use actix_web::{App, test as actix_test, web};
use rstest::rstest;
use serde_json::Value;
use std::sync::Arc;

fn test_app(
    login_service: Arc<dyn LoginService>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let state = HttpState::new(
        HttpStatePorts {
            login: login_service,
            factories: Arc::new(MockFactoriesQuery::new()),
            registration: Arc::new(MockFactoryRegistration::new()),
        },
        "/login",
    );
    App::new()
        .app_data(web::Data::new(state))
        .wrap(test_session_middleware())
        .service(web::scope("/api/v1").service(login))
}

fn login_request(username: &str, password: &str) -> actix_http::Request {
    actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(&LoginRequest {
            username: username.into(),
            password: password.into(),
        })
        .to_request()
}

#[rstest]
#[case("   ", "password", "username must not be empty", "username", "empty_username")]
#[case("admin", "", "password must not be empty", "password", "empty_password")]
#[actix_web::test]
async fn login_rejects_blank_fields(
    #[case] username: &str,
    #[case] password: &str,
    #[case] message: &str,
    #[case] field: &str,
    #[case] code: &str,
) {
    let app = actix_test::init_service(test_app(Arc::new(FixtureLoginService))).await;

    let response = actix_test::call_service(&app, login_request(username, password)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["message"], message);
    assert_eq!(value["code"], "invalid_request");
    assert_eq!(value["details"]["field"], field);
    assert_eq!(value["details"]["code"], code);
}

#[actix_web::test]
async fn login_rejects_wrong_credentials_with_unauthorised_status() {
    let app = actix_test::init_service(test_app(Arc::new(FixtureLoginService))).await;

    let response = actix_test::call_service(&app, login_request("admin", "hunter2")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let value: Value = actix_test::read_body_json(response).await;
    assert_eq!(value["message"], "invalid credentials");
    assert_eq!(value["code"], "unauthorized");
}

#[actix_web::test]
async fn successful_login_sets_session_cookie() {
    let user_id = UserId::random();
    let mut service = MockLoginService::new();
    service
        .expect_authenticate()
        .withf(|credentials| credentials.username() == "operator")
        .times(1)
        .returning(move |_| Ok(user_id));
    let app = actix_test::init_service(test_app(Arc::new(service))).await;

    let response = actix_test::call_service(&app, login_request("operator", "secret")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .response()
            .cookies()
            .any(|cookie| cookie.name() == "session")
    );
}
