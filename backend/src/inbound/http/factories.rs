//! Screenshot factory pages.
//!
//! ```text
//! GET  /api/v1/factories
//! GET  /api/v1/factories/{name}
//! GET  /api/v1/factories/add
//! POST /api/v1/factories/add  name=hardy&architecture=1&operating_system=2
//! ```
//!
//! The `add` routes must be registered ahead of `{name}`; [`configure`]
//! does this.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpRequest, HttpResponse, get, post, web};
use url::form_urlencoded;

use crate::domain::{ApiResult, FactoryRegistrationForm, RegistrationOutcome};
use crate::inbound::http::factories_dto::{
    FactoryDetailResponse, FactoryListResponse, RegistrationFormView, RegistrationRequest,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Register the factory routes in matching order.
///
/// # Examples
/// ```
/// use actix_web::{App, web};
/// use shotserver::inbound::http::factories;
///
/// let app = App::new().service(web::scope("/api/v1").configure(factories::configure));
/// ```
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(registration_form)
        .service(register_factory)
        .service(list_factories)
        .service(factory_detail);
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Redirect to the login page, remembering where the visitor was headed.
fn redirect_to_login(login_url: &str, next: &str) -> HttpResponse {
    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("next", next)
        .finish();
    let separator = if login_url.contains('?') { '&' } else { '?' };
    see_other(&format!("{login_url}{separator}{query}"))
}

fn detail_location(name: &str) -> String {
    format!("/api/v1/factories/{name}")
}

/// List factories that polled recently, busiest first.
#[utoipa::path(
    get,
    path = "/api/v1/factories",
    responses(
        (status = 200, description = "Active factories", body = FactoryListResponse),
        (status = 503, description = "No active factories", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["factories"],
    operation_id = "listFactories",
    security([])
)]
#[get("/factories")]
pub async fn list_factories(
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<FactoryListResponse>> {
    let factories = state.factories.list_active().await?;
    Ok(web::Json(FactoryListResponse::from_factories(&factories)))
}

/// Show one factory with its browsers and recent activity.
///
/// Browser commands are included only when the session belongs to the
/// factory admin.
#[utoipa::path(
    get,
    path = "/api/v1/factories/{name}",
    params(("name" = String, Path, description = "Factory name")),
    responses(
        (status = 200, description = "Factory details", body = FactoryDetailResponse),
        (status = 404, description = "Unknown factory", body = ErrorSchema),
        (status = 503, description = "Store unavailable", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["factories"],
    operation_id = "getFactory",
    security([])
)]
#[get("/factories/{name}")]
pub async fn factory_detail(
    state: web::Data<HttpState>,
    session: SessionContext,
    name: web::Path<String>,
) -> ApiResult<web::Json<FactoryDetailResponse>> {
    let viewer = session.user_id()?;
    let details = state.factories.factory_details(&name, viewer).await?;
    Ok(web::Json(FactoryDetailResponse::from(&details)))
}

/// Render the empty registration form.
#[utoipa::path(
    get,
    path = "/api/v1/factories/add",
    responses(
        (status = 200, description = "Registration form", body = RegistrationFormView),
        (status = 303, description = "Login required", headers(("Location" = String, description = "Login URL with next parameter"))),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["factories"],
    operation_id = "getRegistrationForm"
)]
#[get("/factories/add")]
pub async fn registration_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
) -> ApiResult<HttpResponse> {
    if session.user_id()?.is_none() {
        return Ok(redirect_to_login(&state.login_url, req.path()));
    }
    let choices = state.registration.registration_choices().await?;
    Ok(HttpResponse::Ok().json(RegistrationFormView::empty(&choices)))
}

/// Validate and register a factory owned by the session user.
#[utoipa::path(
    post,
    path = "/api/v1/factories/add",
    request_body(content = RegistrationRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Registered, or login required", headers(("Location" = String, description = "Factory page or login URL"))),
        (status = 400, description = "Body is not a urlencoded form", body = ErrorSchema),
        (status = 422, description = "Form rejected", body = RegistrationFormView),
        (status = 503, description = "Store unavailable", body = ErrorSchema)
    ),
    tags = ["factories"],
    operation_id = "registerFactory"
)]
#[post("/factories/add")]
pub async fn register_factory(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
    payload: Result<web::Form<RegistrationRequest>, actix_web::Error>,
) -> ApiResult<HttpResponse> {
    // Anonymous posts are redirected whatever their body looks like.
    let Some(admin) = session.user_id()? else {
        return Ok(redirect_to_login(&state.login_url, req.path()));
    };
    let form = FactoryRegistrationForm::from(payload?.into_inner());
    match state.registration.register(admin, form).await? {
        RegistrationOutcome::Registered(factory) => {
            Ok(see_other(&detail_location(factory.name.as_ref())))
        }
        RegistrationOutcome::Rejected(rejected) => Ok(HttpResponse::build(
            StatusCode::UNPROCESSABLE_ENTITY,
        )
        .json(RegistrationFormView::render(
            &rejected.form,
            &rejected.errors,
            &rejected.choices,
        ))),
    }
}

#[cfg(test)]
#[path = "factories_tests.rs"]
mod tests;
