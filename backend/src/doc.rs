//! OpenAPI document.
//!
//! Registers the factory, login and health paths, the factory view models,
//! and the domain error mirrors from [`crate::inbound::http::schemas`]. Served
//! by Swagger UI in debug builds and printed by the `openapi-dump` binary.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::factories_dto::{
    BrowserView, ChoiceView, FactoryDetailResponse, FactoryListResponse, FactorySummary,
    ProblemReportView, RegistrationChoicesView, RegistrationFormView, RegistrationRequest,
    ScreenSizeView, ScreenshotView,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::LoginRequest;

/// Adds the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Screenshot factory API",
        description = "Listing, inspection and registration of screenshot factories."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::factories::list_factories,
        crate::inbound::http::factories::factory_detail,
        crate::inbound::http::factories::registration_form,
        crate::inbound::http::factories::register_factory,
        crate::inbound::http::users::login,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        LoginRequest,
        FactorySummary,
        FactoryListResponse,
        BrowserView,
        ScreenshotView,
        ProblemReportView,
        ScreenSizeView,
        FactoryDetailResponse,
        RegistrationRequest,
        ChoiceView,
        RegistrationChoicesView,
        RegistrationFormView,
    )),
    tags(
        (name = "factories", description = "Screenshot factory pages"),
        (name = "users", description = "Session login"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    fn object_fields(name: &str) -> Vec<String> {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        match schemas.get(name).unwrap_or_else(|| panic!("{name} schema")) {
            RefOr::T(Schema::Object(obj)) => obj.properties.keys().cloned().collect(),
            _ => panic!("expected Object schema for {name}"),
        }
    }

    #[rstest]
    #[case("crate.domain.Error", "code")]
    #[case("crate.domain.Error", "message")]
    #[case("FactoryDetailResponse", "adminLoggedIn")]
    #[case("RegistrationFormView", "nonFieldErrors")]
    fn schemas_expose_wire_fields(#[case] schema: &str, #[case] field: &str) {
        assert!(
            object_fields(schema).iter().any(|name| name == field),
            "{schema} should have field '{field}'"
        );
    }

    #[rstest]
    #[case("/api/v1/factories")]
    #[case("/api/v1/factories/{name}")]
    #[case("/api/v1/factories/add")]
    #[case("/api/v1/login")]
    #[case("/health/ready")]
    fn paths_are_documented(#[case] path: &str) {
        assert!(ApiDoc::openapi().paths.paths.contains_key(path));
    }
}
