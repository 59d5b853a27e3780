//! OpenAPI document served at `/openapi.json` and rendered by Swagger UI at
//! `/docs`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::auth::types::{LoginData, Token, UserCreate, UserResponse};
use crate::health::{DatabaseStatus, HealthReport};
use crate::heroes::types::{Hero, HeroCreate, HeroUpdate};
use crate::http::response::{DatabaseErrorBody, DetailBody, InternalErrorBody};

/// Path of the generated document.
pub const OPENAPI_PATH: &str = "/openapi.json";

/// Path of the Swagger UI.
pub const DOCS_PATH: &str = "/docs";

/// Registers the bearer scheme used by `/auth/me`.
struct BearerAddon;

impl Modify for BearerAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerAddon),
    info(
        title = "Hero API",
        version = "1.0.0",
        description = "Heroes and accounts, served even while the database is unavailable."
    ),
    paths(
        crate::http::server::root,
        crate::health::probe::health_handler,
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::me,
        crate::heroes::handlers::list_heroes,
        crate::heroes::handlers::create_hero,
        crate::heroes::handlers::get_hero,
        crate::heroes::handlers::update_hero,
        crate::heroes::handlers::delete_hero,
    ),
    components(schemas(
        Hero,
        HeroCreate,
        HeroUpdate,
        UserCreate,
        LoginData,
        UserResponse,
        Token,
        HealthReport,
        DatabaseStatus,
        DetailBody,
        DatabaseErrorBody,
        InternalErrorBody,
    )),
    tags(
        (name = "health", description = "Liveness of the API and its database"),
        (name = "auth", description = "Registration and bearer tokens"),
        (name = "heroes", description = "Hero records")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_route_is_documented() {
        let doc = ApiDoc::openapi();
        for path in ["/", "/health", "/auth/register", "/auth/login", "/auth/me", "/heroes", "/heroes/{id}"] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }

    #[test]
    fn error_envelopes_are_registered() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().unwrap().schemas;
        for name in ["DatabaseErrorBody", "InternalErrorBody", "DetailBody", "HealthReport"] {
            assert!(schemas.contains_key(name), "{name} missing");
        }
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer"));
    }
}
