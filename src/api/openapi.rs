#![allow(clippy::needless_for_each)]

use super::{
    error::ErrorBody,
    handlers::{self, Message, UserCredentials},
};
use crate::{
    auth::AccessToken,
    store::{Book, NewBook},
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health,
        handlers::signup::signup,
        handlers::login::login,
        handlers::books::list_books,
        handlers::books::create_book,
        handlers::books::get_book,
        handlers::books::update_book,
        handlers::books::delete_book,
    ),
    components(schemas(
        handlers::health::Health,
        UserCredentials,
        Message,
        AccessToken,
        Book,
        NewBook,
        ErrorBody
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "bookstore", description = "Book catalog API")
    )
)]
struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
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
}

#[must_use]
pub fn openapi() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
