use super::{Message, UserCredentials};
use crate::{
    api::error::{ApiError, ErrorBody},
    auth::AuthService,
};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    post,
    path= "/signup",
    request_body = UserCredentials,
    responses (
        (status = 200, description = "User created", body = Message, content_type = "application/json"),
        (status = 400, description = "Email already registered", body = ErrorBody),
        (status = 422, description = "Invalid request body", body = ErrorBody),
    ),
    tag= "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn signup(
    auth: Extension<Arc<AuthService>>,
    payload: Result<Json<UserCredentials>, JsonRejection>,
) -> Result<Json<Message>, ApiError> {
    let Json(user) = payload?;

    debug!("user: {:?}", user);

    user.validate()?;

    auth.signup(&user.email, &user.password).await?;

    Ok(Json(Message {
        message: "User created successfully".to_string(),
    }))
}
