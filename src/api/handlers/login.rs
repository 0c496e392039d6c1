use super::UserCredentials;
use crate::{
    api::error::{ApiError, ErrorBody},
    auth::{AccessToken, AuthService},
};
use axum::{
    extract::{rejection::JsonRejection, Extension},
    Json,
};
use std::sync::Arc;
use tracing::{debug, instrument};

#[utoipa::path(
    post,
    path= "/login",
    request_body = UserCredentials,
    responses (
        (status = 200, description = "Login successful", body = AccessToken, content_type = "application/json"),
        (status = 400, description = "Incorrect email or password", body = ErrorBody),
        (status = 422, description = "Invalid request body", body = ErrorBody),
    ),
    tag= "auth"
)]
#[instrument(skip(auth, payload))]
pub async fn login(
    auth: Extension<Arc<AuthService>>,
    payload: Result<Json<UserCredentials>, JsonRejection>,
) -> Result<Json<AccessToken>, ApiError> {
    let Json(user) = payload?;

    debug!("user: {:?}", user);

    user.validate()?;

    let token = auth.login(&user.email, &user.password).await?;

    debug!("Login successful");

    Ok(Json(token))
}
