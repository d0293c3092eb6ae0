use rocket::serde::json::Json;
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::resp::jwt::TokenAuthority;
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct TokenRequest {
    #[schema(format = "email")]
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Issue an access token
///
/// The token carries the given email and expires an hour after issuance.
#[utoipa::path(
    post,
    path = "/jwt",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Signed access token", body = TokenResponse),
        (status = 400, description = "Missing email", body = Problem),
    )
)]
#[post("/jwt", format = "json", data = "<identity>")]
#[tracing::instrument(skip(tokens))]
pub fn issue_token(
    identity: Json<TokenRequest>,
    tokens: &State<TokenAuthority>,
) -> Result<Json<TokenResponse>, Problem> {
    let email = identity.email.trim();
    if email.is_empty() {
        return Err(problems::bad_field("email", "An email address is required."));
    }

    let token = tokens.issue(email).map_err(|e| {
        tracing::error!("unable to sign access token: {}", e);
        problems::internal("Unable to sign access token.")
    })?;

    Ok(Json(TokenResponse { token }))
}
