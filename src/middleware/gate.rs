//! Role gates for mutation endpoints.
//!
//! A gate is a plain decision ([`Access`]) over the caller's resolved role.
//! The request guards in this module turn a [`Access::Deny`] into a guard
//! error, so Rocket never runs the wrapped handler.

use rocket::http::Status;
use rocket::outcome::Outcome::{Error, Forward, Success};
use rocket::request::{self, FromRequest, Request};

use crate::data::store::Db;
use crate::data::user::db::UserDbExt;
use crate::resp::jwt::Credential;
use crate::resp::problem::{problems, GuardProblem, Problem};
use crate::role::Role;

#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    Allow,
    Deny(Problem),
}

impl Access {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Access::Allow)
    }
}

/// Allows callers whose role is exactly `required`.
pub fn require_role(caller: &Credential, role: Role, required: Role) -> Access {
    if role == required {
        Access::Allow
    } else {
        tracing::info!(
            "denied {} access to {}: role is {}",
            required,
            caller.email,
            role
        );
        Access::Deny(problems::forbidden(format!("{} role required.", required)))
    }
}

/// Verified caller that is an admin. Role is read from the store by the email
/// inside the verified token, never from request parameters.
#[derive(Debug, Clone)]
pub struct AdminToken(pub Credential);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminToken {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let credential = match req.guard::<Credential>().await {
            Success(it) => it,
            Error(e) => return Error(e),
            Forward(s) => return Forward(s),
        };

        let role = match req.rocket().state::<Db>() {
            Some(db) => db.resolve_role(&credential.email).await,
            None => Err(problems::internal("document store isn't managed")),
        };

        let role = match role {
            Ok(role) => role,
            Err(e) => {
                GuardProblem::record(req, e.clone());
                return Error((e.status, e));
            }
        };

        match require_role(&credential, role, Role::Admin) {
            Access::Allow => Success(AdminToken(credential)),
            Access::Deny(problem) => {
                GuardProblem::record(req, problem.clone());
                Error((Status::Forbidden, problem))
            }
        }
    }
}
