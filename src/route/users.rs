use rocket::serde::json::{Json, Value};
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::store::{filter, Db, InsertOutcome, UpdateOutcome};
use crate::data::user::db::UserDbExt;
use crate::data::user::NewUser;
use crate::middleware::gate::AdminToken;
use crate::middleware::paging::PageState;
use crate::resp::document::{documents_json, optional_document_json};
use crate::resp::problem::Problem;
use crate::role::Role;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminCheck {
    pub admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TeacherCheck {
    pub teacher: bool,
}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    params(
        ("page" = Option<u32>, Query, description = "zero based page"),
        ("size" = Option<u32>, Query, description = "page length"),
    ),
    responses(
        (status = 200, description = "User documents"),
        (status = 401, description = "Missing or invalid token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/users")]
#[tracing::instrument(skip(db))]
pub async fn user_list(
    _admin: AdminToken,
    paging: PageState,
    db: &State<Db>,
) -> Result<Json<Value>, Problem> {
    let users = db.list_users(paging.page()).await?;
    Ok(Json(documents_json(users)))
}

/// Get a user by email
#[utoipa::path(
    get,
    path = "/users/{email}",
    params(("email" = String, Path, description = "user email")),
    responses((status = 200, description = "User document or null"))
)]
#[get("/users/<email>")]
#[tracing::instrument(skip(db))]
pub async fn user_get(email: &str, db: &State<Db>) -> Result<Json<Value>, Problem> {
    let user = db.find_user_by_email(email).await?;
    Ok(Json(optional_document_json(user)))
}

/// Register a user on first login
///
/// Nothing is written when the email is already registered.
#[utoipa::path(
    post,
    path = "/users",
    responses(
        (status = 200, description = "Insert result", body = InsertOutcome),
        (status = 400, description = "Missing email", body = Problem),
    )
)]
#[post("/users", format = "json", data = "<user>")]
#[tracing::instrument(skip(db))]
pub async fn user_create(
    user: Json<NewUser>,
    db: &State<Db>,
) -> Result<Json<InsertOutcome>, Problem> {
    Ok(Json(db.create_user(user.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/users/admin/{email}",
    params(("email" = String, Path, description = "user email")),
    responses((status = 200, description = "Whether the user is an admin", body = AdminCheck))
)]
#[get("/users/admin/<email>")]
#[tracing::instrument(skip(db))]
pub async fn user_is_admin(email: &str, db: &State<Db>) -> Result<Json<AdminCheck>, Problem> {
    let role = db.resolve_role(email).await?;
    Ok(Json(AdminCheck {
        admin: role == Role::Admin,
    }))
}

#[utoipa::path(
    get,
    path = "/users/teacher/{email}",
    params(("email" = String, Path, description = "user email")),
    responses((status = 200, description = "Whether the user is a teacher", body = TeacherCheck))
)]
#[get("/users/teacher/<email>")]
#[tracing::instrument(skip(db))]
pub async fn user_is_teacher(
    email: &str,
    db: &State<Db>,
) -> Result<Json<TeacherCheck>, Problem> {
    let role = db.resolve_role(email).await?;
    Ok(Json(TeacherCheck {
        teacher: role == Role::Teacher,
    }))
}

/// Make a user an admin
///
/// There is no way back.
#[utoipa::path(
    patch,
    path = "/users/admin/{id}",
    params(("id" = String, Path, description = "user id")),
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 400, description = "Malformed id", body = Problem),
        (status = 401, description = "Missing or invalid token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(("jwt" = []))
)]
#[patch("/users/admin/<id>")]
#[tracing::instrument(skip(db))]
pub async fn user_promote(
    id: &str,
    admin: AdminToken,
    db: &State<Db>,
) -> Result<Json<UpdateOutcome>, Problem> {
    let id = filter::parse_id(id)?;
    tracing::info!("{} promotes user {} to admin", admin.0.email, id);
    Ok(Json(db.promote_to_admin(id).await?))
}

///////////////////////
//       TESTS
///////////////////////
