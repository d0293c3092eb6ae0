use rocket::serde::json::{Json, Value};
use rocket::State;

use crate::data::store::{filter, Db, InsertOutcome, UpdateOutcome};
use crate::data::teach_on::{NewTeachOn, TeachOnDbExt};
use crate::data::ApplicationStatus;
use crate::middleware::gate::AdminToken;
use crate::middleware::paging::PageState;
use crate::resp::document::{documents_json, optional_document_json};
use crate::resp::problem::Problem;

/// List teacher applications
#[utoipa::path(
    get,
    path = "/teachOn",
    params(
        ("page" = Option<u32>, Query, description = "zero based page"),
        ("size" = Option<u32>, Query, description = "page length"),
    ),
    responses(
        (status = 200, description = "Application documents"),
        (status = 401, description = "Missing or invalid token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(("jwt" = []))
)]
#[get("/teachOn")]
#[tracing::instrument(skip(db))]
pub async fn application_list(
    _admin: AdminToken,
    paging: PageState,
    db: &State<Db>,
) -> Result<Json<Value>, Problem> {
    Ok(Json(documents_json(
        db.list_applications(paging.page()).await?,
    )))
}

#[utoipa::path(
    get,
    path = "/teachOn/{id}",
    params(("id" = String, Path, description = "application id")),
    responses(
        (status = 200, description = "Application document or null"),
        (status = 400, description = "Malformed id", body = Problem),
    )
)]
#[get("/teachOn/<id>")]
#[tracing::instrument(skip(db))]
pub async fn application_get(id: &str, db: &State<Db>) -> Result<Json<Value>, Problem> {
    let id = filter::parse_id(id)?;
    Ok(Json(optional_document_json(db.get_application(id).await?)))
}

/// Apply to teach
///
/// Applications always start out pending.
#[utoipa::path(
    post,
    path = "/teachOn",
    responses(
        (status = 200, description = "Insert result", body = InsertOutcome),
        (status = 400, description = "Missing applicant email", body = Problem),
    )
)]
#[post("/teachOn", format = "json", data = "<application>")]
#[tracing::instrument(skip(db))]
pub async fn application_create(
    application: Json<NewTeachOn>,
    db: &State<Db>,
) -> Result<Json<InsertOutcome>, Problem> {
    Ok(Json(db.apply_to_teach(application.into_inner()).await?))
}

async fn review(id: &str, status: ApplicationStatus, db: &Db) -> Result<UpdateOutcome, Problem> {
    let id = filter::parse_id(id)?;
    db.set_application_status(id, status).await
}

/// Accept a teacher application
#[utoipa::path(
    patch,
    path = "/teachOn/{id}",
    params(("id" = String, Path, description = "application id")),
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 401, description = "Missing or invalid token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(("jwt" = []))
)]
#[patch("/teachOn/<id>")]
#[tracing::instrument(skip(db))]
pub async fn application_accept(
    id: &str,
    _admin: AdminToken,
    db: &State<Db>,
) -> Result<Json<UpdateOutcome>, Problem> {
    Ok(Json(review(id, ApplicationStatus::Accepted, db).await?))
}

/// Reject a teacher application
#[utoipa::path(
    patch,
    path = "/teachOnRejected/{id}",
    params(("id" = String, Path, description = "application id")),
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 401, description = "Missing or invalid token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(("jwt" = []))
)]
#[patch("/teachOnRejected/<id>")]
#[tracing::instrument(skip(db))]
pub async fn application_reject(
    id: &str,
    _admin: AdminToken,
    db: &State<Db>,
) -> Result<Json<UpdateOutcome>, Problem> {
    Ok(Json(review(id, ApplicationStatus::Rejected, db).await?))
}
