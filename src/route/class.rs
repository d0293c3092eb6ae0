use rocket::serde::json::{Json, Value};
use rocket::State;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::data::class::db::ClassDbExt;
use crate::data::class::{ClassUpdate, NewClass};
use crate::data::store::{filter, Db, DeleteOutcome, InsertOutcome, UpdateOutcome};
use crate::data::ApplicationStatus;
use crate::middleware::gate::AdminToken;
use crate::middleware::paging::PageState;
use crate::resp::document::{documents_json, optional_document_json};
use crate::resp::problem::Problem;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassCount {
    pub count: u64,
}

/// List all classes
///
/// Ordered by id. `page`/`size` select a window.
#[utoipa::path(
    get,
    path = "/classes",
    params(
        ("page" = Option<u32>, Query, description = "zero based page"),
        ("size" = Option<u32>, Query, description = "page length"),
    ),
    responses((status = 200, description = "Class documents"))
)]
#[get("/classes")]
#[tracing::instrument(skip(db))]
pub async fn class_list(paging: PageState, db: &State<Db>) -> Result<Json<Value>, Problem> {
    Ok(Json(documents_json(db.list_classes(paging.page()).await?)))
}

#[utoipa::path(
    get,
    path = "/classesCount",
    responses((status = 200, description = "Number of classes", body = ClassCount))
)]
#[get("/classesCount")]
#[tracing::instrument(skip(db))]
pub async fn class_count(db: &State<Db>) -> Result<Json<ClassCount>, Problem> {
    Ok(Json(ClassCount {
        count: db.count_classes().await?,
    }))
}

/// Get class information
#[utoipa::path(
    get,
    path = "/class/{id}",
    params(("id" = String, Path, description = "class id")),
    responses(
        (status = 200, description = "Class document or null"),
        (status = 400, description = "Malformed id", body = Problem),
    )
)]
#[get("/class/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_info(id: &str, db: &State<Db>) -> Result<Json<Value>, Problem> {
    let id = filter::parse_id(id)?;
    Ok(Json(optional_document_json(db.get_class(id).await?)))
}

#[get("/users/teacherClass/<id>")]
#[tracing::instrument(skip(db))]
pub async fn teacher_class_info(id: &str, db: &State<Db>) -> Result<Json<Value>, Problem> {
    class_info(id, db).await
}

/// Create a class
///
/// New classes wait for admin review and have no enrolments.
#[utoipa::path(
    post,
    path = "/class",
    responses(
        (status = 200, description = "Insert result", body = InsertOutcome),
        (status = 400, description = "Missing owner or title", body = Problem),
    )
)]
#[post("/class", format = "json", data = "<class>")]
#[tracing::instrument(skip(db))]
pub async fn class_create(
    class: Json<NewClass>,
    db: &State<Db>,
) -> Result<Json<InsertOutcome>, Problem> {
    Ok(Json(db.create_class(class.into_inner()).await?))
}

#[post("/addClass", format = "json", data = "<class>")]
#[tracing::instrument(skip(db))]
pub async fn class_add(
    class: Json<NewClass>,
    db: &State<Db>,
) -> Result<Json<InsertOutcome>, Problem> {
    class_create(class, db).await
}

#[utoipa::path(
    patch,
    path = "/updateClass/{id}",
    params(("id" = String, Path, description = "class id")),
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 400, description = "Malformed id or empty update", body = Problem),
    )
)]
#[patch("/updateClass/<id>", format = "json", data = "<update>")]
#[tracing::instrument(skip(db))]
pub async fn class_update(
    id: &str,
    update: Json<ClassUpdate>,
    db: &State<Db>,
) -> Result<Json<UpdateOutcome>, Problem> {
    let id = filter::parse_id(id)?;
    Ok(Json(db.update_class(id, update.into_inner()).await?))
}

#[utoipa::path(
    delete,
    path = "/users/teacherClass/{id}",
    params(("id" = String, Path, description = "class id")),
    responses((status = 200, description = "Delete result", body = DeleteOutcome))
)]
#[delete("/users/teacherClass/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_delete(id: &str, db: &State<Db>) -> Result<Json<DeleteOutcome>, Problem> {
    let id = filter::parse_id(id)?;
    Ok(Json(db.delete_class(id).await?))
}

/// Classes owned by a teacher
#[utoipa::path(
    get,
    path = "/users/teacherClasses/{email}",
    params(("email" = String, Path, description = "teacher email")),
    responses((status = 200, description = "Class documents"))
)]
#[get("/users/teacherClasses/<email>")]
#[tracing::instrument(skip(db))]
pub async fn teacher_classes(email: &str, db: &State<Db>) -> Result<Json<Value>, Problem> {
    Ok(Json(documents_json(db.classes_by_teacher(email).await?)))
}

/// Approve a class
#[utoipa::path(
    patch,
    path = "/users/admin/classes/{id}",
    params(("id" = String, Path, description = "class id")),
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 401, description = "Missing or invalid token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(("jwt" = []))
)]
#[patch("/users/admin/classes/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_approve(
    id: &str,
    _admin: AdminToken,
    db: &State<Db>,
) -> Result<Json<UpdateOutcome>, Problem> {
    let id = filter::parse_id(id)?;
    Ok(Json(
        db.set_class_status(id, ApplicationStatus::Accepted).await?,
    ))
}

/// Reject a class
#[utoipa::path(
    patch,
    path = "/users/admin/classes/Rejected/{id}",
    params(("id" = String, Path, description = "class id")),
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 401, description = "Missing or invalid token", body = Problem),
        (status = 403, description = "Caller isn't an admin", body = Problem),
    ),
    security(("jwt" = []))
)]
#[patch("/users/admin/classes/Rejected/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_reject(
    id: &str,
    _admin: AdminToken,
    db: &State<Db>,
) -> Result<Json<UpdateOutcome>, Problem> {
    let id = filter::parse_id(id)?;
    Ok(Json(
        db.set_class_status(id, ApplicationStatus::Rejected).await?,
    ))
}

/// Count an enrolment
///
/// A single atomic store update, so concurrent enrolments all count.
#[utoipa::path(
    patch,
    path = "/enrollUpdate/{id}",
    params(("id" = String, Path, description = "class id")),
    responses(
        (status = 200, description = "Update result", body = UpdateOutcome),
        (status = 400, description = "Malformed id", body = Problem),
    )
)]
#[patch("/enrollUpdate/<id>")]
#[tracing::instrument(skip(db))]
pub async fn class_enroll(id: &str, db: &State<Db>) -> Result<Json<UpdateOutcome>, Problem> {
    let id = filter::parse_id(id)?;
    Ok(Json(db.enroll(id).await?))
}
