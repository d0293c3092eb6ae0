use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{Build, Request, Rocket, Route};

pub mod auth;
pub mod class;
pub mod coursework;
pub mod payment;
pub mod teach_on;
pub mod users;

#[cfg(test)]
pub mod test_support;

use auth::*;
use class::*;
use coursework::*;
use payment::*;
use teach_on::*;
use users::*;

use utoipa::OpenApi;

use crate::{
    data::{
        store::{DeleteOutcome, InsertOutcome, UpdateOutcome},
        ApplicationStatus,
    },
    resp::{jwt::doc::JWTAuth, problem::GuardProblem, problem::Problem},
    role::Role,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        issue_token,
        user_list,
        user_get,
        user_create,
        user_is_admin,
        user_is_teacher,
        user_promote,
        class_list,
        class_count,
        class_info,
        class_create,
        class_update,
        class_delete,
        teacher_classes,
        class_approve,
        class_reject,
        class_enroll,
        application_list,
        application_get,
        application_create,
        application_accept,
        application_reject,
        assignment_create,
        assignment_list,
        submission_create,
        submission_list,
        feedback_create,
        feedback_list,
        payment_intent_create,
        payment_create,
        payment_list,
        enrolled_classes,
        enrollment_get,
    ),
    components(schemas(
        Role,
        ApplicationStatus,
        InsertOutcome,
        UpdateOutcome,
        DeleteOutcome,
        TokenRequest,
        TokenResponse,
        AdminCheck,
        TeacherCheck,
        ClassCount,
        IntentRequest,
        IntentResponse,
        Problem
    )),
    modifiers(&JWTAuth)
)]
pub struct ApiDocV1;

#[get("/")]
pub fn app() -> &'static str {
    "Hello developer"
}

#[get("/api-docs/openapi.json")]
pub fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDocV1::openapi())
}

/// Renders what a failing guard left behind, or a bare problem for the status.
#[catch(default)]
pub fn problem_catcher(status: Status, req: &Request<'_>) -> Problem {
    GuardProblem::take(req).unwrap_or_else(|| {
        Problem::new_untyped(status, status.reason().unwrap_or("Unknown problem"))
    })
}

pub fn api() -> Vec<Route> {
    routes![
        app,
        openapi_json,
        issue_token,
        user_list,
        user_get,
        user_create,
        user_is_admin,
        user_is_teacher,
        user_promote,
        class_list,
        class_count,
        class_info,
        teacher_class_info,
        class_create,
        class_add,
        class_update,
        class_delete,
        teacher_classes,
        class_approve,
        class_reject,
        class_enroll,
        application_list,
        application_get,
        application_create,
        application_accept,
        application_reject,
        assignment_create,
        assignment_list,
        submission_create,
        submission_list,
        feedback_create,
        feedback_list,
        payment_intent_create,
        payment_create,
        payment_list,
        enrolled_classes,
        enrollment_get,
    ]
}

pub fn mount_api(rocket: Rocket<Build>) -> Rocket<Build> {
    rocket
        .mount("/", api())
        .register("/", catchers![problem_catcher])
}
