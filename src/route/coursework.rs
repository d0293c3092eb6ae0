use rocket::serde::json::{Json, Value};
use rocket::State;

use crate::data::coursework::{Assignment, AssignmentSubmission, CourseworkDbExt, Feedback};
use crate::data::store::{Db, InsertOutcome};
use crate::resp::document::documents_json;
use crate::resp::problem::Problem;

#[utoipa::path(
    post,
    path = "/users/assignment",
    responses(
        (status = 200, description = "Insert result", body = InsertOutcome),
        (status = 400, description = "Missing class title", body = Problem),
    )
)]
#[post("/users/assignment", format = "json", data = "<assignment>")]
#[tracing::instrument(skip(db))]
pub async fn assignment_create(
    assignment: Json<Assignment>,
    db: &State<Db>,
) -> Result<Json<InsertOutcome>, Problem> {
    Ok(Json(db.add_assignment(assignment.into_inner()).await?))
}

/// Assignments of a class
#[utoipa::path(
    get,
    path = "/users/assignment/{title}",
    params(("title" = String, Path, description = "class title")),
    responses((status = 200, description = "Assignment documents"))
)]
#[get("/users/assignment/<title>")]
#[tracing::instrument(skip(db))]
pub async fn assignment_list(title: &str, db: &State<Db>) -> Result<Json<Value>, Problem> {
    Ok(Json(documents_json(db.assignments_for(title).await?)))
}

#[utoipa::path(
    post,
    path = "/assignmentSubmit",
    responses(
        (status = 200, description = "Insert result", body = InsertOutcome),
        (status = 400, description = "Missing class title", body = Problem),
    )
)]
#[post("/assignmentSubmit", format = "json", data = "<submission>")]
#[tracing::instrument(skip(db))]
pub async fn submission_create(
    submission: Json<AssignmentSubmission>,
    db: &State<Db>,
) -> Result<Json<InsertOutcome>, Problem> {
    Ok(Json(db.submit_assignment(submission.into_inner()).await?))
}

/// Submissions for a class
#[utoipa::path(
    get,
    path = "/assignmentSubmit/{title}",
    params(("title" = String, Path, description = "class title")),
    responses((status = 200, description = "Submission documents"))
)]
#[get("/assignmentSubmit/<title>")]
#[tracing::instrument(skip(db))]
pub async fn submission_list(title: &str, db: &State<Db>) -> Result<Json<Value>, Problem> {
    Ok(Json(documents_json(db.submissions_for(title).await?)))
}

#[utoipa::path(
    post,
    path = "/users/feedback",
    responses(
        (status = 200, description = "Insert result", body = InsertOutcome),
        (status = 400, description = "Missing class title", body = Problem),
    )
)]
#[post("/users/feedback", format = "json", data = "<feedback>")]
#[tracing::instrument(skip(db))]
pub async fn feedback_create(
    feedback: Json<Feedback>,
    db: &State<Db>,
) -> Result<Json<InsertOutcome>, Problem> {
    Ok(Json(db.add_feedback(feedback.into_inner()).await?))
}

#[utoipa::path(
    get,
    path = "/users/feedback",
    responses((status = 200, description = "Feedback documents"))
)]
#[get("/users/feedback")]
#[tracing::instrument(skip(db))]
pub async fn feedback_list(db: &State<Db>) -> Result<Json<Value>, Problem> {
    Ok(Json(documents_json(db.list_feedback().await?)))
}

#[cfg(test)]
mod coursework_endpoints {
    use rocket::http::Status;
    use serde_json::{json, Value};

    use crate::route::test_support::client;

    #[rocket::async_test]
    async fn assignments_are_grouped_by_class_title() {
        let (client, _) = client().await;

        for (title, description) in [("Rust 101", "ownership"), ("Go 101", "channels"), ("Rust 101", "traits")] {
            let response = client
                .post("/users/assignment")
                .json(&json!({
                    "title": title,
                    "description": description,
                    "deadline": "2026-11-01",
                }))
                .dispatch()
                .await;
            assert_eq!(response.status(), Status::Ok);
        }

        let listed: Vec<Value> = client
            .get("/users/assignment/Rust%20101")
            .dispatch()
            .await
            .into_json()
            .await
            .expect("assignments json");
        let descriptions: Vec<&str> = listed
            .iter()
            .filter_map(|a| a["description"].as_str())
            .collect();
        assert_eq!(descriptions, vec!["ownership", "traits"]);
    }

    #[rocket::async_test]
    async fn submissions_keep_extra_fields() {
        let (client, _) = client().await;

        client
            .post("/assignmentSubmit")
            .json(&json!({
                "title": "Rust 101",
                "email": "s@x.com",
                "link": "https://git.example/s/hw1",
            }))
            .dispatch()
            .await;

        let listed: Vec<Value> = client
            .get("/assignmentSubmit/Rust%20101")
            .dispatch()
            .await
            .into_json()
            .await
            .expect("submissions json");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["link"], "https://git.example/s/hw1");
        assert!(listed[0]["_id"].is_string());

        let empty: Vec<Value> = client
            .get("/assignmentSubmit/Unknown")
            .dispatch()
            .await
            .into_json()
            .await
            .expect("submissions json");
        assert!(empty.is_empty());
    }

    #[rocket::async_test]
    async fn feedback_listing() {
        let (client, _) = client().await;

        let response = client
            .post("/users/feedback")
            .json(&json!({ "title": "", "rating": 5 }))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::BadRequest);

        client
            .post("/users/feedback")
            .json(&json!({ "title": "Rust 101", "rating": 4.5, "description": "great" }))
            .dispatch()
            .await;

        let listed: Vec<Value> = client
            .get("/users/feedback")
            .dispatch()
            .await
            .into_json()
            .await
            .expect("feedback json");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0]["rating"], 4.5);
    }
}
