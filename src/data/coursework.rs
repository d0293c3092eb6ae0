//! Assignments, their submissions and class feedback. All of these are keyed
//! to a class by its title and never change once written.

use bson::{doc, Document};
use serde::{Deserialize, Serialize};

use super::store::{
    filter, DocumentStore, InsertOutcome, ASSIGNMENT_COLLECTION_NAME,
    ASSIGNMENT_SUBMIT_COLLECTION_NAME, FEEDBACK_COLLECTION_NAME,
};
use crate::resp::problem::{problems, Problem};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assignment {
    /// Title of the class the assignment belongs to.
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,

    #[serde(flatten)]
    pub extra: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentSubmission {
    pub title: String,
    /// Submitting student.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(flatten)]
    pub extra: Document,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feedback {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(flatten)]
    pub extra: Document,
}

fn require_title(title: &str) -> Result<(), Problem> {
    if title.trim().is_empty() {
        return Err(problems::bad_field("title", "A class title is required."));
    }
    Ok(())
}

async fn insert_clean<T: Serialize>(
    db: &dyn DocumentStore,
    collection: &str,
    value: &T,
) -> Result<InsertOutcome, Problem> {
    let mut document = bson::to_document(value)?;
    document.remove("_id");
    db.insert_one(collection, document).await
}

#[allow(async_fn_in_trait)]
pub trait CourseworkDbExt {
    async fn add_assignment(&self, assignment: Assignment) -> Result<InsertOutcome, Problem>;
    async fn assignments_for(&self, title: &str) -> Result<Vec<Document>, Problem>;

    async fn submit_assignment(
        &self,
        submission: AssignmentSubmission,
    ) -> Result<InsertOutcome, Problem>;
    async fn submissions_for(&self, title: &str) -> Result<Vec<Document>, Problem>;

    async fn add_feedback(&self, feedback: Feedback) -> Result<InsertOutcome, Problem>;
    async fn list_feedback(&self) -> Result<Vec<Document>, Problem>;
}

impl CourseworkDbExt for dyn DocumentStore {
    async fn add_assignment(&self, assignment: Assignment) -> Result<InsertOutcome, Problem> {
        require_title(&assignment.title)?;
        insert_clean(self, ASSIGNMENT_COLLECTION_NAME, &assignment).await
    }

    async fn assignments_for(&self, title: &str) -> Result<Vec<Document>, Problem> {
        self.find(ASSIGNMENT_COLLECTION_NAME, filter::by_title(title), None)
            .await
    }

    async fn submit_assignment(
        &self,
        submission: AssignmentSubmission,
    ) -> Result<InsertOutcome, Problem> {
        require_title(&submission.title)?;
        insert_clean(self, ASSIGNMENT_SUBMIT_COLLECTION_NAME, &submission).await
    }

    async fn submissions_for(&self, title: &str) -> Result<Vec<Document>, Problem> {
        tracing::debug!("listing submissions for '{}'", title);
        self.find(
            ASSIGNMENT_SUBMIT_COLLECTION_NAME,
            filter::by_title(title),
            None,
        )
        .await
    }

    async fn add_feedback(&self, feedback: Feedback) -> Result<InsertOutcome, Problem> {
        require_title(&feedback.title)?;
        insert_clean(self, FEEDBACK_COLLECTION_NAME, &feedback).await
    }

    async fn list_feedback(&self) -> Result<Vec<Document>, Problem> {
        self.find(FEEDBACK_COLLECTION_NAME, doc! {}, None).await
    }
}
